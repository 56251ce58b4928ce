//! Command channel to one chip: plain registers, the indirect misc register
//! window, the firmware mailbox and the code-download DMA.

use std::fmt;

use bytes::{BufMut, BytesMut};
use log::{debug, warn};
use tcc353x_protocol::mailbox::{decode_slave_mail, encode_host_mail};
use tcc353x_protocol::Mailbox;

use crate::bus::{BusTarget, BusTransport};
use crate::error::DriverError;
use crate::options::DriverConfig;
use crate::platform::{Platform, SemaphoreGuard};
use crate::registry::{ModuleSession, SlotState};
use crate::regs::{self, MiscGroup};

/// Bytes per transfer into the code-download window.
const CODE_CHUNK_SIZE: usize = 4096;

/// Logs and swallows the failure of a step that must not abort its sequence.
pub(crate) trait BestEffort<T> {
    fn or_warn(self, what: impl fmt::Display) -> Option<T>;
}

impl<T> BestEffort<T> for Result<T, DriverError> {
    fn or_warn(self, what: impl fmt::Display) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} failed: {}", what, e);
                None
            }
        }
    }
}

/// Access to the chip behind one diversity slot.
pub(crate) struct CommandChannel<'a> {
    bus: &'a dyn BusTransport,
    platform: &'a dyn Platform,
    config: &'a DriverConfig,
    session: &'a ModuleSession,
    slot: &'a SlotState,
}

impl<'a> CommandChannel<'a> {
    pub(crate) fn new(
        bus: &'a dyn BusTransport,
        platform: &'a dyn Platform,
        config: &'a DriverConfig,
        session: &'a ModuleSession,
        slot: &'a SlotState,
    ) -> Self {
        Self {
            bus,
            platform,
            config,
            session,
            slot,
        }
    }

    fn target(&self) -> Result<BusTarget, DriverError> {
        if !self.session.is_attached() {
            return Err(DriverError::NotAttached(self.session.module));
        }
        Ok(self.slot.handle.lock().target())
    }

    pub(crate) fn write(&self, register: u8, data: &[u8]) -> Result<(), DriverError> {
        let target = self.target()?;
        self.bus.write(&target, register, data)?;
        Ok(())
    }

    pub(crate) fn write_u8(&self, register: u8, value: u8) -> Result<(), DriverError> {
        self.write(register, &[value])
    }

    pub(crate) fn read(&self, register: u8, buf: &mut [u8]) -> Result<(), DriverError> {
        let target = self.target()?;
        self.bus.read(&target, register, buf)?;
        Ok(())
    }

    pub(crate) fn read_u8(&self, register: u8) -> Result<u8, DriverError> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf)?;
        Ok(buf[0])
    }

    pub(crate) fn sys_enable(&self, bits: u8) -> Result<(), DriverError> {
        self.write_u8(regs::SYS_EN, bits)
    }

    pub(crate) fn sys_reset(&self, bits: u8) -> Result<(), DriverError> {
        self.write_u8(regs::SYS_RESET, bits)
    }

    // Misc register window

    pub(crate) fn misc_read(&self, group: MiscGroup, address: u8) -> Result<u32, DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        self.write_u8(regs::MISC_CTRL, group as u8)?;
        self.write_u8(regs::MISC_ADDR, address)?;
        let mut buf = [0u8; 4];
        self.read(regs::MISC_DATA, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub(crate) fn misc_write(
        &self,
        group: MiscGroup,
        address: u8,
        value: u32,
    ) -> Result<(), DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        self.misc_burst(group, address, &[value], false)
    }

    /// Write `values` to consecutive misc registers starting at `start`.
    pub(crate) fn misc_write_increase(
        &self,
        group: MiscGroup,
        start: u8,
        values: &[u32],
    ) -> Result<(), DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        self.misc_burst(group, start, values, true)
    }

    /// Write scattered (address, value) pairs in one locked pass.
    pub(crate) fn misc_write_sparse(
        &self,
        group: MiscGroup,
        entries: &[(u8, u32)],
    ) -> Result<(), DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        for (address, value) in entries {
            self.misc_burst(group, *address, &[*value], false)?;
        }
        Ok(())
    }

    fn misc_burst(
        &self,
        group: MiscGroup,
        address: u8,
        values: &[u32],
        auto_increment: bool,
    ) -> Result<(), DriverError> {
        let mut ctrl = regs::MISC_WRITE | group as u8;
        if auto_increment {
            ctrl |= regs::MISC_AUTO_INCREMENT;
        }
        self.write_u8(regs::MISC_CTRL, ctrl)?;
        self.write_u8(regs::MISC_ADDR, address)?;

        let mut buf = BytesMut::with_capacity(values.len() * 4);
        for value in values {
            buf.put_u32(*value);
        }
        self.write(regs::MISC_DATA, &buf)
    }

    // Mailbox

    /// Send a command and wait for the firmware's reply.
    pub(crate) fn send_command(
        &self,
        command: u16,
        payload: &[u32],
    ) -> Result<Mailbox, DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        self.post_mail(command, payload, true)?;
        let reply = self.receive_mail(command)?;
        if reply.command != command {
            warn!(
                "[{}:{}] Mailbox reply for 0x{:04X} while waiting for 0x{:04X}",
                self.session.module, self.slot.index, reply.command, command
            );
        }
        if reply.status != 0 {
            return Err(DriverError::MailboxStatus {
                command,
                status: reply.status,
            });
        }
        Ok(reply)
    }

    /// Send a command without waiting for a reply.
    pub(crate) fn send_only(&self, command: u16, payload: &[u32]) -> Result<(), DriverError> {
        let _guard = SemaphoreGuard::acquire(self.slot.mailbox_lock.as_ref());
        self.post_mail(command, payload, false)
    }

    fn post_mail(
        &self,
        command: u16,
        payload: &[u32],
        expects_reply: bool,
    ) -> Result<(), DriverError> {
        let mail = encode_host_mail(command, payload, expects_reply)?;
        self.write_u8(regs::MAIL_CTRL, regs::MAIL_CTRL_INIT)?;
        self.write(regs::MAIL_FIFO_WIND, &mail)?;
        self.write_u8(regs::MAIL_CTRL, regs::MAIL_CTRL_SET)
    }

    fn receive_mail(&self, command: u16) -> Result<Mailbox, DriverError> {
        for _ in 0..self.config.mailbox_poll_limit {
            let words = (self.read_u8(regs::MAIL_FIFO_R_STAT)? & regs::MAIL_FIFO_COUNT_MASK) as usize;
            if words > 0 {
                let mut buf = vec![0u8; words * 4];
                self.read(regs::MAIL_FIFO_WIND, &mut buf)?;
                return Ok(decode_slave_mail(&buf)?);
            }
            self.platform.delay_ms(1);
        }
        Err(DriverError::MailboxTimeout(command))
    }

    /// Wait until the firmware accepts mail again after a reset, then clear
    /// the FIFO.
    pub(crate) fn get_access_mail(&self) -> Result<(), DriverError> {
        for _ in 0..self.config.mailbox_poll_limit {
            if self.read_u8(regs::MAIL_FIFO_W_STAT)? & regs::MAIL_FIFO_W_READY != 0 {
                return self.write_u8(regs::MAIL_CTRL, regs::MAIL_CTRL_INIT);
            }
            self.platform.delay_ms(1);
        }
        Err(DriverError::MailboxBusy)
    }

    // Code download

    /// Stream `code` into chip memory through the command DMA.
    pub(crate) fn write_code(&self, code: &[u8]) -> Result<(), DriverError> {
        debug!(
            "[{}:{}] Downloading {} bytes of DSP code",
            self.session.module,
            self.slot.index,
            code.len()
        );
        self.write_u8(regs::CMDDMA_CTRL, regs::CMDDMA_INIT)?;
        self.write(regs::CMDDMA_ADDR, &regs::CODE_BASE_ADDRESS.to_be_bytes())?;
        self.write(regs::CMDDMA_SIZE, &(code.len() as u32).to_be_bytes())?;
        self.write_u8(regs::CMDDMA_CTRL, regs::CMDDMA_START | regs::CMDDMA_WRITE)?;
        for chunk in code.chunks(CODE_CHUNK_SIZE) {
            self.write(regs::CMDDMA_DATA_WIND, chunk)?;
        }
        Ok(())
    }

    /// CRC-32/MPEG-2 the DMA engine computed over the downloaded code.
    pub(crate) fn read_dma_crc(&self) -> Result<u32, DriverError> {
        let mut buf = [0u8; 4];
        self.read(regs::DMA_CRC32, &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }
}
