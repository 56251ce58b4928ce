//! Stream output control, status reads, conditional access and the
//! application-level passthrough operations.

use log::{debug, info};
use tcc353x_protocol::mailbox::{command, SYS_START_ARGUMENT};
use tcc353x_protocol::{Mailbox, StreamFormat, TmccInfo};

use crate::channel::BestEffort;
use crate::error::DriverError;
use crate::handle::TuneState;
use crate::platform::SemaphoreGuard;
use crate::registry::{ModuleSession, Registry};
use crate::regs::{self, op, MiscGroup};

/// Commands accepted by [`Registry::user_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum UserCommand {
    /// Restart the DSP and re-acquire mailbox access.
    DspReset = 0,
}

impl TryFrom<u32> for UserCommand {
    type Error = DriverError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(UserCommand::DspReset),
            other => Err(DriverError::UnknownCommand(other)),
        }
    }
}

impl Registry {
    /// Enable the output path and restart the DSP on every slot.
    pub fn stream_start(&self, module: usize) -> Result<(), DriverError> {
        let session = self.session(module)?;
        self.start_stream(&session);
        session.set_state(TuneState::Streaming);
        Ok(())
    }

    /// Disable the output path. Stopping a stopped module is a no-op.
    pub fn stream_stop(&self, module: usize) -> Result<(), DriverError> {
        let session = self.session(module)?;
        if !session.master().stream_started {
            debug!("[{}] Stream already stopped", module);
            return Ok(());
        }
        self.stop_stream(&session);
        Ok(())
    }

    pub fn stream_stop_all(&self, module: usize) -> Result<(), DriverError> {
        self.stream_stop(module)
    }

    /// Update the TS filter switches of the output.
    pub fn set_stream_format(
        &self,
        module: usize,
        format: &StreamFormat,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        session.master().stream_format = Some(*format);

        let channel = self.channel(&session, 0);
        channel
            .misc_read(MiscGroup::Op, op::FILTER_CFG)
            .and_then(|cfg| channel.misc_write(MiscGroup::Op, op::FILTER_CFG, format.apply(cfg)))
            .or_warn(format_args!("[{}:0] Stream format", module));
        Ok(())
    }

    /// Flush the output buffer: stop, clear the pause request on every slot
    /// and start again.
    pub fn interrupt_buffer_clear(&self, module: usize) -> Result<(), DriverError> {
        let session = self.session(module)?;
        self.request_stop(&session);
        self.stop_stream(&session);

        for slot in 0..session.diversity_count() {
            let channel = self.channel(&session, slot);
            channel
                .misc_read(MiscGroup::Op, op::CFG06)
                .and_then(|cfg| {
                    channel.misc_write(MiscGroup::Op, op::CFG06, cfg & !op::CFG06_PAUSE)
                })
                .or_warn(format_args!("[{}:{}] Pause clear", module, slot));
        }

        self.start_stream(&session);
        session.set_state(TuneState::Streaming);
        Ok(())
    }

    /// Raw demodulator status block of one slot.
    pub fn op_status(
        &self,
        module: usize,
        slot: usize,
    ) -> Result<[u8; regs::OP_STATUS_SIZE], DriverError> {
        let session = self.session(module)?;
        session.slot(slot)?;
        let _interface = SemaphoreGuard::acquire(self.interface_lock.as_ref());
        let mut status = [0u8; regs::OP_STATUS_SIZE];
        self.channel(&session, slot).read(regs::OP_STATUS, &mut status)?;
        Ok(status)
    }

    /// Bytes waiting in output buffer A.
    pub fn fifo_status(&self, module: usize) -> Result<u32, DriverError> {
        let session = self.session(module)?;
        let mut buf = [0u8; 2];
        self.channel(&session, 0).read(regs::OBUFF_A_FIFO_STAT, &mut buf)?;
        Ok((u16::from_be_bytes(buf) as u32) << 2)
    }

    /// Decoded TMCC block of one slot.
    pub fn tmcc_info(&self, module: usize, slot: usize) -> Result<TmccInfo, DriverError> {
        let session = self.session(module)?;
        session.slot(slot)?;
        let reply = self
            .channel(&session, slot)
            .send_command(command::TMCC_RESULT, &[])?;
        Ok(TmccInfo::from_words([
            reply.word(0),
            reply.word(1),
            reply.word(2),
            reply.word(3),
        ]))
    }

    /// Enable the descrambler for `round` rounds with a 32-byte system key.
    pub fn cas_open(
        &self,
        module: usize,
        round: u32,
        system_key: &[u8; 32],
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let channel = self.channel(&session, 0);

        let current = channel
            .misc_read(MiscGroup::Op, op::FILTER_CFG)
            .or_warn(format_args!("[{}:0] Filter config read", module))
            .unwrap_or(0);
        let filter = (current & 0x3FF)
            | (((round << 3).wrapping_sub(1) & 0xFFFF) << 16)
            | 0x6C00
            | 0x8000;
        channel
            .misc_write(MiscGroup::Op, op::FILTER_CFG, filter)
            .or_warn(format_args!("[{}:0] Descrambler enable", module));

        let key: Vec<u32> = system_key
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        channel
            .misc_write_increase(MiscGroup::Op, op::CAS_SYSTEM_KEY0, &key)
            .or_warn(format_args!("[{}:0] System key", module));
        info!("[{}] Descrambler open, {} rounds", module, round);
        Ok(())
    }

    /// Program the MULTI2 even (`parity != 0`) or odd key and the optional IV.
    pub fn cas_set_key_multi2(
        &self,
        module: usize,
        parity: u32,
        key: &[u8; 8],
        init_vector: Option<&[u8; 8]>,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let channel = self.channel(&session, 0);

        let register = if parity != 0 {
            op::CAS_EVEN_KEY_L
        } else {
            op::CAS_ODD_KEY_L
        };
        channel
            .misc_write_increase(MiscGroup::Op, register, &key_pair(key))
            .or_warn(format_args!("[{}:0] Scramble key", module));

        if let Some(iv) = init_vector {
            channel
                .misc_write_increase(MiscGroup::Op, op::CAS_IV0, &key_pair(iv))
                .or_warn(format_args!("[{}:0] Init vector", module));
        }
        Ok(())
    }

    /// PID programming is handled by the descrambler itself.
    pub fn cas_set_pid(&self, module: usize, pids: &[u32]) -> Result<(), DriverError> {
        self.session(module)?;
        debug!("[{}] Ignoring {} CAS PID(s)", module, pids.len());
        Ok(())
    }

    /// Post an application-defined command without waiting for a reply.
    pub fn mailbox_write(
        &self,
        module: usize,
        slot: usize,
        command: u16,
        payload: &[u32],
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        session.slot(slot)?;
        self.channel(&session, slot).send_only(command, payload)
    }

    /// Send an application-defined command and return the firmware's reply.
    pub fn mailbox_read(
        &self,
        module: usize,
        slot: usize,
        command: u16,
    ) -> Result<Mailbox, DriverError> {
        let session = self.session(module)?;
        session.slot(slot)?;
        self.channel(&session, slot).send_command(command, &[])
    }

    pub fn user_command(
        &self,
        module: usize,
        slot: usize,
        command_id: u32,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let state = session.slot(slot)?;
        match UserCommand::try_from(command_id)? {
            UserCommand::DspReset => {
                let _op = SemaphoreGuard::acquire(state.op_lock.as_ref());
                let channel = self.channel(&session, slot);
                channel
                    .sys_reset(regs::SYS_RESET_DSP)
                    .or_warn(format_args!("[{}:{}] DSP reset", module, slot));
                channel
                    .get_access_mail()
                    .or_warn(format_args!("[{}:{}] Mailbox access", module, slot));
                info!("[{}:{}] DSP restarted", module, slot);
            }
        }
        Ok(())
    }

    /// Gang reconfiguration at runtime is not available on this core.
    pub fn change_to_diversity_mode(&self, module: usize, count: usize) -> Result<(), DriverError> {
        self.session(module)?;
        debug!("[{}] Refusing switch to {}-chip diversity", module, count);
        Err(DriverError::Unsupported("diversity mode switching"))
    }

    pub fn change_to_dual_mode(&self, module: usize) -> Result<(), DriverError> {
        self.session(module)?;
        Err(DriverError::Unsupported("dual mode switching"))
    }

    /// Layer selection is done by the firmware; accepted for compatibility.
    pub fn select_layer(&self, module: usize, layer: u32) -> Result<(), DriverError> {
        self.session(module)?;
        debug!("[{}] Layer {} requested", module, layer);
        Ok(())
    }

    /// Enable buffer A and the stream data path, then reopen every slot's
    /// DSP and send the start mail.
    pub(crate) fn start_stream(&self, session: &ModuleSession) {
        for slot in 0..session.diversity_count() {
            session.handle(slot).stream_started = true;
        }
        self.prepare_stream(session);

        for slot in 0..session.diversity_count() {
            self.reopen_for_stream(session, slot);
            self.channel(session, slot)
                .send_command(command::SYS_START, &[SYS_START_ARGUMENT])
                .or_warn(format_args!("[{}:{}] Start mail", session.module, slot));
        }
    }

    fn prepare_stream(&self, session: &ModuleSession) {
        let (cfg, use_interrupt) = {
            let master = session.master();
            (master.options.registers.clone(), master.options.use_interrupt)
        };
        let sdc = cfg.stream_data_config;
        let mut cfg3 = sdc[3] | regs::STREAM_DATA_ENABLE | regs::STREAM_FIFO_INIT;
        if use_interrupt {
            cfg3 |= regs::STREAM_FIFO_EN;
        }

        let channel = self.channel(session, 0);
        channel
            .write_u8(regs::OBUFF_INIT, cfg.buffer_config_0x4f)
            .and_then(|_| channel.write_u8(regs::OBUFF_CONFIG, cfg.buffer_config_0x4e | regs::OBUFF_A_EN))
            .and_then(|_| channel.write(regs::STREAM_CFG0, &[sdc[0], sdc[1], sdc[2], cfg3]))
            .or_warn(format_args!("[{}:0] Stream prepare", session.module));
    }

    fn reopen_for_stream(&self, session: &ModuleSession, slot: usize) {
        let state = &session.slots[slot];
        let _op = SemaphoreGuard::acquire(state.op_lock.as_ref());
        let channel = self.channel(session, slot);

        channel
            .sys_enable(regs::SYS_EN_EP | regs::SYS_EN_OPCLK | regs::SYS_EN_RF)
            .and_then(|_| channel.sys_reset(regs::SYS_RESET_DSP))
            .or_warn(format_args!("[{}:{}] DSP disable", session.module, slot));
        self.platform.delay_ms(1);
        channel
            .sys_reset(regs::SYS_RESET_EP)
            .or_warn(format_args!("[{}:{}] EP reset", session.module, slot));

        if slot == 0 {
            self.peripheral_on_off(session, 0, true);
            if session.master().options.use_interrupt {
                channel
                    .write_u8(regs::IRQ_EN, regs::IRQ_EN_FIFO_A_INIT | regs::IRQ_EN_FIFO_OVERRUN)
                    .or_warn(format_args!("[{}:0] Interrupt enable", session.module));
            }
        }

        channel
            .sys_enable(regs::SYS_EN_ALL)
            .or_warn(format_args!("[{}:{}] Subsystem enable", session.module, slot));
        channel
            .get_access_mail()
            .or_warn(format_args!("[{}:{}] Mailbox access", session.module, slot));
    }

    /// Disable the stream data path, every output buffer and the peripheral.
    pub(crate) fn stop_stream(&self, session: &ModuleSession) {
        let (cfg, use_interrupt) = {
            let master = session.master();
            (master.options.registers.clone(), master.options.use_interrupt)
        };
        let channel = self.channel(session, 0);

        if use_interrupt {
            channel
                .write_u8(regs::IRQ_EN, 0)
                .and_then(|_| channel.write_u8(regs::IRQ_STAT_CLR, regs::IRQ_STAT_CLR_ALL))
                .or_warn(format_args!("[{}:0] Interrupt disable", session.module));
        }
        let sdc = cfg.stream_data_config;
        channel
            .write_u8(regs::STREAM_CFG0, sdc[0])
            .and_then(|_| channel.write_u8(regs::STREAM_CFG3, sdc[3] & !regs::STREAM_DATA_ENABLE))
            .and_then(|_| {
                channel.write_u8(regs::OBUFF_CONFIG, cfg.buffer_config_0x4e & !regs::OBUFF_ALL_EN)
            })
            .or_warn(format_args!("[{}:0] Stream disable", session.module));
        self.peripheral_on_off(session, 0, false);

        for slot in 0..session.diversity_count() {
            session.handle(slot).stream_started = false;
        }
        session.set_state(TuneState::Idle);
        debug!("[{}] Stream stopped", session.module);
    }
}

/// Split an 8-byte key into the (low, high) word pair the descrambler takes.
fn key_pair(key: &[u8; 8]) -> [u32; 2] {
    let high = u32::from_le_bytes([key[0], key[1], key[2], key[3]]);
    let low = u32::from_le_bytes([key[4], key[5], key[6], key[7]]);
    [low, high]
}
