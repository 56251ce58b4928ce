//! Firmware bootstrap and chip initialisation.
//!
//! On a diversity board the code is broadcast to every ganged chip in one
//! pass. Each chip's DMA engine then reports a CRC over what it received,
//! and each chip is checked against the container's trailer at its own
//! address.

use log::{error, info, warn};
use tcc353x_protocol::mailbox::command;
use tcc353x_protocol::pll::stream_clock_khz;
use tcc353x_protocol::{CodeVersion, FirmwareContainer, PLL_ISDB_T_FULLSEG};

use crate::channel::BestEffort;
use crate::error::DriverError;
use crate::platform::SemaphoreGuard;
use crate::registry::{ModuleSession, Registry};
use crate::regs::{self, MiscGroup};

impl Registry {
    /// Bring the module's chips up: bootstrap, output and GPIO setup, DSP
    /// start and RF front-end init.
    ///
    /// `coldboot` is a coldboot image; `None` skips the download for chips
    /// that boot from their own memory.
    pub fn init(&self, module: usize, coldboot: Option<&[u8]>) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let container = coldboot.map(FirmwareContainer::parse).transpose()?;
        self.download(module, container.as_ref())?;

        for slot in 0..session.diversity_count() {
            self.set_stream_control(&session, slot);
            self.set_interrupt_control(&session, slot);
            self.set_gpio(&session, slot);
            self.restart_system(&session, slot);
            self.query_code_version(&session, slot);

            let channel = self.channel(&session, slot);
            if slot == 0 {
                channel
                    .misc_write_sparse(MiscGroup::Sdram, regs::SDRAM_INIT_SEQUENCE)
                    .or_warn(format_args!("[{}:0] SDRAM setup", module));
            }
            channel
                .write_u8(regs::XTAL_BIAS, regs::XTAL_BIAS_VALUE)
                .and_then(|_| channel.write_u8(regs::XTAL_BIAS_KEY, regs::XTAL_BIAS_KEY_VALUE))
                .or_warn(format_args!("[{}:{}] Crystal bias", module, slot));
        }

        for slot in 0..session.diversity_count() {
            self.rf.init(module, slot)?;
        }
        info!("[{}] Init complete", module);
        Ok(())
    }

    /// Clock the chips up, download the code segment and write the per-chip
    /// boot vectors.
    ///
    /// A CRC mismatch on any slot is reported after the boot vectors are
    /// written.
    pub fn download(
        &self,
        module: usize,
        container: Option<&FirmwareContainer<'_>>,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let firmware = match container {
            Some(container) => {
                info!(
                    "[{}] Coldboot: code {} bytes, DAGU {}, DINT {}, RAND {}, column order {}",
                    module,
                    container.code.len(),
                    container.dagu.map_or(0, |s| s.len()),
                    container.dint.map_or(0, |s| s.len()),
                    container.rand.map_or(0, |s| s.len()),
                    container.col_order.map_or(0, |s| s.len()),
                );
                Some((container.code_body()?, container.code_crc()?))
            }
            None => None,
        };

        let count = session.diversity_count();
        if count > 1 {
            session.master().use_broadcast_address();
        }

        {
            let _ops = session.lock_all_ops();
            let channel = self.channel(&session, 0);
            channel
                .sys_enable(0)
                .or_warn(format_args!("[{}:0] Subsystem disable", module));
            {
                let mut master = session.master();
                master.use_default_pll = master.options.pll_override.is_none();
            }
            self.apply_pll(&session, 0, PLL_ISDB_T_FULLSEG);
            channel
                .sys_reset(regs::SYS_RESET_EP)
                .and_then(|_| channel.sys_enable(regs::SYS_EN_EP))
                .or_warn(format_args!("[{}:0] EP start", module));
        }

        // The broadcast PLL write reached every chip
        let (pll, clock) = {
            let master = session.master();
            (master.pll, master.main_clock_khz)
        };
        for slot in 1..count {
            let mut handle = session.handle(slot);
            handle.pll = pll;
            handle.main_clock_khz = clock;
        }

        let channel = self.channel(&session, 0);
        channel
            .write_u8(regs::REMAP, 0x00)
            .or_warn(format_args!("[{}:0] Remap", module));

        let failed = match firmware {
            Some((body, expected)) => {
                channel
                    .write_code(body)
                    .or_warn(format_args!("[{}:0] Code download", module));
                self.check_crc(&session, expected)
            }
            None => {
                session.master().restore_address();
                Vec::new()
            }
        };

        for slot in 0..count {
            let vector = {
                let handle = session.handle(slot);
                let cfg = &handle.options.registers;
                [cfg.init_remap_0x0d, cfg.init_pc_0x0e, cfg.init_pc_0x0f]
            };
            self.channel(&session, slot)
                .write(regs::INIT_REMAP_PC, &vector)
                .or_warn(format_args!("[{}:{}] Boot vector", module, slot));
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DriverError::CrcMismatch(failed))
        }
    }

    /// Compare every chip's DMA CRC with the container's trailer.
    pub fn verify_crc(
        &self,
        module: usize,
        container: &FirmwareContainer<'_>,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let failed = self.check_crc(&session, container.code_crc()?);
        if failed.is_empty() {
            Ok(())
        } else {
            Err(DriverError::CrcMismatch(failed))
        }
    }

    /// Slots whose CRC did not match, checked from the highest slot down.
    fn check_crc(&self, session: &ModuleSession, expected: u32) -> Vec<usize> {
        let mut failed = Vec::new();
        for slot in session.descending() {
            session.handle(slot).restore_address();
            match self.channel(session, slot).read_dma_crc() {
                Ok(actual) if actual == expected => {
                    info!(
                        "[{}:{}] CRC ok (0x{:08X})",
                        session.module, slot, actual
                    );
                }
                Ok(actual) => {
                    error!(
                        "[{}:{}] CRC mismatch: expected 0x{:08X}, chip 0x{:08X}",
                        session.module, slot, expected, actual
                    );
                    failed.push(slot);
                }
                Err(e) => {
                    error!("[{}:{}] CRC read failed: {}", session.module, slot, e);
                    failed.push(slot);
                }
            }
        }
        failed
    }

    fn set_stream_control(&self, session: &ModuleSession, slot: usize) {
        let (cfg, clock) = {
            let handle = session.handle(slot);
            (handle.options.registers.clone(), handle.main_clock_khz)
        };
        let channel = self.channel(session, slot);

        let buffers = [
            (regs::OBUFF_A_START, cfg.buffer_a_start),
            (regs::OBUFF_A_END, cfg.buffer_a_end),
            (regs::OBUFF_B_START, cfg.buffer_b_start),
            (regs::OBUFF_B_END, cfg.buffer_b_end),
            (regs::OBUFF_C_START, cfg.buffer_c_start),
            (regs::OBUFF_C_END, cfg.buffer_c_end),
            (regs::OBUFF_D_START, cfg.buffer_d_start),
            (regs::OBUFF_D_END, cfg.buffer_d_end),
            (regs::OBUFF_A_FIFO_THR, cfg.buffer_a_fifo_threshold),
        ];
        for (register, value) in buffers {
            channel.write(register, &value).or_warn(format_args!(
                "[{}:{}] Buffer register 0x{:02X}",
                session.module, slot, register
            ));
        }
        channel
            .write_u8(regs::OBUFF_CONFIG, cfg.buffer_config_0x4e)
            .and_then(|_| channel.write_u8(regs::OBUFF_INIT, cfg.buffer_config_0x4f))
            .and_then(|_| channel.write(regs::STREAM_CFG0, &cfg.stream_data_config))
            .and_then(|_| channel.write(regs::PERI_CFG0, &cfg.peri_config))
            .or_warn(format_args!("[{}:{}] Stream control", session.module, slot));

        match cfg.peri_config[0] & regs::PERI_MODE_MASK {
            regs::PERI_MODE_SPI => {
                let dlr = ((cfg.peri_config[1] & 0x1C) >> 2) as u32;
                info!(
                    "[{}:{}] SPI clock {} kHz (DLR {})",
                    session.module,
                    slot,
                    stream_clock_khz(clock, dlr),
                    dlr
                );
            }
            regs::PERI_MODE_TS => {
                let dlr = (cfg.peri_config[1] & 0x07) as u32;
                info!(
                    "[{}:{}] TS clock {} kHz (DLR {})",
                    session.module,
                    slot,
                    stream_clock_khz(clock, dlr),
                    dlr
                );
            }
            _ => {}
        }
    }

    fn set_interrupt_control(&self, session: &ModuleSession, slot: usize) {
        let (mode, use_interrupt) = {
            let handle = session.handle(slot);
            (handle.options.registers.irq_mode_0x02, handle.options.use_interrupt)
        };
        let channel = self.channel(session, slot);
        channel
            .write_u8(regs::IRQ_MODE, mode)
            .and_then(|_| channel.write_u8(regs::IRQ_STAT_CLR, regs::IRQ_STAT_CLR_ALL))
            .or_warn(format_args!("[{}:{}] Interrupt setup", session.module, slot));
        if use_interrupt {
            channel
                .write_u8(regs::IRQ_EN, 0)
                .or_warn(format_args!("[{}:{}] Interrupt disable", session.module, slot));
        }
    }

    fn set_gpio(&self, session: &ModuleSession, slot: usize) {
        let cfg = session.handle(slot).options.registers.clone();
        let channel = self.channel(session, slot);

        for bank in 0..3 {
            let banked = [
                (regs::GPIO_ALT, cfg.gpio_alt_0x10[bank]),
                (regs::GPIO_DR, cfg.gpio_dr_0x11[bank]),
                (regs::GPIO_LR, cfg.gpio_lr_0x12[bank]),
                (regs::GPIO_DRV, cfg.gpio_drv_0x13[bank]),
                (regs::GPIO_PE, cfg.gpio_pe_0x14[bank]),
                (regs::GPIO_SDRV, cfg.gpio_sdrv_0x15[bank]),
            ];
            let result = channel.write_u8(regs::IO_CFG_MUX, bank as u8).and_then(|_| {
                banked
                    .iter()
                    .try_for_each(|(register, value)| channel.write_u8(*register, *value))
            });
            result.or_warn(format_args!("[{}:{}] GPIO bank {}", session.module, slot, bank));
        }
        channel
            .write_u8(regs::IO_MISC, cfg.io_misc_0x16)
            .or_warn(format_args!("[{}:{}] IO misc", session.module, slot));
    }

    fn restart_system(&self, session: &ModuleSession, slot: usize) {
        let state = &session.slots[slot];
        let _op = SemaphoreGuard::acquire(state.op_lock.as_ref());
        let channel = self.channel(session, slot);
        channel
            .sys_enable(regs::SYS_EN_OPCLK)
            .and_then(|_| channel.sys_reset(regs::SYS_RESET_DSP))
            .and_then(|_| channel.sys_enable(regs::SYS_EN_ALL))
            .or_warn(format_args!("[{}:{}] System restart", session.module, slot));
        channel
            .get_access_mail()
            .or_warn(format_args!("[{}:{}] Mailbox access", session.module, slot));
    }

    fn query_code_version(&self, session: &ModuleSession, slot: usize) {
        match self.channel(session, slot).send_command(command::SYS_ASM_VER, &[]) {
            Ok(reply) => {
                let word = reply.word(0);
                session.handle(slot).dsp_code_version = Some(word);
                info!(
                    "[{}:{}] DSP code 0x{:08X}, version {}",
                    session.module,
                    slot,
                    word,
                    CodeVersion::from_word(word)
                );
            }
            Err(e) => warn!(
                "[{}:{}] DSP code version query failed: {}",
                session.module, slot, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tcc353x_protocol::{crc32_mpeg2, BoardTopology, ContainerBuilder, ProtocolError};

    use crate::error::DriverError;
    use crate::options::{DriverConfig, ReceiverOptions};
    use crate::regs;
    use crate::sim::{SimPlatform, SimRf, SimulatedBus, SIM_CODE_VERSION};
    use crate::Registry;

    fn setup(chips: usize) -> (Arc<SimulatedBus>, Arc<SimRf>, Registry) {
        let bus = Arc::new(SimulatedBus::new(chips));
        let rf = Arc::new(SimRf::default());
        let registry = Registry::new(
            bus.clone(),
            Arc::new(SimPlatform::new()),
            rf.clone(),
            DriverConfig::default(),
        );
        (bus, rf, registry)
    }

    fn code() -> Vec<u8> {
        (0..1024u32).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_init_single_chip() {
        let (bus, rf, registry) = setup(1);
        registry.attach(0, &[ReceiverOptions::default()]).unwrap();
        let image = ContainerBuilder::new().code(&code()).dagu(&[1; 16]).build();

        registry.init(0, Some(&image[..])).unwrap();

        assert_eq!(bus.code(0), code());
        assert_eq!(bus.dma_crc(0), crc32_mpeg2(&code()));
        assert_eq!(bus.register(0, regs::INIT_REMAP_PC), 0x06);
        assert_eq!(bus.misc(0, regs::MiscGroup::Sdram, 13), 0x8000_0E00);
        assert_eq!(bus.register(0, regs::XTAL_BIAS), 7);
        assert_eq!(bus.register(0, regs::XTAL_BIAS_KEY), 0x5E);
        assert_eq!(bus.register(0, regs::PERI_CFG0), 0x10);

        let handle = registry.handle(0, 0).unwrap();
        assert_eq!(handle.dsp_code_version, Some(SIM_CODE_VERSION));
        assert_eq!(handle.main_clock_khz, 117600);
        assert!(handle.use_default_pll);
        assert_eq!(rf.inits(), vec![(0, 0)]);
    }

    #[test]
    fn test_broadcast_download() {
        let (bus, rf, registry) = setup(2);
        registry
            .attach(0, &SimulatedBus::slot_options(BoardTopology::TwoDiversity))
            .unwrap();
        let image = ContainerBuilder::new().code(&code()).build();

        registry.init(0, Some(&image[..])).unwrap();

        assert_eq!(bus.code(0), code());
        assert_eq!(bus.code(1), code());
        assert!(bus.broadcast_writes() > 0);
        for slot in 0..2 {
            let handle = registry.handle(0, slot).unwrap();
            assert_eq!(handle.current_address, handle.original_address);
            assert_eq!(handle.main_clock_khz, 117600);
            assert_eq!(bus.register(slot, regs::INIT_REMAP_PC), 0x06);
        }
        // SDRAM setup on the master only
        assert_eq!(bus.misc(1, regs::MiscGroup::Sdram, 13), 0);
        assert_eq!(rf.inits(), vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn test_crc_mismatch_reported_per_slot() {
        let (bus, rf, registry) = setup(2);
        bus.corrupt_crc(1);
        registry
            .attach(0, &SimulatedBus::slot_options(BoardTopology::TwoDiversity))
            .unwrap();
        let image = ContainerBuilder::new().code(&code()).build();

        assert_eq!(
            registry.init(0, Some(&image[..])),
            Err(DriverError::CrcMismatch(vec![1]))
        );
        // boot vectors still written on every slot
        assert_eq!(bus.register(0, regs::INIT_REMAP_PC), 0x06);
        assert_eq!(bus.register(1, regs::INIT_REMAP_PC), 0x06);
        assert!(rf.inits().is_empty());

        let container = tcc353x_protocol::FirmwareContainer::parse(&image).unwrap();
        assert_eq!(
            registry.verify_crc(0, &container),
            Err(DriverError::CrcMismatch(vec![1]))
        );
    }

    #[test]
    fn test_malformed_image_touches_nothing() {
        let (bus, _rf, registry) = setup(1);
        registry.attach(0, &[ReceiverOptions::default()]).unwrap();
        let mut image = ContainerBuilder::new().code(&code()).build().to_vec();
        image[3] = 9;
        let writes = bus.write_count();

        assert!(matches!(
            registry.init(0, Some(&image[..])),
            Err(DriverError::Protocol(ProtocolError::UnexpectedTag { .. }))
        ));
        assert_eq!(bus.write_count(), writes);
    }

    #[test]
    fn test_init_without_firmware() {
        let (bus, _rf, registry) = setup(2);
        registry
            .attach(0, &SimulatedBus::slot_options(BoardTopology::TwoDiversity))
            .unwrap();

        registry.init(0, None).unwrap();

        assert!(bus.code(0).is_empty());
        let handle = registry.handle(0, 0).unwrap();
        assert_eq!(handle.current_address, handle.original_address);
    }

    #[test]
    fn test_init_requires_attach() {
        let (_bus, _rf, registry) = setup(1);
        assert_eq!(registry.init(0, None), Err(DriverError::NotAttached(0)));
    }
}
