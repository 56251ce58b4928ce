//! Tune sequence: stop the running service, reprogram PLL, RF and baseband on
//! every diversity slot, then restart the stream.

use log::{debug, error, info, warn};
use tcc353x_protocol::types::{CHANNEL_BANDWIDTH_KHZ, VHF_UHF_SPLIT_KHZ};
use tcc353x_protocol::{
    auto_pll, build_op_config, OpConfig, OpConfigParams, Segment, StreamInterface, TuneRequest,
};

use crate::channel::BestEffort;
use crate::error::DriverError;
use crate::handle::TuneState;
use crate::options::PllPolicy;
use crate::registry::{ModuleSession, Registry};
use crate::regs::{self, op, MiscGroup};

/// Number of GPIOs reachable through the three IO_CFG_MUX banks.
const GPIO_COUNT: u8 = 24;

impl Registry {
    /// Tune every slot of `module` to `frequency_khz` and start streaming.
    ///
    /// For ISDB-Tmm services `frequency_khz` is the nominal channel centre;
    /// the time-slot offset is applied before any table lookup.
    pub fn tune(
        &self,
        module: usize,
        frequency_khz: i32,
        request: &TuneRequest,
    ) -> Result<(), DriverError> {
        let session = self.session(module)?;
        let started_at = self.platform.now_ms();

        session.set_state(TuneState::Stopping);
        self.request_stop(&session);
        let stream_started = session.master().stream_started;
        if stream_started {
            self.stop_stream(&session);
        }

        session.set_state(TuneState::Reconfiguring);
        let frequency = match self.reconfigure(&session, frequency_khz, request) {
            Ok(frequency) => frequency,
            Err(e) => {
                session.set_state(TuneState::Idle);
                return Err(e);
            }
        };

        self.start_stream(&session);
        session.set_state(TuneState::Streaming);

        info!(
            "[{}] Tuned to {} kHz in {} ms",
            module,
            frequency,
            self.platform.now_ms().saturating_sub(started_at)
        );
        Ok(())
    }

    /// Ask every slot's DSP to pause and wait for the acknowledgment.
    ///
    /// An acknowledgment that never arrives is not an error; the sequence
    /// carries on after the poll budget is spent.
    pub(crate) fn request_stop(&self, session: &ModuleSession) {
        for slot in 0..session.diversity_count() {
            let channel = self.channel(session, slot);
            let paused = channel
                .misc_read(MiscGroup::Op, op::CFG06)
                .and_then(|cfg| channel.misc_write(MiscGroup::Op, op::CFG06, cfg | op::CFG06_PAUSE));
            if paused
                .or_warn(format_args!("[{}:{}] Stop request", session.module, slot))
                .is_none()
            {
                continue;
            }

            let mut acked = false;
            for _ in 0..self.config.stop_ack_poll_limit {
                if let Ok(program_id) = channel.read_u8(regs::PROGRAM_ID) {
                    if program_id & regs::PROGRAM_ID_STOP_ACK != 0 {
                        acked = true;
                        break;
                    }
                }
                self.platform.delay_ms(1);
            }
            if !acked {
                warn!(
                    "[{}:{}] No stop acknowledgment after {} ms, continuing",
                    session.module, slot, self.config.stop_ack_poll_limit
                );
            }
        }
        self.platform.delay_ms(2);
    }

    /// Reprogram buffers, PLL, RF and op-config. Returns the tuned frequency.
    fn reconfigure(
        &self,
        session: &ModuleSession,
        frequency_khz: i32,
        request: &TuneRequest,
    ) -> Result<i32, DriverError> {
        let (stream_interface, use_default_pll, current_pll, first_write) = {
            let master = session.master();
            (
                master.options.stream_interface,
                master.use_default_pll,
                master.pll,
                !master.tuned,
            )
        };

        if stream_interface == StreamInterface::MainIo {
            self.resize_main_io_buffer(session, request);
        }
        for slot in 0..session.diversity_count() {
            session.handle(slot).tune_request = Some(*request);
        }

        let frequency = match request.segment.shifted_frequency(frequency_khz) {
            Some(frequency) if frequency > 0 => frequency,
            shifted => {
                let frequency = shifted.unwrap_or(frequency_khz);
                error!(
                    "[{}] Frequency {} kHz out of range after time-slot shift",
                    session.module, frequency
                );
                return Err(DriverError::InvalidFrequency(frequency));
            }
        };
        match request.segment {
            Segment::Tmm(slot) => info!(
                "[{}] ISDB-Tmm {:?}: {} kHz -> {} kHz",
                session.module, slot, frequency_khz, frequency
            ),
            segment if segment.is_tsb() => {
                info!("[{}] ISDB-Tsb {:?} at {} kHz", session.module, segment, frequency)
            }
            segment => info!("[{}] ISDB-T {:?} at {} kHz", session.module, segment, frequency),
        }

        if use_default_pll {
            let pll = auto_pll(request, frequency as u32);
            if pll != current_pll || self.config.pll_policy == PllPolicy::Always {
                info!(
                    "[{}] PLL 0x{:04X} -> 0x{:04X}",
                    session.module, current_pll, pll
                );
                self.change_pll(session, pll);
            }
        }

        for slot in 0..session.diversity_count() {
            self.rf_switching(session, slot, frequency)
                .or_warn(format_args!("[{}:{}] RF switching", session.module, slot));

            let osc_khz = session.handle(slot).options.osc_khz;
            if let Err(e) = self.rf.tune(
                session.module,
                slot,
                frequency,
                CHANNEL_BANDWIDTH_KHZ,
                osc_khz,
                request,
            ) {
                error!("[{}:{}] RF tune failed: {}", session.module, slot, e);
            }

            let config = build_op_config(&self.op_config_params(session, slot, request, frequency));
            self.write_op_config(session, slot, &config, first_write);
        }

        for slot in 0..session.diversity_count() {
            session.handle(slot).tuned = true;
        }
        Ok(frequency)
    }

    fn op_config_params(
        &self,
        session: &ModuleSession,
        slot: usize,
        request: &TuneRequest,
        frequency: i32,
    ) -> OpConfigParams {
        // Board-wide settings come from the master; only the role is per slot.
        let role = session.handle(slot).options.role;
        let master = session.master();
        OpConfigParams {
            segment: request.segment,
            rf_if: request.rf_if,
            frequency_khz: frequency as u32,
            diversity_count: session.diversity_count(),
            topology: master.options.topology,
            role,
            stream_interface: master.options.stream_interface,
            baseband: master.options.baseband,
            osc_khz: master.options.osc_khz,
        }
    }

    /// Write the full image on the first tune, then only what changed.
    fn write_op_config(
        &self,
        session: &ModuleSession,
        slot: usize,
        config: &OpConfig,
        first_write: bool,
    ) {
        let previous = session.handle(slot).last_op_config;
        let channel = self.channel(session, slot);
        let result = match previous {
            Some(previous) if !first_write => {
                let words = config.words();
                let entries: Vec<(u8, u32)> = config
                    .changed_words(&previous)
                    .into_iter()
                    .map(|i| (op::CFG00 + i as u8, words[i]))
                    .collect();
                debug!(
                    "[{}:{}] Op-config: {} word(s) changed",
                    session.module,
                    slot,
                    entries.len()
                );
                channel.misc_write_sparse(MiscGroup::Op, &entries)
            }
            _ => channel.misc_write_increase(MiscGroup::Op, op::CFG00, config.words()),
        };
        if result
            .or_warn(format_args!("[{}:{}] Op-config write", session.module, slot))
            .is_some()
        {
            session.handle(slot).last_op_config = Some(*config);
        }
    }

    /// Point the antenna switch GPIO at the VHF or UHF input.
    fn rf_switching(
        &self,
        session: &ModuleSession,
        slot: usize,
        frequency: i32,
    ) -> Result<(), DriverError> {
        let gpio = match session.handle(slot).options.rf_switch_gpio {
            Some(gpio) if gpio < GPIO_COUNT => gpio,
            Some(gpio) => {
                warn!(
                    "[{}:{}] RF switch GPIO {} out of range",
                    session.module, slot, gpio
                );
                return Ok(());
            }
            None => return Ok(()),
        };
        let bank = gpio / 8;
        let mask = 1u8 << (gpio % 8);

        let channel = self.channel(session, slot);
        channel.write_u8(regs::IO_CFG_MUX, bank)?;
        let direction = channel.read_u8(regs::GPIO_DR)? | mask;
        let mut level = channel.read_u8(regs::GPIO_LR)?;
        if frequency < VHF_UHF_SPLIT_KHZ {
            level &= !mask;
        } else {
            level |= mask;
        }
        channel.write_u8(regs::GPIO_DR, direction)?;
        channel.write_u8(regs::GPIO_LR, level)
    }

    /// Resize output buffer A for main-I/O streaming.
    fn resize_main_io_buffer(&self, session: &ModuleSession, request: &TuneRequest) {
        let end = if request.segment.uses_large_buffer() {
            regs::OBUFF_A_END_LARGE
        } else {
            regs::OBUFF_A_END_SMALL
        };
        let channel = self.channel(session, 0);
        channel
            .write(
                regs::OBUFF_A_END,
                &[((end >> 10) & 0xFF) as u8, ((end >> 2) & 0xFF) as u8],
            )
            .or_warn(format_args!("[{}:0] Buffer A end", session.module));

        if let Some(threshold) = request.fifo_threshold.filter(|t| *t != 0) {
            let words = threshold >> 2;
            channel
                .write(
                    regs::OBUFF_A_FIFO_THR,
                    &[((words >> 8) & 0xFF) as u8, (words & 0xFF) as u8],
                )
                .or_warn(format_args!("[{}:0] Buffer A threshold", session.module));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tcc353x_protocol::{
        BoardTopology, OpField, Segment, StreamInterface, TmmSlot, TuneRequest,
        PLL_ISDB_T_FULLSEG,
    };

    use super::*;
    use crate::options::{DriverConfig, ReceiverOptions};
    use crate::platform::Platform;
    use crate::sim::{SimPlatform, SimRf, SimulatedBus};
    use tcc353x_protocol::ContainerBuilder;

    struct Fixture {
        bus: Arc<SimulatedBus>,
        platform: Arc<SimPlatform>,
        rf: Arc<SimRf>,
        registry: Registry,
    }

    fn fixture(options: &[ReceiverOptions], config: DriverConfig) -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();
        let bus = Arc::new(SimulatedBus::new(options.len()));
        let platform = Arc::new(SimPlatform::new());
        let rf = Arc::new(SimRf::default());
        let registry = Registry::new(bus.clone(), platform.clone(), rf.clone(), config);
        registry.attach(0, options).unwrap();
        let image = ContainerBuilder::new().code(&[0x5A; 256]).build();
        registry.init(0, Some(&image[..])).unwrap();
        Fixture {
            bus,
            platform,
            rf,
            registry,
        }
    }

    fn single() -> Fixture {
        fixture(&[ReceiverOptions::default()], DriverConfig::default())
    }

    #[test]
    fn test_two_diversity_fullseg_end_to_end() {
        let f = fixture(
            &SimulatedBus::slot_options(BoardTopology::TwoDiversity),
            DriverConfig::default(),
        );
        assert_eq!(f.registry.handle(0, 0).unwrap().pll, PLL_ISDB_T_FULLSEG);
        let updates: Vec<u32> = (0..2).map(|slot| f.bus.pll_updates(slot)).collect();

        // 99143 kHz selects PLL 0xAA8E with RC step high byte 0x0E
        f.registry
            .tune(0, 99143, &TuneRequest::new(Segment::FullSeg))
            .unwrap();

        assert_eq!(f.registry.tune_state(0).unwrap(), TuneState::Streaming);
        for slot in 0..2 {
            assert_eq!(f.bus.pll_updates(slot), updates[slot] + 1);
            let handle = f.registry.handle(0, slot).unwrap();
            assert_eq!(handle.pll, 0xAA8E);
            assert!(handle.tuned);
            assert!(handle.stream_started);

            let word6 = f.bus.misc(slot, MiscGroup::Op, op::CFG06);
            assert_eq!(word6 & 0xFF, 0x0E);
            assert_eq!(word6 >> 16, 99143 >> 4);
            assert_eq!(word6 & op::CFG06_PAUSE, 0);

            let config = handle.last_op_config.unwrap();
            assert_eq!(config.get(OpField::RcStepHigh), 0x0E);
            assert_eq!(f.bus.misc(slot, MiscGroup::Op, op::CFG00), config.words()[0]);
            assert_eq!(f.bus.misc(slot, MiscGroup::Op, 15), config.words()[15]);
        }
        assert_eq!(
            f.registry.handle(0, 1).unwrap().last_op_config.unwrap().get(OpField::DiversityConfig),
            0x13D
        );
        assert_eq!(f.rf.tunes().len(), 2);
    }

    #[test]
    fn test_op_config_uses_master_board_settings() {
        let mut options = SimulatedBus::slot_options(BoardTopology::TwoDiversity);
        options[1].osc_khz = 19200;
        let f = fixture(&options, DriverConfig::default());

        f.registry
            .tune(0, 473143, &TuneRequest::new(Segment::FullSeg))
            .unwrap();

        // spur suppression follows the master's 38400 kHz crystal on both slots
        for slot in 0..2 {
            let config = f.registry.handle(0, slot).unwrap().last_op_config.unwrap();
            assert_eq!(config.get(OpField::RcStepHigh), 0x18);
        }
        let slave = f.registry.handle(0, 1).unwrap().last_op_config.unwrap();
        assert_eq!(slave.get(OpField::DiversityConfig), 0x13D);
        assert_eq!(f.rf.tunes()[1].osc_khz, 19200);
    }

    #[test]
    fn test_retune_writes_changed_words_only() {
        let f = single();
        let request = TuneRequest::new(Segment::FullSeg);
        f.registry.tune(0, 473143, &request).unwrap();
        f.bus.clear_misc_log();

        f.registry.tune(0, 473143, &request).unwrap();

        // pause request, then the frequency word alone
        assert_eq!(
            f.bus.misc_log(0, MiscGroup::Op),
            vec![op::CFG06, op::CFG06]
        );
    }

    #[test]
    fn test_retune_same_pll_skips_change() {
        let f = single();
        let request = TuneRequest::new(Segment::FullSeg);
        f.registry.tune(0, 473143, &request).unwrap();
        let updates = f.bus.pll_updates(0);

        f.registry.tune(0, 473143, &request).unwrap();
        assert_eq!(f.bus.pll_updates(0), updates);
    }

    #[test]
    fn test_pll_policy_always_reapplies() {
        let f = fixture(
            &[ReceiverOptions::default()],
            DriverConfig {
                pll_policy: PllPolicy::Always,
                ..Default::default()
            },
        );
        let request = TuneRequest::new(Segment::FullSeg);
        f.registry.tune(0, 473143, &request).unwrap();
        let updates = f.bus.pll_updates(0);

        f.registry.tune(0, 473143, &request).unwrap();
        assert_eq!(f.bus.pll_updates(0), updates + 1);
    }

    #[test]
    fn test_pll_override_is_never_changed() {
        let options = ReceiverOptions {
            pll_override: Some(PLL_ISDB_T_FULLSEG),
            ..Default::default()
        };
        let f = fixture(&[options], DriverConfig::default());
        let updates = f.bus.pll_updates(0);

        f.registry
            .tune(0, 99143, &TuneRequest::new(Segment::FullSeg))
            .unwrap();
        assert_eq!(f.bus.pll_updates(0), updates);
        assert_eq!(f.registry.handle(0, 0).unwrap().pll, PLL_ISDB_T_FULLSEG);
    }

    #[test]
    fn test_tmm_shift_rejects_non_positive_frequency() {
        let f = single();
        let request = TuneRequest::new(Segment::Tmm(TmmSlot::A1st1Seg));

        assert_eq!(
            f.registry.tune(0, 5000, &request),
            Err(DriverError::InvalidFrequency(-1857))
        );
        assert_eq!(f.registry.tune_state(0).unwrap(), TuneState::Idle);
        assert!(f.rf.tunes().is_empty());
        assert!(!f.registry.handle(0, 0).unwrap().tuned);
    }

    #[test]
    fn test_tmm_shift_overflow_is_rejected() {
        let f = single();
        let request = TuneRequest::new(Segment::Tmm(TmmSlot::C7th1Seg));

        assert_eq!(
            f.registry.tune(0, i32::MAX, &request),
            Err(DriverError::InvalidFrequency(i32::MAX))
        );
        assert!(f.rf.tunes().is_empty());
    }

    #[test]
    fn test_tmm_tune_uses_shifted_frequency() {
        let f = single();
        let request = TuneRequest::new(Segment::Tmm(TmmSlot::A1st1Seg));
        f.registry.tune(0, 214714, &request).unwrap();

        let tunes = f.rf.tunes();
        assert_eq!(tunes.len(), 1);
        assert_eq!(tunes[0].frequency_khz, 214714 - 6857);
        assert_eq!(tunes[0].bandwidth_khz, 6000);
        assert_eq!(tunes[0].osc_khz, 38400);
    }

    #[test]
    fn test_stuck_stop_ack_is_not_fatal() {
        let f = single();
        let request = TuneRequest::new(Segment::FullSeg);
        f.registry.tune(0, 473143, &request).unwrap();
        f.bus.set_stuck_stop_ack(0, true);
        let before = f.platform.now_ms();

        f.registry.tune(0, 473143, &request).unwrap();

        assert!(f.platform.now_ms() - before >= 300);
        assert_eq!(f.registry.tune_state(0).unwrap(), TuneState::Streaming);
    }

    #[test]
    fn test_rf_switching_follows_band() {
        let options = ReceiverOptions {
            rf_switch_gpio: Some(9),
            ..Default::default()
        };
        let f = fixture(&[options], DriverConfig::default());
        let request = TuneRequest::new(Segment::FullSeg);

        f.registry.tune(0, 99143, &request).unwrap();
        assert_eq!(f.bus.gpio(0, 1, regs::GPIO_DR) & 0x02, 0x02);
        assert_eq!(f.bus.gpio(0, 1, regs::GPIO_LR) & 0x02, 0);

        f.registry.tune(0, 473143, &request).unwrap();
        assert_eq!(f.bus.gpio(0, 1, regs::GPIO_LR) & 0x02, 0x02);
        assert_eq!(f.bus.gpio(0, 0, regs::GPIO_LR), 0);
    }

    #[test]
    fn test_main_io_resizes_buffer_a() {
        let options = ReceiverOptions {
            stream_interface: StreamInterface::MainIo,
            ..Default::default()
        };
        let f = fixture(&[options], DriverConfig::default());

        let request = TuneRequest {
            fifo_threshold: Some(0x1000),
            ..TuneRequest::new(Segment::Partial1Seg)
        };
        f.registry.tune(0, 473143, &request).unwrap();
        assert_eq!(f.bus.register(0, regs::OBUFF_A_END), 0x67);
        assert_eq!(f.bus.register(0, regs::OBUFF_A_END + 1), 0xD6);
        assert_eq!(f.bus.register(0, regs::OBUFF_A_FIFO_THR), 0x04);
        assert_eq!(f.bus.register(0, regs::OBUFF_A_FIFO_THR + 1), 0x00);

        f.registry
            .tune(0, 473143, &TuneRequest::new(Segment::FullSeg))
            .unwrap();
        assert_eq!(f.bus.register(0, regs::OBUFF_A_END), 0x9F);
        assert_eq!(f.bus.register(0, regs::OBUFF_A_END + 1), 0xD5);
    }

    #[test]
    fn test_rf_failure_is_not_fatal() {
        let f = single();
        f.rf.set_fail_tunes(true);

        f.registry
            .tune(0, 473143, &TuneRequest::new(Segment::FullSeg))
            .unwrap();
        assert_eq!(f.rf.tunes().len(), 1);
        assert!(f.registry.handle(0, 0).unwrap().stream_started);
    }

    #[test]
    fn test_tune_requires_attach() {
        let f = single();
        f.registry.detach(0).unwrap();
        assert_eq!(
            f.registry.tune(0, 473143, &TuneRequest::new(Segment::FullSeg)),
            Err(DriverError::NotAttached(0))
        );
    }
}
