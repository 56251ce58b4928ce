//! Programming the DPLL and switching it across a diversity gang.

use log::info;
use tcc353x_protocol::{main_clock_khz, PllRegisters};

use crate::channel::BestEffort;
use crate::registry::{ModuleSession, Registry};
use crate::regs;

/// Stability margin values written before every PLL update.
const PLL_8_MARGIN: u8 = 0x28;
const PLL_9_MARGIN: u8 = 0x64;

impl Registry {
    /// Program the PLL of one slot and derive its main clock.
    ///
    /// With automatic selection (slot 0's `use_default_pll`) `pll_word`
    /// becomes the slot's PLL; otherwise the configured override is applied.
    /// The caller holds the slot's op lock. Returns the derived main clock.
    pub(crate) fn apply_pll(&self, session: &ModuleSession, slot: usize, pll_word: u16) -> u32 {
        let use_default = session.master().use_default_pll;
        let (pll, osc_khz) = {
            let mut handle = session.handle(slot);
            if use_default {
                handle.pll = pll_word;
            }
            (handle.pll, handle.options.osc_khz)
        };

        let regs_pair = PllRegisters::from_word(pll);
        let channel = self.channel(session, slot);
        channel
            .write_u8(regs::PLL_8, PLL_8_MARGIN)
            .and_then(|_| channel.write_u8(regs::PLL_9, PLL_9_MARGIN))
            .and_then(|_| channel.write_u8(regs::PLL_6, regs_pair.pll6))
            .and_then(|_| channel.write_u8(regs::PLL_7, regs_pair.pll7))
            .and_then(|_| channel.write_u8(regs::PLL_6, regs_pair.pll6 | regs::PLL_6_UPDATE))
            .or_warn(format_args!("[{}:{}] PLL write", session.module, slot));
        self.platform.delay_ms(1);

        let clock = main_clock_khz(osc_khz, pll);
        session.handle(slot).main_clock_khz = clock;
        info!(
            "[{}:{}] PLL 0x{:04X}, main clock {} kHz",
            session.module, slot, pll, clock
        );
        clock
    }

    /// Switch every slot of the module to `pll_word`.
    ///
    /// Slaves are quiesced and reprogrammed before the master. Mailbox access
    /// is re-established on every slot before the op locks are released.
    pub(crate) fn change_pll(&self, session: &ModuleSession, pll_word: u16) {
        let _ops = session.lock_all_ops();

        for slot in session.descending() {
            let channel = self.channel(session, slot);
            channel
                .sys_enable(regs::SYS_EN_OPCLK)
                .or_warn(format_args!("[{}:{}] Clock disable", session.module, slot));
            self.platform.delay_ms(1);
            channel
                .sys_reset(regs::SYS_RESET_DSP)
                .or_warn(format_args!("[{}:{}] DSP reset", session.module, slot));
            self.platform.delay_ms(1);
            channel
                .sys_reset(regs::SYS_RESET_EP)
                .or_warn(format_args!("[{}:{}] EP reset", session.module, slot));

            self.apply_pll(session, slot, pll_word);

            channel
                .sys_enable(regs::SYS_EN_ALL)
                .or_warn(format_args!("[{}:{}] Subsystem enable", session.module, slot));
        }

        for slot in session.descending() {
            self.channel(session, slot)
                .get_access_mail()
                .or_warn(format_args!("[{}:{}] Mailbox access", session.module, slot));
        }
    }
}
