//! Per-slot receiver state.

use serde::Serialize;
use tcc353x_protocol::{OpConfig, StreamFormat, TuneRequest};

use crate::bus::BusTarget;
use crate::options::ReceiverOptions;

/// Where a module is in the tune sequence.
///
/// Tracked per module; every diversity slot moves through the states in
/// lock-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TuneState {
    #[default]
    Idle,
    Stopping,
    Reconfiguring,
    Streaming,
}

/// State of one (module, slot) receiver.
#[derive(Debug, Clone)]
pub struct ReceiverHandle {
    pub module: usize,
    pub slot: usize,
    pub options: ReceiverOptions,
    /// Address the chip answers on individually.
    pub original_address: u8,
    /// Address used for bus transfers. Differs from `original_address`
    /// only while a ganged download is in progress.
    pub current_address: u8,
    /// PLL word applied to the chip.
    pub pll: u16,
    /// Selects the PLL per channel. Authoritative on slot 0 only.
    pub use_default_pll: bool,
    /// Main clock derived from the applied PLL word.
    pub main_clock_khz: u32,
    pub tuned: bool,
    pub stream_started: bool,
    /// Last tune request, kept for re-deriving the op-config.
    pub tune_request: Option<TuneRequest>,
    pub stream_format: Option<StreamFormat>,
    /// Last op-config written to the chip; drives sparse rewrites.
    pub last_op_config: Option<OpConfig>,
    /// Raw DSP code version word reported after init.
    pub dsp_code_version: Option<u32>,
}

impl ReceiverHandle {
    pub(crate) fn new(module: usize, slot: usize, options: ReceiverOptions) -> Self {
        let address = options.interface.wire_address(options.address);
        Self {
            module,
            slot,
            original_address: address,
            current_address: address,
            pll: options.pll_override.unwrap_or(0),
            use_default_pll: options.pll_override.is_none(),
            main_clock_khz: 0,
            tuned: false,
            stream_started: false,
            tune_request: None,
            stream_format: None,
            last_op_config: None,
            dsp_code_version: None,
            options,
        }
    }

    /// Bus addressing for the next transfer.
    pub fn target(&self) -> BusTarget {
        BusTarget {
            module: self.module,
            slot: self.slot,
            interface: self.options.interface,
            address: self.current_address,
        }
    }

    /// Point transfers back at the chip's own address.
    pub(crate) fn restore_address(&mut self) {
        self.current_address = self.original_address;
    }

    /// Point transfers at every ganged chip at once.
    pub(crate) fn use_broadcast_address(&mut self) {
        self.current_address = self.options.interface.broadcast_address();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcc353x_protocol::CommandInterface;

    #[test]
    fn test_spi_address_is_shifted() {
        let options = ReceiverOptions {
            interface: CommandInterface::TccSpi,
            address: 0xA8,
            ..Default::default()
        };
        let mut handle = ReceiverHandle::new(0, 1, options);
        assert_eq!(handle.original_address, 0x54);
        assert_eq!(handle.target().address, 0x54);

        handle.use_broadcast_address();
        assert_eq!(handle.current_address, 0x50);
        assert!(handle.target().is_broadcast());

        handle.restore_address();
        assert_eq!(handle.current_address, 0x54);
    }

    #[test]
    fn test_pll_override_disables_auto_selection() {
        let options = ReceiverOptions {
            pll_override: Some(0xB08E),
            ..Default::default()
        };
        let handle = ReceiverHandle::new(0, 0, options);
        assert!(!handle.use_default_pll);
        assert_eq!(handle.pll, 0xB08E);

        let handle = ReceiverHandle::new(0, 0, ReceiverOptions::default());
        assert!(handle.use_default_pll);
    }
}
