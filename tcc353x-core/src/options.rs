//! Per-slot attach options and driver-wide configuration.

use serde::{Deserialize, Serialize};
use tcc353x_protocol::{
    BasebandVariant, BoardTopology, CommandInterface, DiversityRole, StreamInterface,
};

/// Default register values written during init, one blob per chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    pub irq_mode_0x02: u8,
    pub init_remap_0x0d: u8,
    pub init_pc_0x0e: u8,
    pub init_pc_0x0f: u8,
    /// GPIO alternate function, banks 7:0, 15:8, 23:16.
    pub gpio_alt_0x10: [u8; 3],
    pub gpio_dr_0x11: [u8; 3],
    pub gpio_lr_0x12: [u8; 3],
    pub gpio_drv_0x13: [u8; 3],
    pub gpio_pe_0x14: [u8; 3],
    pub gpio_sdrv_0x15: [u8; 3],
    pub io_misc_0x16: u8,
    /// Stream data configuration 0x1B..=0x1E.
    pub stream_data_config: [u8; 4],
    /// Peripheral configuration 0x30..=0x33.
    pub peri_config: [u8; 4],
    pub buffer_config_0x4e: u8,
    pub buffer_config_0x4f: u8,
    pub buffer_a_start: [u8; 2],
    pub buffer_a_end: [u8; 2],
    pub buffer_a_fifo_threshold: [u8; 2],
    pub buffer_b_start: [u8; 2],
    pub buffer_b_end: [u8; 2],
    pub buffer_c_start: [u8; 2],
    pub buffer_c_end: [u8; 2],
    pub buffer_d_start: [u8; 2],
    pub buffer_d_end: [u8; 2],
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            irq_mode_0x02: 0x00,
            init_remap_0x0d: 0x06,
            init_pc_0x0e: 0x00,
            init_pc_0x0f: 0x00,
            gpio_alt_0x10: [0x00; 3],
            gpio_dr_0x11: [0x00; 3],
            gpio_lr_0x12: [0x00; 3],
            gpio_drv_0x13: [0x00; 3],
            gpio_pe_0x14: [0x00; 3],
            gpio_sdrv_0x15: [0x00; 3],
            io_misc_0x16: 0x00,
            stream_data_config: [0x2F, 0x21, 0x00, 0x00],
            // SPI master, DLR 0
            peri_config: [0x10, 0x00, 0x00, 0x12],
            buffer_config_0x4e: 0x10,
            buffer_config_0x4f: 0x00,
            buffer_a_start: [0x00, 0x00],
            buffer_a_end: [0x9F, 0xD6],
            buffer_a_fifo_threshold: [0x0B, 0xC0],
            buffer_b_start: [0x00, 0x00],
            buffer_b_end: [0x00, 0x00],
            buffer_c_start: [0x00, 0x00],
            buffer_c_end: [0x00, 0x00],
            buffer_d_start: [0x00, 0x00],
            buffer_d_end: [0x00, 0x00],
        }
    }
}

/// Attach options for one diversity slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverOptions {
    pub interface: CommandInterface,
    /// 8-bit chip address as strapped on the board.
    pub address: u8,
    pub topology: BoardTopology,
    pub role: DiversityRole,
    pub baseband: BasebandVariant,
    pub stream_interface: StreamInterface,
    pub osc_khz: u32,
    /// Fixed PLL word; `None` selects the PLL per channel.
    pub pll_override: Option<u16>,
    pub use_interrupt: bool,
    /// GPIO driving the VHF/UHF antenna switch.
    pub rf_switch_gpio: Option<u8>,
    pub registers: RegisterConfig,
}

impl Default for ReceiverOptions {
    fn default() -> Self {
        Self {
            interface: CommandInterface::I2c,
            address: 0xA8,
            topology: BoardTopology::Single,
            role: DiversityRole::Master,
            baseband: BasebandVariant::Tcc3530,
            stream_interface: StreamInterface::Spi,
            osc_khz: 38400,
            pll_override: None,
            use_interrupt: false,
            rf_switch_gpio: None,
            registers: RegisterConfig::default(),
        }
    }
}

/// When the tune sequence reprograms the PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PllPolicy {
    /// Only when the selected word differs from the applied one.
    #[default]
    OnChange,
    /// On every tune, for boards that lose lock otherwise.
    Always,
}

/// Driver-wide tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub pll_policy: PllPolicy,
    /// 1 ms polls for the stop acknowledgment before carrying on.
    pub stop_ack_poll_limit: u32,
    /// 1 ms polls for a mailbox reply.
    pub mailbox_poll_limit: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            pll_policy: PllPolicy::OnChange,
            stop_ack_poll_limit: 300,
            mailbox_poll_limit: 100,
        }
    }
}
