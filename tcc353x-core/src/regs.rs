//! Register map of the TCC353x command interface.
//!
//! Registers named `*_0xNN` in the register configuration blob live at that
//! address; the rest are fixed by the chip.

// System control
pub const CHIP_ID: u8 = 0x00;
pub const REMAP: u8 = 0x01;
pub const IRQ_MODE: u8 = 0x02;
pub const SYS_EN: u8 = 0x03;
pub const SYS_RESET: u8 = 0x04;
pub const IRQ_EN: u8 = 0x05;
pub const IRQ_STAT_CLR: u8 = 0x06;
pub const PROGRAM_ID: u8 = 0x07;
pub const XTAL_BIAS: u8 = 0x08;
pub const XTAL_BIAS_KEY: u8 = 0x09;
pub const IO_CFG_MUX: u8 = 0x0A;
/// Remap, PC high, PC low.
pub const INIT_REMAP_PC: u8 = 0x0D;

// GPIO banks: one register per bank for each function
pub const GPIO_ALT: u8 = 0x10;
pub const GPIO_DR: u8 = 0x11;
pub const GPIO_LR: u8 = 0x12;
pub const GPIO_DRV: u8 = 0x13;
pub const GPIO_PE: u8 = 0x14;
pub const GPIO_SDRV: u8 = 0x15;
pub const IO_MISC: u8 = 0x16;

// Misc (indirect 32-bit) register window
pub const MISC_CTRL: u8 = 0x18;
pub const MISC_ADDR: u8 = 0x19;
pub const MISC_DATA: u8 = 0x1A;

// Stream data configuration 0..=3
pub const STREAM_CFG0: u8 = 0x1B;
pub const STREAM_CFG1: u8 = 0x1C;
pub const STREAM_CFG2: u8 = 0x1D;
pub const STREAM_CFG3: u8 = 0x1E;

// Mailbox
pub const MAIL_CTRL: u8 = 0x20;
pub const MAIL_FIFO_W_STAT: u8 = 0x21;
pub const MAIL_FIFO_R_STAT: u8 = 0x22;
pub const MAIL_FIFO_WIND: u8 = 0x23;

// Command DMA (code download)
pub const DMA_CRC32: u8 = 0x24;
pub const CMDDMA_CTRL: u8 = 0x3A;
pub const CMDDMA_ADDR: u8 = 0x3C;
pub const CMDDMA_SIZE: u8 = 0x40;
pub const CMDDMA_DATA_WIND: u8 = 0x44;

// Peripheral (SPI/TS output) configuration 0..=3
pub const PERI_CFG0: u8 = 0x30;

// PLL
pub const PLL_6: u8 = 0x36;
pub const PLL_7: u8 = 0x37;
pub const PLL_8: u8 = 0x38;
pub const PLL_9: u8 = 0x39;

// Output buffers
pub const OBUFF_CONFIG: u8 = 0x4E;
pub const OBUFF_INIT: u8 = 0x4F;
pub const OBUFF_A_START: u8 = 0x50;
pub const OBUFF_A_END: u8 = 0x52;
pub const OBUFF_A_FIFO_THR: u8 = 0x54;
pub const OBUFF_A_FIFO_STAT: u8 = 0x56;
pub const OBUFF_B_START: u8 = 0x58;
pub const OBUFF_B_END: u8 = 0x5A;
pub const OBUFF_C_START: u8 = 0x60;
pub const OBUFF_C_END: u8 = 0x62;
pub const OBUFF_D_START: u8 = 0x68;
pub const OBUFF_D_END: u8 = 0x6A;

/// 32-byte demodulator status block.
pub const OP_STATUS: u8 = 0x70;
pub const OP_STATUS_SIZE: usize = 32;

// SYS_EN bits
pub const SYS_EN_EP: u8 = 0x80;
pub const SYS_EN_DSP: u8 = 0x40;
pub const SYS_EN_OPCLK: u8 = 0x20;
pub const SYS_EN_RF: u8 = 0x10;
pub const SYS_EN_ALL: u8 = SYS_EN_EP | SYS_EN_DSP | SYS_EN_OPCLK | SYS_EN_RF;

// SYS_RESET bits
pub const SYS_RESET_EP: u8 = 0x80;
pub const SYS_RESET_DSP: u8 = 0x40;

// PLL_6 update strobe
pub const PLL_6_UPDATE: u8 = 0x80;

// PROGRAM_ID bits
pub const PROGRAM_ID_STOP_ACK: u8 = 0x02;

// IRQ bits
pub const IRQ_EN_FIFO_A_INIT: u8 = 0x01;
pub const IRQ_EN_FIFO_OVERRUN: u8 = 0x08;
pub const IRQ_STAT_CLR_ALL: u8 = 0x7F;

// STREAM_CFG3 bits
pub const STREAM_DATA_ENABLE: u8 = 0x10;
pub const STREAM_FIFO_EN: u8 = 0x08;
pub const STREAM_FIFO_INIT: u8 = 0x04;

// OBUFF_CONFIG bits
pub const OBUFF_A_EN: u8 = 0x01;
pub const OBUFF_B_EN: u8 = 0x02;
pub const OBUFF_C_EN: u8 = 0x04;
pub const OBUFF_D_EN: u8 = 0x08;
pub const OBUFF_ALL_EN: u8 = OBUFF_A_EN | OBUFF_B_EN | OBUFF_C_EN | OBUFF_D_EN;

// PERI_CFG0 bits
pub const PERI_EN: u8 = 0x80;
pub const PERI_INIT_AUTOCLR: u8 = 0x01;
pub const PERI_MODE_MASK: u8 = 0x30;
pub const PERI_MODE_SPI: u8 = 0x10;
pub const PERI_MODE_TS: u8 = 0x20;

// MAIL_CTRL / MAIL_FIFO_W_STAT bits
pub const MAIL_CTRL_INIT: u8 = 0x01;
pub const MAIL_CTRL_SET: u8 = 0x02;
pub const MAIL_FIFO_W_READY: u8 = 0x01;
pub const MAIL_FIFO_COUNT_MASK: u8 = 0x1F;

// CMDDMA_CTRL bits
pub const CMDDMA_INIT: u8 = 0x01;
pub const CMDDMA_START: u8 = 0x02;
pub const CMDDMA_WRITE: u8 = 0x80;

/// Chip memory address code is downloaded to.
pub const CODE_BASE_ADDRESS: u32 = 0x0000_0000;

// MISC_CTRL bits and register groups
pub const MISC_WRITE: u8 = 0x80;
pub const MISC_AUTO_INCREMENT: u8 = 0x40;
pub const MISC_GROUP_MASK: u8 = 0x0F;

/// Indirect register groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MiscGroup {
    Op = 0x01,
    Sdram = 0x02,
}

/// Registers in the op group.
pub mod op {
    pub const CFG00: u8 = 0x00;
    /// Carries the stop/pause request bit.
    pub const CFG06: u8 = 0x06;
    pub const CFG06_PAUSE: u32 = 0x100;
    pub const FILTER_CFG: u8 = 0x10;
    pub const CAS_SYSTEM_KEY0: u8 = 0x20;
    pub const CAS_EVEN_KEY_L: u8 = 0x28;
    pub const CAS_ODD_KEY_L: u8 = 0x2A;
    pub const CAS_IV0: u8 = 0x2C;
}

/// SDRAM controller setup applied to slot 0 after the DSP restarts.
pub const SDRAM_INIT_SEQUENCE: &[(u8, u32)] = &[
    (9, 0x56),
    (5, 0x8000),
    (6, 0x0010_000F),
    (0, 0x4748_2400),
    (3, 0xF0),
    (2, 0x72),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x20),
    (4, 0x460),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (4, 0x1FFFF),
    (13, 0x8000_0E00),
];

/// Crystal bias programmed during init.
pub const XTAL_BIAS_VALUE: u8 = 7;
pub const XTAL_BIAS_KEY_VALUE: u8 = 0x5E;

/// Buffer A end address for 1-segment class services on main-I/O output.
pub const OBUFF_A_END_SMALL: u32 = 0x0001_9F5B;
/// Buffer A end address for 13-segment class services on main-I/O output.
pub const OBUFF_A_END_LARGE: u32 = 0x0002_7F57;
