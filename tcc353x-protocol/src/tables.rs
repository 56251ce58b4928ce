//! DPLL and spur-suppression frequency tables.
//!
//! Each table maps a channel frequency (kHz, pre-quantised to the channel
//! grid) to the PLL word that keeps the clock harmonics away from the wanted
//! signal, together with the RC step and ADC clock setting used when the
//! crystal runs at 38.4 MHz. Entries are sorted by frequency and every table
//! ends with a single sentinel (frequency 0) whose PLL word is the fallback.

/// 117.6 MHz.
pub const PLL_ISDB_T_FULLSEG: u16 = 0xB08E;
/// 120.0 MHz.
pub const PLL_ISDB_T_FULLSEG_31: u16 = 0xB18E;
/// 117.6 MHz.
pub const PLL_ISDB_T_FULLSEG_30: u16 = 0xB08E;
/// 115.2 MHz.
pub const PLL_ISDB_T_FULLSEG_2F: u16 = 0xAF8E;
/// 112.8 MHz.
pub const PLL_ISDB_T_FULLSEG_2E: u16 = 0xAE8E;
/// 110.4 MHz.
pub const PLL_ISDB_T_FULLSEG_2D: u16 = 0xAD8E;
/// 108.0 MHz.
pub const PLL_ISDB_T_FULLSEG_2C: u16 = 0xAC8E;
/// 105.6 MHz.
pub const PLL_ISDB_T_FULLSEG_2B: u16 = 0xAB8E;
/// 103.2 MHz.
pub const PLL_ISDB_T_FULLSEG_2A: u16 = 0xAA8E;

/// 40.0 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG: u16 = 0x9816;
/// 38.4 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_384: u16 = 0x8F0E;
/// 40.8 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_408: u16 = 0x900E;
/// 41.6 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_416: u16 = 0x9916;
/// 43.2 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_432: u16 = 0x910E;
/// 45.6 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_456: u16 = 0x920E;
/// 46.4 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_464: u16 = 0x9C16;
/// 49.6 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_496: u16 = 0x9E16;
/// 51.2 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_512: u16 = 0x9F16;
/// 52.8 MHz.
pub const PLL_ISDB_T_PARTIAL_1_SEG_528: u16 = 0xA016;

/// 68.8 MHz.
pub const PLL_ISDB_TMM_FULLSEG: u16 = 0xAA16;
/// 38.4 MHz.
pub const PLL_ISDB_TMM_PARTIAL_1_SEG: u16 = 0x8F0E;
/// 38.4 MHz.
pub const PLL_ISDB_TMM_PARTIAL_1_SEG_384: u16 = 0x8F0E;
/// 45.6 MHz.
pub const PLL_ISDB_TMM_PARTIAL_1_SEG_456: u16 = 0x920E;

/// 40.0 MHz.
pub const PLL_ISDB_TSB: u16 = 0x9816;

/// One row of a DPLL table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyTableEntry {
    /// Channel frequency in kHz; zero marks the sentinel.
    pub frequency_khz: u32,
    pub pll: u16,
    pub rc_step_high: u8,
    pub rc_step_low: u32,
    pub adc_clk_cfg: u8,
}

impl FrequencyTableEntry {
    pub fn is_sentinel(&self) -> bool {
        self.frequency_khz == 0
    }

    /// 40-bit RC step.
    pub fn rc_step(&self) -> u64 {
        ((self.rc_step_high as u64) << 32) | self.rc_step_low as u64
    }
}

const fn entry(
    frequency_khz: u32,
    pll: u16,
    rc_step_high: u8,
    rc_step_low: u32,
    adc_clk_cfg: u8,
) -> FrequencyTableEntry {
    FrequencyTableEntry {
        frequency_khz,
        pll,
        rc_step_high,
        rc_step_low,
        adc_clk_cfg,
    }
}

const fn sentinel(pll: u16) -> FrequencyTableEntry {
    entry(0, pll, 0, 0, 0)
}

/// ISDB-Tmm 1-segment time slots.
pub const TMM_1SEG: &[FrequencyTableEntry] = &[
    entry(207857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215571, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(216000, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(219000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(220286, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(220714, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221143, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    sentinel(PLL_ISDB_TMM_PARTIAL_1_SEG),
];

/// ISDB-Tmm 13-segment time slots.
pub const TMM_13SEG: &[FrequencyTableEntry] = &[
    entry(210429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(213429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    sentinel(PLL_ISDB_TMM_FULLSEG),
];

/// User-defined ISDB-Tmm 1-segment grid.
pub const TMM_USER_1SEG: &[FrequencyTableEntry] = &[
    entry(207857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210857, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(211286, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(211714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(212143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(212571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215571, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(216000, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(216429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(216857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(217286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(217714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(218143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(218571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(220286, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(220714, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221143, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    sentinel(PLL_ISDB_TMM_FULLSEG),
];

/// User-defined ISDB-Tmm 13-segment grid.
pub const TMM_USER_13SEG: &[FrequencyTableEntry] = &[
    entry(207857, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(208286, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(208714, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(209143, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(209571, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(210000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(210429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(210857, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(211286, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(211714, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(212143, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(212571, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(213000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(213429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(213857, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(214286, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(214714, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(215143, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(215571, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216857, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(217286, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(217714, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(218143, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(218571, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219857, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(220286, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(220714, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(221143, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(221571, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    sentinel(PLL_ISDB_TMM_FULLSEG),
];

/// ISDB-T partial reception (1 of 13 segments) on a low-IF front end.
pub const PARTIAL_1SEG: &[FrequencyTableEntry] = &[
    entry(93143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(99143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(105143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(173143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(177143, PLL_ISDB_T_PARTIAL_1_SEG_496, 0x2E, 0x4578_FCB9, 0x0A),
    entry(179143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(183143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(185143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(189143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(191143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(195143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(201143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(207143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(207857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(208714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(209571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(210429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(213857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214286, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(214714, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215143, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(215571, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(216000, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(219000, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(219429, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(219857, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(220286, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(220714, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221143, PLL_ISDB_TMM_PARTIAL_1_SEG_456, 0x1B, 0xDFC6_F7F1, 0x0A),
    entry(221571, PLL_ISDB_TMM_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(473143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(479143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(485143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(491143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(497143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(503143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(509143, PLL_ISDB_T_PARTIAL_1_SEG_496, 0x2E, 0x4578_FCB9, 0x0A),
    entry(515143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(521143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(527143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(533143, PLL_ISDB_T_PARTIAL_1_SEG_432, 0x0F, 0x3352_05B8, 0x0A),
    entry(539143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(545143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(551143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(557143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(563143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(569143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(575143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(581143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(587143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(593143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(599143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(605143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(611143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(617143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(623143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(629143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(635143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(641143, PLL_ISDB_T_PARTIAL_1_SEG_512, 0x34, 0xD34D_34D3, 0x0A),
    entry(647143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(653143, PLL_ISDB_T_PARTIAL_1_SEG_496, 0x2E, 0x4578_FCB9, 0x0A),
    entry(659143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(665143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(671143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(677143, PLL_ISDB_T_PARTIAL_1_SEG_496, 0x2E, 0x4578_FCB9, 0x0A),
    entry(683143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(689143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(695143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(701143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(707143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(713143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(719143, PLL_ISDB_T_PARTIAL_1_SEG_432, 0x0F, 0x3352_05B8, 0x0A),
    entry(725143, PLL_ISDB_T_PARTIAL_1_SEG_416, 0x05, 0xF05F_05F0, 0x0A),
    entry(731143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(737143, PLL_ISDB_T_PARTIAL_1_SEG_496, 0x2E, 0x4578_FCB9, 0x0A),
    entry(743143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(749143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(755143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(761143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(767143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(773143, PLL_ISDB_T_PARTIAL_1_SEG_464, 0x1F, 0xCEAD_7815, 0x0A),
    entry(779143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(785143, PLL_ISDB_T_PARTIAL_1_SEG_408, 0x01, 0x0929_ABB3, 0x0A),
    entry(791143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    entry(797143, PLL_ISDB_T_PARTIAL_1_SEG_432, 0x0F, 0x3352_05B8, 0x0A),
    entry(803143, PLL_ISDB_T_PARTIAL_1_SEG_384, 0x27, 0x47C9_D1F2, 0x28),
    sentinel(PLL_ISDB_TMM_FULLSEG),
];

/// ISDB-T full-segment reception.
pub const FULLSEG: &[FrequencyTableEntry] = &[
    entry(93143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(99143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(105143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(111143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(117143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(123143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(129143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(135143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(141143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(147143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(153143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(159143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(167143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(173143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(177143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(179143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(183143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(185143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(189143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(191143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(195143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(201143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(207143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(210429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(213143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(213429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(225143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(231143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(237143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(243143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(249143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(255143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(261143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(267143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(273143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(279143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(285143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(291143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(297143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(303143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(309143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(315143, PLL_ISDB_T_FULLSEG_2E, 0x27, 0x47C9_D1F2, 0x21),
    entry(321143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(327143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(333143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(339143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(345143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(351143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(357143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(363143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(369143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(375143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(381143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(387143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(393143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(399143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(405143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(411143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(417143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(423143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(429143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(435143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(441143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(447143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(453143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(459143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(465143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(473143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(479143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(485143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(491143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(497143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(503143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(509143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(515143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(521143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(527143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(533143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(539143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(545143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(551143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(557143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(563143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(569143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(575143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(581143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(587143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(593143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(599143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(605143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(611143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(617143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(623143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(629143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(635143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(641143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(647143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(653143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(659143, PLL_ISDB_T_FULLSEG_2E, 0x27, 0x47C9_D1F2, 0x21),
    entry(665143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(671143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(677143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(683143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(689143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(695143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(701143, PLL_ISDB_T_FULLSEG_2E, 0x27, 0x47C9_D1F2, 0x21),
    entry(707143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(713143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(719143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(725143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(731143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(737143, PLL_ISDB_T_FULLSEG_2E, 0x27, 0x47C9_D1F2, 0x21),
    entry(743143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(749143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(755143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(761143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(767143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(773143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(779143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(785143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(791143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(797143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(803143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    sentinel(PLL_ISDB_T_FULLSEG_2E),
];

/// Leading full-seg rows scanned for partial reception on a zero-IF front end,
/// in scan order. Has no sentinel; frequencies past these rows fall back to
/// the partial-reception clock.
pub const FULLSEG_FOR_PARTIAL: &[FrequencyTableEntry] = &[
    entry(213429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(210429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(219000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(210429, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(216000, PLL_ISDB_TMM_FULLSEG, 0x0E, 0x1499_D87F, 0x02),
    entry(93143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(99143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(105143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(173143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(179143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(185143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(191143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(177143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(183143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(189143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(195143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(201143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(207143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(213143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(219143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(111143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(117143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(123143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(129143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(135143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(141143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(147143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(153143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(159143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(167143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(225143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(231143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(237143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(243143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(249143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(255143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(261143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(267143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(273143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(279143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(285143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(291143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(297143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(303143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(309143, PLL_ISDB_T_FULLSEG_31, 0x2F, 0xF2FF_2FF2, 0x03),
    entry(315143, PLL_ISDB_T_FULLSEG_2E, 0x27, 0x47C9_D1F2, 0x21),
    entry(321143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(327143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(333143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(339143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(345143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(351143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(357143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(363143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(369143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(375143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(381143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
    entry(387143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(393143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(399143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(405143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(411143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(417143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x03),
    entry(423143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(429143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(435143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(441143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(447143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(453143, PLL_ISDB_T_FULLSEG_2A, 0x27, 0x47C9_D1F2, 0x21),
    entry(459143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(465143, PLL_ISDB_T_FULLSEG_2B, 0x27, 0x47C9_D1F2, 0x21),
    entry(473143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(479143, PLL_ISDB_T_FULLSEG_2C, 0x18, 0xD51B_8A9C, 0x03),
    entry(485143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(491143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(497143, PLL_ISDB_T_FULLSEG_2E, 0x22, 0xAB5B_BB2E, 0x03),
    entry(503143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(509143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(515143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(521143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(527143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(533143, PLL_ISDB_T_FULLSEG_2F, 0x27, 0x47C9_D1F2, 0x21),
    entry(539143, PLL_ISDB_T_FULLSEG_30, 0x2B, 0xB409_9EA4, 0x03),
    entry(545143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(551143, PLL_ISDB_T_FULLSEG_30, 0x27, 0x47C9_D1F2, 0x21),
    entry(557143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(563143, PLL_ISDB_T_FULLSEG_2A, 0x0E, 0x1499_D87F, 0x03),
    entry(569143, PLL_ISDB_T_FULLSEG_2D, 0x27, 0x47C9_D1F2, 0x21),
    entry(575143, PLL_ISDB_T_FULLSEG_2D, 0x1D, 0xDB9A_F156, 0x03),
    entry(581143, PLL_ISDB_T_FULLSEG_31, 0x27, 0x47C9_D1F2, 0x21),
    entry(587143, PLL_ISDB_T_FULLSEG_2C, 0x27, 0x47C9_D1F2, 0x21),
    entry(593143, PLL_ISDB_T_FULLSEG_2B, 0x13, 0x9421_FC4E, 0x03),
];

/// Every shipped table with its name, for diagnostics and tests.
pub const ALL_TABLES: [(&str, &[FrequencyTableEntry]); 6] = [
    ("tmm-1seg", TMM_1SEG),
    ("tmm-13seg", TMM_13SEG),
    ("tmm-user-1seg", TMM_USER_1SEG),
    ("tmm-user-13seg", TMM_USER_13SEG),
    ("partial-1seg", PARTIAL_1SEG),
    ("fullseg", FULLSEG),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sorted_with_single_sentinel() {
        for (name, table) in ALL_TABLES {
            let sentinels = table.iter().filter(|e| e.is_sentinel()).count();
            assert_eq!(sentinels, 1, "{}", name);
            assert!(table.last().map_or(false, |e| e.is_sentinel()), "{}", name);

            let rows = &table[..table.len() - 1];
            for pair in rows.windows(2) {
                assert!(
                    pair[0].frequency_khz < pair[1].frequency_khz,
                    "{}: {} !< {}",
                    name,
                    pair[0].frequency_khz,
                    pair[1].frequency_khz
                );
            }
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(TMM_1SEG.len(), 22);
        assert_eq!(TMM_13SEG.len(), 5);
        assert_eq!(TMM_USER_1SEG.len(), 34);
        assert_eq!(TMM_USER_13SEG.len(), 34);
        assert_eq!(PARTIAL_1SEG.len(), 93);
        assert_eq!(FULLSEG.len(), 127);
        assert_eq!(FULLSEG_FOR_PARTIAL.len(), 93);
    }

    #[test]
    fn test_fullseg_for_partial_rows_match_fullseg() {
        assert!(FULLSEG_FOR_PARTIAL.iter().all(|e| !e.is_sentinel()));
        for row in FULLSEG_FOR_PARTIAL {
            assert!(FULLSEG.contains(row), "{}", row.frequency_khz);
        }
        assert_eq!(
            FULLSEG_FOR_PARTIAL.last().map(|e| e.frequency_khz),
            Some(593143)
        );
    }

    #[test]
    fn test_sentinel_plls() {
        assert_eq!(TMM_1SEG[TMM_1SEG.len() - 1].pll, PLL_ISDB_TMM_PARTIAL_1_SEG);
        assert_eq!(TMM_13SEG[TMM_13SEG.len() - 1].pll, PLL_ISDB_TMM_FULLSEG);
        assert_eq!(PARTIAL_1SEG[PARTIAL_1SEG.len() - 1].pll, PLL_ISDB_TMM_FULLSEG);
        assert_eq!(FULLSEG[FULLSEG.len() - 1].pll, PLL_ISDB_T_FULLSEG_2E);
    }

    #[test]
    fn test_rc_step() {
        let row = FULLSEG
            .iter()
            .find(|e| e.frequency_khz == 473143)
            .copied()
            .unwrap();
        assert_eq!(row.rc_step() >> 32, row.rc_step_high as u64);
        assert_eq!(row.rc_step() & 0xFFFF_FFFF, row.rc_step_low as u64);
    }
}
