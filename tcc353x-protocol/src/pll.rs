//! PLL word decoding, automatic PLL selection and spur suppression lookup.

use crate::tables::{self, FrequencyTableEntry};
use crate::types::{Segment, TuneRequest, RfIfType, TmmSlot, SPUR_TABLE_OSC_KHZ};

/// Fixed-point scale used by the clock arithmetic.
pub const FIXED_POINT_SCALE: u32 = 22;

fn fixed_mul(a: u64, b: u64) -> u64 {
    (a * b) >> FIXED_POINT_SCALE
}

fn fixed_div(a: u64, b: u64) -> u64 {
    (a << FIXED_POINT_SCALE) / b
}

/// The PLL6/PLL7 register pair a PLL word expands to.
///
/// ```text
/// PLL6: | - | M | F F F F F F |     M  post-divide by 2, F+1 feedback divider
/// PLL7: | x | R R R R | OD OD | x | R+1 reference divider, OD output shift
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllRegisters {
    pub pll6: u8,
    pub pll7: u8,
}

impl PllRegisters {
    pub fn from_word(word: u16) -> Self {
        Self {
            pll6: ((word >> 8) & 0x7F) as u8,
            pll7: (word & 0xFF) as u8,
        }
    }

    /// M bit: halves the output clock when set.
    pub fn post_divide(&self) -> u32 {
        ((self.pll6 & 0x40) >> 6) as u32
    }

    /// Feedback divider F (1..=64).
    pub fn feedback_divider(&self) -> u32 {
        (self.pll6 & 0x3F) as u32 + 1
    }

    /// Reference divider R (1..=16).
    pub fn reference_divider(&self) -> u32 {
        ((self.pll7 >> 3) & 0x0F) as u32 + 1
    }

    /// Output divider shift OD (0..=3).
    pub fn output_shift(&self) -> u32 {
        ((self.pll7 & 0x06) >> 1) as u32
    }

    /// Derived main clock in kHz for the given crystal.
    pub fn main_clock_khz(&self, osc_khz: u32) -> u32 {
        let ratio = fixed_div(self.feedback_divider() as u64, self.reference_divider() as u64);
        let fvco = fixed_mul(osc_khz as u64, ratio);
        let fout = (fvco >> self.output_shift()) >> self.post_divide();
        fout as u32
    }
}

/// Derived main clock in kHz for a crystal and PLL word.
pub fn main_clock_khz(osc_khz: u32, pll_word: u16) -> u32 {
    PllRegisters::from_word(pll_word).main_clock_khz(osc_khz)
}

/// Output clock of the SPI/TS stream interface for a given divider.
pub fn stream_clock_khz(main_clock_khz: u32, divider: u32) -> u32 {
    main_clock_khz / ((1 + divider) << 1)
}

/// Scan `table` for `frequency_khz`.
///
/// Returns the matching row's PLL word. Reaching the sentinel returns the
/// sentinel's word; running off the end of a slice without one returns
/// `default_pll`.
pub fn select_pll(frequency_khz: u32, table: &[FrequencyTableEntry], default_pll: u16) -> u16 {
    for entry in table {
        if entry.is_sentinel() || entry.frequency_khz == frequency_khz {
            return entry.pll;
        }
    }
    default_pll
}

/// The DPLL tables automatic PLL selection can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PllTable {
    Partial1Seg,
    /// Full-seg rows used for partial reception on a zero-IF front end;
    /// frequencies without a row fall back to the partial-reception clock.
    FullSegForPartial,
    FullSeg,
    TmmUser13Seg,
    TmmUser1Seg,
    Tmm13Seg,
    Tmm1Seg,
}

impl PllTable {
    pub fn entries(&self) -> &'static [FrequencyTableEntry] {
        match self {
            PllTable::Partial1Seg => tables::PARTIAL_1SEG,
            PllTable::FullSegForPartial => tables::FULLSEG_FOR_PARTIAL,
            PllTable::FullSeg => tables::FULLSEG,
            PllTable::TmmUser13Seg => tables::TMM_USER_13SEG,
            PllTable::TmmUser1Seg => tables::TMM_USER_1SEG,
            PllTable::Tmm13Seg => tables::TMM_13SEG,
            PllTable::Tmm1Seg => tables::TMM_1SEG,
        }
    }

    pub fn default_pll(&self) -> u16 {
        match self {
            PllTable::Partial1Seg | PllTable::FullSegForPartial => tables::PLL_ISDB_T_PARTIAL_1_SEG,
            PllTable::FullSeg => tables::PLL_ISDB_T_FULLSEG,
            PllTable::TmmUser13Seg | PllTable::Tmm13Seg => tables::PLL_ISDB_TMM_FULLSEG,
            PllTable::TmmUser1Seg | PllTable::Tmm1Seg => tables::PLL_ISDB_TMM_PARTIAL_1_SEG,
        }
    }

    /// Table used for automatic PLL selection, or `None` for services with a fixed clock.
    pub fn for_request(request: &TuneRequest) -> Option<Self> {
        match request.segment {
            Segment::Partial1Seg if request.rf_if == RfIfType::LowIf => Some(PllTable::Partial1Seg),
            Segment::Partial1Seg => Some(PllTable::FullSegForPartial),
            Segment::FullSeg => Some(PllTable::FullSeg),
            Segment::Tmm(slot) => Some(Self::for_tmm(slot)),
            Segment::Tsb1Seg | Segment::Tsb3Seg | Segment::Tsb1Of3Seg => None,
        }
    }

    fn for_tmm(slot: TmmSlot) -> Self {
        match slot {
            TmmSlot::UserDefine13Seg => PllTable::TmmUser13Seg,
            TmmSlot::UserDefine1Seg => PllTable::TmmUser1Seg,
            s if s.is_thirteen_seg() => PllTable::Tmm13Seg,
            _ => PllTable::Tmm1Seg,
        }
    }
}

/// PLL word automatic selection picks for a tune.
pub fn auto_pll(request: &TuneRequest, frequency_khz: u32) -> u16 {
    match PllTable::for_request(request) {
        Some(table) => select_pll(frequency_khz, table.entries(), table.default_pll()),
        None if request.segment.is_tsb() => tables::PLL_ISDB_TSB,
        None => tables::PLL_ISDB_T_FULLSEG,
    }
}

/// Baseband values spur suppression may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpurSettings {
    pub rc_step: u64,
    pub adc_clk_cfg: u32,
    pub ici_cancellation: bool,
}

fn spur_table(segment: &Segment) -> Option<&'static [FrequencyTableEntry]> {
    match segment {
        Segment::Partial1Seg => Some(tables::PARTIAL_1SEG),
        Segment::FullSeg => Some(tables::FULLSEG),
        Segment::Tmm(slot) => Some(PllTable::for_tmm(*slot).entries()),
        Segment::Tsb1Seg | Segment::Tsb3Seg | Segment::Tsb1Of3Seg => None,
    }
}

/// Look up the spur-suppression row for a tune and apply it to `settings`.
///
/// RC step and ADC clock are only replaced on an exact frequency match with a
/// 38.4 MHz crystal. Full-seg frequencies whose row carries the ISDB-Tmm clock
/// switch ICI cancellation off regardless of crystal. Returns true when the
/// RC step and ADC clock were replaced.
pub fn apply_spur_suppression(
    segment: &Segment,
    frequency_khz: u32,
    osc_khz: u32,
    settings: &mut SpurSettings,
) -> bool {
    let table = match spur_table(segment) {
        Some(table) => table,
        None => return false,
    };

    let mut matched = None;
    let mut pll = 0;
    for entry in table {
        if entry.is_sentinel() {
            pll = entry.pll;
            break;
        }
        if entry.frequency_khz == frequency_khz {
            pll = entry.pll;
            matched = Some(entry);
            break;
        }
    }

    if *segment == Segment::FullSeg && pll == tables::PLL_ISDB_TMM_FULLSEG {
        settings.ici_cancellation = false;
    }

    match matched {
        Some(entry) if osc_khz == SPUR_TABLE_OSC_KHZ => {
            settings.rc_step = entry.rc_step();
            settings.adc_clk_cfg = entry.adc_clk_cfg as u32;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::*;

    fn defaults() -> SpurSettings {
        SpurSettings {
            rc_step: 0x27_47C9_D1F2,
            adc_clk_cfg: 0x21,
            ici_cancellation: true,
        }
    }

    #[test]
    fn test_main_clock_unity() {
        // m = 0, f = 1, r = 1, od = 0
        assert_eq!(main_clock_khz(38400, 0x0000), 38400);
        assert_eq!(main_clock_khz(19200, 0x0000), 19200);
    }

    #[test]
    fn test_main_clock_known_words() {
        assert_eq!(main_clock_khz(38400, PLL_ISDB_T_FULLSEG), 117600);
        assert_eq!(main_clock_khz(38400, PLL_ISDB_T_FULLSEG_31), 120000);
        assert_eq!(main_clock_khz(38400, PLL_ISDB_T_FULLSEG_2A), 103200);
        // F/R ratios that are not exact in 22-bit fixed point truncate by one kHz.
        assert_eq!(main_clock_khz(38400, PLL_ISDB_T_PARTIAL_1_SEG), 39999);
        assert_eq!(main_clock_khz(38400, PLL_ISDB_TMM_FULLSEG), 68799);
        assert_eq!(main_clock_khz(38400, PLL_ISDB_T_PARTIAL_1_SEG_384), 38400);
    }

    #[test]
    fn test_pll_register_fields() {
        let regs = PllRegisters::from_word(0xF08E);
        assert_eq!(regs.pll6, 0x70);
        assert_eq!(regs.post_divide(), 1);
        assert_eq!(regs.feedback_divider(), 49);
        assert_eq!(regs.reference_divider(), 2);
        assert_eq!(regs.output_shift(), 3);
        assert_eq!(regs.main_clock_khz(38400), 58800);
    }

    #[test]
    fn test_select_pll_every_entry() {
        for (name, table) in ALL_TABLES {
            for entry in table.iter().filter(|e| !e.is_sentinel()) {
                assert_eq!(
                    select_pll(entry.frequency_khz, table, 0xFFFF),
                    entry.pll,
                    "{} {}",
                    name,
                    entry.frequency_khz
                );
            }
        }
    }

    #[test]
    fn test_select_pll_out_of_range_returns_sentinel() {
        for (name, table) in ALL_TABLES {
            let sentinel = table[table.len() - 1].pll;
            let first = table[0].frequency_khz;
            let last = table[table.len() - 2].frequency_khz;
            assert_eq!(select_pll(first - 1, table, 0xFFFF), sentinel, "{}", name);
            assert_eq!(select_pll(last + 1, table, 0xFFFF), sentinel, "{}", name);
        }
    }

    #[test]
    fn test_select_pll_without_sentinel_uses_default() {
        let rows = PllTable::FullSegForPartial.entries();
        assert_eq!(select_pll(1, rows, PLL_ISDB_T_PARTIAL_1_SEG), PLL_ISDB_T_PARTIAL_1_SEG);
        assert_eq!(select_pll(473143, rows, PLL_ISDB_T_PARTIAL_1_SEG), PLL_ISDB_T_FULLSEG_2C);
    }

    #[test]
    fn test_partial_zero_if_past_scanned_rows_uses_partial_clock() {
        let mut partial = TuneRequest::new(Segment::Partial1Seg);
        partial.rf_if = RfIfType::ZeroIf;
        // these have full-seg rows, but beyond the rows scanned for partial reception
        for frequency in [599143, 653143, 803143] {
            assert_eq!(
                auto_pll(&partial, frequency),
                PLL_ISDB_T_PARTIAL_1_SEG,
                "{}",
                frequency
            );
        }
        assert_eq!(auto_pll(&partial, 210429), PLL_ISDB_TMM_FULLSEG);
    }

    #[test]
    fn test_auto_pll_tables() {
        let full = TuneRequest::new(Segment::FullSeg);
        assert_eq!(auto_pll(&full, 473143), PLL_ISDB_T_FULLSEG_2C);
        assert_eq!(auto_pll(&full, 1), PLL_ISDB_T_FULLSEG_2E);

        let mut partial = TuneRequest::new(Segment::Partial1Seg);
        partial.rf_if = RfIfType::LowIf;
        assert_eq!(auto_pll(&partial, 479143), PLL_ISDB_T_PARTIAL_1_SEG_464);
        partial.rf_if = RfIfType::ZeroIf;
        assert_eq!(auto_pll(&partial, 1), PLL_ISDB_T_PARTIAL_1_SEG);
        assert_eq!(auto_pll(&partial, 593143), PLL_ISDB_T_FULLSEG_2B);

        let tsb = TuneRequest::new(Segment::Tsb3Seg);
        assert_eq!(auto_pll(&tsb, 473143), PLL_ISDB_TSB);

        let tmm = TuneRequest::new(Segment::Tmm(TmmSlot::B6th1Seg));
        assert_eq!(auto_pll(&tmm, 215571), PLL_ISDB_TMM_PARTIAL_1_SEG_456);
        let tmm13 = TuneRequest::new(Segment::Tmm(TmmSlot::A1st13Seg));
        assert_eq!(PllTable::for_request(&tmm13), Some(PllTable::Tmm13Seg));
        let user = TuneRequest::new(Segment::Tmm(TmmSlot::UserDefine1Seg));
        assert_eq!(PllTable::for_request(&user), Some(PllTable::TmmUser1Seg));
    }

    #[test]
    fn test_spur_suppression_match() {
        let mut settings = defaults();
        assert!(apply_spur_suppression(&Segment::FullSeg, 473143, 38400, &mut settings));
        assert_eq!(settings.rc_step, 0x18_D51B_8A9C);
        assert_eq!(settings.adc_clk_cfg, 0x03);
        assert!(settings.ici_cancellation);
    }

    #[test]
    fn test_spur_suppression_needs_38400_crystal() {
        let mut settings = defaults();
        assert!(!apply_spur_suppression(&Segment::FullSeg, 473143, 19200, &mut settings));
        assert_eq!(settings, defaults());
    }

    #[test]
    fn test_spur_suppression_no_match() {
        let mut settings = defaults();
        assert!(!apply_spur_suppression(&Segment::FullSeg, 470000, 38400, &mut settings));
        assert_eq!(settings, defaults());
        assert!(!apply_spur_suppression(&Segment::Tsb1Seg, 473143, 38400, &mut settings));
    }

    #[test]
    fn test_spur_suppression_tmm_fullseg_disables_icic() {
        let mut settings = defaults();
        apply_spur_suppression(&Segment::FullSeg, 213429, 19200, &mut settings);
        assert!(!settings.ici_cancellation);
    }

    #[test]
    fn test_stream_clock() {
        assert_eq!(stream_clock_khz(117600, 0), 58800);
        assert_eq!(stream_clock_khz(117600, 2), 19600);
    }
}
