//! Baseband operation configuration ("op-config") block.
//!
//! The demodulator takes a 16-word register image describing the service
//! it should lock to. Every sub-field is listed once in [`OpField::layout`];
//! packing and field reads both go through that table.

use crate::pll::{apply_spur_suppression, SpurSettings};
use crate::types::{
    BasebandVariant, BoardTopology, DiversityRole, RfIfType, Segment, StreamInterface,
};

/// Number of words in the block.
pub const OP_CONFIG_WORDS: usize = 16;

/// Index of the word carrying the frequency form; rewritten on every tune.
pub const FREQUENCY_WORD: usize = 6;

/// Default 40-bit RC step before spur suppression.
pub const DEFAULT_RC_STEP: u64 = 0x27_47C9_D1F2;

/// Named op-config sub-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpField {
    // word 0
    LayerSelect,
    AutoSearchEnable,
    IciCancellation,
    TdfSelect,
    OneSegUse,
    DiversityConfig,
    AutoHold,
    GuardMode,
    TransmissionMode,
    CtOm,
    StartSubChannel,
    SegmentType,
    Start,
    // word 1
    LayerConfig,
    // word 2
    DiversityCount,
    AgcTrackingSpeed,
    SemiRf,
    CfoErrorRange,
    AdcClock,
    FpClock,
    DivClock,
    // word 3
    FpGlobal,
    AdcGlobal,
    // word 4
    DcConfig,
    // word 5
    OutputMode,
    ManualEnable,
    TmccSegments,
    CfoSegments,
    // word 6
    RcStepHigh,
    FrequencyForm,
    // word 7
    RcStepLow,
    // word 8
    AfcStep,
    // words 13..=15
    Reserved13,
    Reserved14,
    VariantTrailer,
}

impl OpField {
    /// (word index, bit shift, bit width).
    pub const fn layout(self) -> (usize, u32, u32) {
        match self {
            OpField::LayerSelect => (0, 30, 2),
            OpField::AutoSearchEnable => (0, 29, 1),
            OpField::IciCancellation => (0, 28, 1),
            OpField::TdfSelect => (0, 26, 2),
            OpField::OneSegUse => (0, 25, 1),
            OpField::DiversityConfig => (0, 16, 9),
            OpField::AutoHold => (0, 15, 1),
            OpField::GuardMode => (0, 13, 2),
            OpField::TransmissionMode => (0, 11, 2),
            OpField::CtOm => (0, 9, 2),
            OpField::StartSubChannel => (0, 3, 6),
            OpField::SegmentType => (0, 1, 2),
            OpField::Start => (0, 0, 1),

            OpField::LayerConfig => (1, 0, 32),

            OpField::DiversityCount => (2, 31, 1),
            OpField::AgcTrackingSpeed => (2, 21, 3),
            OpField::SemiRf => (2, 20, 1),
            OpField::CfoErrorRange => (2, 18, 2),
            OpField::AdcClock => (2, 12, 6),
            OpField::FpClock => (2, 6, 6),
            OpField::DivClock => (2, 0, 6),

            OpField::FpGlobal => (3, 16, 16),
            OpField::AdcGlobal => (3, 0, 16),

            OpField::DcConfig => (4, 0, 32),

            OpField::OutputMode => (5, 27, 5),
            OpField::ManualEnable => (5, 26, 1),
            OpField::TmccSegments => (5, 13, 13),
            OpField::CfoSegments => (5, 0, 13),

            OpField::RcStepHigh => (6, 0, 8),
            OpField::FrequencyForm => (6, 16, 16),

            OpField::RcStepLow => (7, 0, 32),

            OpField::AfcStep => (8, 0, 32),

            OpField::Reserved13 => (13, 0, 32),
            OpField::Reserved14 => (14, 0, 32),
            OpField::VariantTrailer => (15, 0, 32),
        }
    }

    fn mask(self) -> u32 {
        let (_, _, width) = self.layout();
        if width == 32 {
            u32::MAX
        } else {
            (1u32 << width) - 1
        }
    }
}

/// A packed op-config image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpConfig {
    words: [u32; OP_CONFIG_WORDS],
}

impl OpConfig {
    pub fn from_words(words: [u32; OP_CONFIG_WORDS]) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[u32; OP_CONFIG_WORDS] {
        &self.words
    }

    pub fn get(&self, field: OpField) -> u32 {
        let (word, shift, _) = field.layout();
        (self.words[word] >> shift) & field.mask()
    }

    /// Store `value` into `field`, truncated to the field width.
    pub fn set(&mut self, field: OpField, value: u32) {
        let (word, shift, _) = field.layout();
        let mask = field.mask();
        self.words[word] = (self.words[word] & !(mask << shift)) | ((value & mask) << shift);
    }

    fn with(mut self, field: OpField, value: u32) -> Self {
        self.set(field, value);
        self
    }

    /// Indices of the words that must be rewritten to turn `previous` into `self`.
    ///
    /// The frequency word is always included.
    pub fn changed_words(&self, previous: &OpConfig) -> Vec<usize> {
        (0..OP_CONFIG_WORDS)
            .filter(|&i| i == FREQUENCY_WORD || self.words[i] != previous.words[i])
            .collect()
    }
}

/// Inputs to [`build_op_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpConfigParams {
    pub segment: Segment,
    pub rf_if: RfIfType,
    /// Tuned frequency in kHz after any ISDB-Tmm shift.
    pub frequency_khz: u32,
    pub diversity_count: usize,
    pub topology: BoardTopology,
    pub role: DiversityRole,
    pub stream_interface: StreamInterface,
    pub baseband: BasebandVariant,
    pub osc_khz: u32,
}

struct SegmentProfile {
    segment_type: u32,
    start_sub_channel: u32,
    ici_cancellation: bool,
    one_seg_use: u32,
}

fn segment_profile(segment: &Segment) -> SegmentProfile {
    let (segment_type, start_sub_channel, ici_cancellation, one_seg_use) = match segment {
        Segment::Partial1Seg => (0, 21, false, 1),
        Segment::FullSeg => (2, 3, true, 0),
        Segment::Tsb1Seg => (0, 3, false, 0),
        Segment::Tsb3Seg => (1, 3, false, 0),
        Segment::Tsb1Of3Seg => (0, 21, false, 0),
        Segment::Tmm(slot) => match slot.start_sub_channel() {
            Some(start) => (0, start, false, 1),
            None => (2, 3, false, 0),
        },
    };
    SegmentProfile {
        segment_type,
        start_sub_channel,
        ici_cancellation,
        one_seg_use,
    }
}

/// Build the op-config block for one diversity slot.
pub fn build_op_config(params: &OpConfigParams) -> OpConfig {
    let profile = segment_profile(&params.segment);
    let s_type = profile.segment_type;

    let div_cfg = if params.topology == BoardTopology::Single {
        0
    } else {
        params.role.div_cfg()
    };

    let output_mode = match (params.stream_interface, s_type, params.segment) {
        (StreamInterface::MainIo, 2, Segment::FullSeg | Segment::Tmm(_)) => 0x1C,
        _ => 0,
    };

    let (fp_global, adc_global, afc_step) = match params.rf_if {
        RfIfType::LowIf => (0x00C9, 0x00E1, 0x0304_0001),
        RfIfType::ZeroIf => (0x0309, 0x00E2, 0),
    };

    let (adc_clock, tmcc_segments, cfo_segments, tdf_select) = match s_type {
        0 => (0x28, 0x01, 0x01, 1),
        1 => (0x24, 0x07, 0x05, 2),
        _ => (0x21, 0x1803, 0x404, 2),
    };

    let mut spur = SpurSettings {
        rc_step: DEFAULT_RC_STEP,
        adc_clk_cfg: adc_clock,
        ici_cancellation: profile.ici_cancellation,
    };
    apply_spur_suppression(&params.segment, params.frequency_khz, params.osc_khz, &mut spur);

    let trailer = match params.baseband {
        BasebandVariant::Tcc3531 => 0x03BE_FF43,
        BasebandVariant::Tcc3530 if s_type == 2 => 0x03BE_FF42,
        BasebandVariant::Tcc3530 => 0x03BE_FF43,
        BasebandVariant::Other => 0x03BE_FF23,
    };

    OpConfig::default()
        .with(OpField::LayerSelect, 0)
        .with(OpField::AutoSearchEnable, 1)
        .with(OpField::IciCancellation, spur.ici_cancellation as u32)
        .with(OpField::TdfSelect, tdf_select)
        .with(OpField::OneSegUse, profile.one_seg_use)
        .with(OpField::DiversityConfig, div_cfg)
        .with(OpField::AutoHold, 1)
        .with(OpField::GuardMode, 0)
        .with(OpField::TransmissionMode, 0)
        .with(OpField::CtOm, 1)
        .with(OpField::StartSubChannel, profile.start_sub_channel)
        .with(OpField::SegmentType, s_type)
        .with(OpField::Start, 1)
        // layer A only, TS resync enabled
        .with(OpField::LayerConfig, 0x3682_85E5)
        .with(OpField::DiversityCount, (params.diversity_count > 2) as u32)
        .with(OpField::AgcTrackingSpeed, 3)
        .with(OpField::SemiRf, 0)
        .with(OpField::CfoErrorRange, 3)
        .with(OpField::AdcClock, spur.adc_clk_cfg)
        .with(OpField::FpClock, 0x02)
        .with(OpField::DivClock, 0x02)
        .with(OpField::FpGlobal, fp_global)
        .with(OpField::AdcGlobal, adc_global)
        .with(OpField::DcConfig, 0x0001_969A)
        .with(OpField::OutputMode, output_mode)
        .with(OpField::ManualEnable, 0)
        .with(OpField::TmccSegments, tmcc_segments)
        .with(OpField::CfoSegments, cfo_segments)
        .with(OpField::RcStepHigh, ((spur.rc_step >> 32) & 0xFF) as u32)
        .with(OpField::FrequencyForm, (params.frequency_khz >> 4) & 0xFFFF)
        .with(OpField::RcStepLow, (spur.rc_step & 0xFFFF_FFFF) as u32)
        .with(OpField::AfcStep, afc_step)
        .with(OpField::Reserved13, 0xC2A8_FF09)
        .with(OpField::Reserved14, 0x01BE_FF16)
        .with(OpField::VariantTrailer, trailer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TmmSlot;

    fn params(segment: Segment) -> OpConfigParams {
        OpConfigParams {
            segment,
            rf_if: RfIfType::ZeroIf,
            frequency_khz: 473143,
            diversity_count: 1,
            topology: BoardTopology::Single,
            role: DiversityRole::Master,
            stream_interface: StreamInterface::Spi,
            baseband: BasebandVariant::Tcc3530,
            osc_khz: 38400,
        }
    }

    #[test]
    fn test_field_layout_does_not_overlap() {
        use OpField::*;
        let fields = [
            LayerSelect, AutoSearchEnable, IciCancellation, TdfSelect, OneSegUse,
            DiversityConfig, AutoHold, GuardMode, TransmissionMode, CtOm, StartSubChannel,
            SegmentType, Start, LayerConfig, DiversityCount, AgcTrackingSpeed, SemiRf,
            CfoErrorRange, AdcClock, FpClock, DivClock, FpGlobal, AdcGlobal, DcConfig,
            OutputMode, ManualEnable, TmccSegments, CfoSegments, RcStepHigh, FrequencyForm,
            RcStepLow, AfcStep, Reserved13, Reserved14, VariantTrailer,
        ];
        let mut used = [0u64; OP_CONFIG_WORDS];
        for field in fields {
            let (word, shift, width) = field.layout();
            assert!(shift + width <= 32, "{:?}", field);
            let bits = (((1u64 << width) - 1) << shift) as u64;
            assert_eq!(used[word] & bits, 0, "{:?}", field);
            used[word] |= bits;
        }
    }

    #[test]
    fn test_set_truncates_to_width() {
        let mut config = OpConfig::default();
        config.set(OpField::SegmentType, 0x7);
        assert_eq!(config.get(OpField::SegmentType), 0x3);
        assert_eq!(config.words()[0], 0x6);
    }

    #[test]
    fn test_fullseg_words() {
        let config = build_op_config(&params(Segment::FullSeg));
        let w = config.words();

        assert_eq!(config.get(OpField::SegmentType), 2);
        assert_eq!(config.get(OpField::StartSubChannel), 3);
        assert_eq!(config.get(OpField::IciCancellation), 1);
        assert_eq!(config.get(OpField::TdfSelect), 2);
        assert_eq!(config.get(OpField::DiversityConfig), 0);
        assert_eq!(
            w[0],
            (1 << 29) | (1 << 28) | (2 << 26) | (1 << 15) | (1 << 9) | (3 << 3) | (2 << 1) | 1
        );
        assert_eq!(w[1], 0x3682_85E5);
        // 473143 kHz carries a spur row: ADC clock 0x03, RC step 0x18_D51B8A9C.
        assert_eq!(w[2], (3 << 21) | (3 << 18) | (0x03 << 12) | (2 << 6) | 2);
        assert_eq!(w[3], (0x0309 << 16) | 0xE2);
        assert_eq!(w[4], 0x0001_969A);
        assert_eq!(w[5], (0x1803 << 13) | 0x404);
        assert_eq!(w[6], ((473143 >> 4) << 16) | 0x18);
        assert_eq!(w[7], 0xD51B_8A9C);
        assert_eq!(w[8], 0);
        assert_eq!(&w[9..13], &[0, 0, 0, 0]);
        assert_eq!(w[13], 0xC2A8_FF09);
        assert_eq!(w[14], 0x01BE_FF16);
        assert_eq!(w[15], 0x03BE_FF42);
    }

    #[test]
    fn test_default_rc_step_without_spur_row() {
        let mut p = params(Segment::FullSeg);
        p.frequency_khz = 470000;
        let config = build_op_config(&p);
        assert_eq!(config.get(OpField::RcStepHigh), 0x27);
        assert_eq!(config.get(OpField::RcStepLow), 0x47C9_D1F2);
        assert_eq!(config.get(OpField::AdcClock), 0x21);
    }

    #[test]
    fn test_partial_low_if() {
        let mut p = params(Segment::Partial1Seg);
        p.rf_if = RfIfType::LowIf;
        p.osc_khz = 19200;
        let config = build_op_config(&p);
        assert_eq!(config.get(OpField::SegmentType), 0);
        assert_eq!(config.get(OpField::StartSubChannel), 21);
        assert_eq!(config.get(OpField::OneSegUse), 1);
        assert_eq!(config.get(OpField::TdfSelect), 1);
        assert_eq!(config.get(OpField::AdcClock), 0x28);
        assert_eq!(config.get(OpField::FpGlobal), 0x00C9);
        assert_eq!(config.get(OpField::AdcGlobal), 0x00E1);
        assert_eq!(config.get(OpField::AfcStep), 0x0304_0001);
        assert_eq!(config.get(OpField::TmccSegments), 1);
        assert_eq!(config.get(OpField::CfoSegments), 1);
        assert_eq!(config.get(OpField::VariantTrailer), 0x03BE_FF43);
    }

    #[test]
    fn test_tsb_three_segment() {
        let config = build_op_config(&params(Segment::Tsb3Seg));
        assert_eq!(config.get(OpField::SegmentType), 1);
        assert_eq!(config.get(OpField::AdcClock), 0x24);
        assert_eq!(config.get(OpField::TmccSegments), 0x07);
        assert_eq!(config.get(OpField::CfoSegments), 0x05);
        assert_eq!(config.get(OpField::IciCancellation), 0);
    }

    #[test]
    fn test_tmm_slots() {
        let one = build_op_config(&params(Segment::Tmm(TmmSlot::C3rd1Seg)));
        assert_eq!(one.get(OpField::SegmentType), 0);
        assert_eq!(one.get(OpField::StartSubChannel), 6);
        assert_eq!(one.get(OpField::OneSegUse), 1);

        let thirteen = build_op_config(&params(Segment::Tmm(TmmSlot::B2nd13Seg)));
        assert_eq!(thirteen.get(OpField::SegmentType), 2);
        assert_eq!(thirteen.get(OpField::StartSubChannel), 3);
        assert_eq!(thirteen.get(OpField::OneSegUse), 0);
        assert_eq!(thirteen.get(OpField::IciCancellation), 0);
    }

    #[test]
    fn test_main_io_output_mode() {
        let mut p = params(Segment::FullSeg);
        p.stream_interface = StreamInterface::MainIo;
        assert_eq!(build_op_config(&p).get(OpField::OutputMode), 0x1C);

        p.segment = Segment::Tsb3Seg;
        assert_eq!(build_op_config(&p).get(OpField::OutputMode), 0);

        p.segment = Segment::FullSeg;
        p.stream_interface = StreamInterface::Ts;
        assert_eq!(build_op_config(&p).get(OpField::OutputMode), 0);
    }

    #[test]
    fn test_diversity_roles() {
        let mut p = params(Segment::FullSeg);
        p.topology = BoardTopology::FourDiversity;
        p.diversity_count = 4;
        p.role = DiversityRole::Mid;
        let config = build_op_config(&p);
        assert_eq!(config.get(OpField::DiversityConfig), 0x11F);
        assert_eq!(config.get(OpField::DiversityCount), 1);

        p.topology = BoardTopology::TwoDiversity;
        p.diversity_count = 2;
        p.role = DiversityRole::Slave;
        let config = build_op_config(&p);
        assert_eq!(config.get(OpField::DiversityConfig), 0x13D);
        assert_eq!(config.get(OpField::DiversityCount), 0);
    }

    #[test]
    fn test_baseband_trailers() {
        let mut p = params(Segment::Partial1Seg);
        p.baseband = BasebandVariant::Tcc3531;
        assert_eq!(build_op_config(&p).get(OpField::VariantTrailer), 0x03BE_FF43);
        p.baseband = BasebandVariant::Other;
        assert_eq!(build_op_config(&p).get(OpField::VariantTrailer), 0x03BE_FF23);
    }

    #[test]
    fn test_changed_words() {
        let first = build_op_config(&params(Segment::FullSeg));
        assert_eq!(first.changed_words(&first), vec![FREQUENCY_WORD]);

        let mut p = params(Segment::FullSeg);
        p.frequency_khz = 479143;
        let second = build_op_config(&p);
        let changed = second.changed_words(&first);
        assert!(changed.contains(&FREQUENCY_WORD));
        assert!(!changed.contains(&0));
        assert!(!changed.contains(&15));
    }
}
