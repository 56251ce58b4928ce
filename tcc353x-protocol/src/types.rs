//! Service, board and tune-request types for the TCC353x family.

use serde::{Deserialize, Serialize};

/// Chip identifier reported by every TCC353x die.
pub const CHIP_ID: u8 = 0x33;

/// Crystal frequency the spur-suppression tables were characterised for.
pub const SPUR_TABLE_OSC_KHZ: u32 = 38400;

/// Bus address every ganged chip answers to during firmware download.
pub const BROADCAST_ADDRESS: u8 = 0xA0;

/// Maximum number of physical modules a registry manages.
pub const MAX_MODULES: usize = 2;

/// Maximum number of diversity slots per module.
pub const MAX_DIVERSITY: usize = 4;

/// RF front-end tuning bandwidth in kHz.
pub const CHANNEL_BANDWIDTH_KHZ: u32 = 6000;

/// Frequencies below this are routed to the VHF antenna path.
pub const VHF_UHF_SPLIT_KHZ: i32 = 300_000;

/// Core version (major, minor, patch).
pub const CORE_VERSION: (u8, u8, u8) = (0, 1, 43);

/// Core version packed 8.8.8.
pub const fn core_version() -> u32 {
    ((CORE_VERSION.0 as u32) << 16) | ((CORE_VERSION.1 as u32) << 8) | CORE_VERSION.2 as u32
}

/// Bus flavour used to reach the chip's command interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandInterface {
    /// Plain I2C, 8-bit address as configured.
    #[default]
    I2c,
    /// Telechips SPI framing; the wire address is the configured one shifted right by one.
    TccSpi,
    /// Anything else. Attach logs an error and keeps the configured address unshifted.
    Unsupported,
}

impl CommandInterface {
    /// Address the transport should use for a configured 8-bit address.
    pub fn wire_address(&self, configured: u8) -> u8 {
        match self {
            CommandInterface::TccSpi => configured >> 1,
            CommandInterface::I2c | CommandInterface::Unsupported => configured,
        }
    }

    /// Shared download address for ganged chips on this interface.
    pub fn broadcast_address(&self) -> u8 {
        self.wire_address(BROADCAST_ADDRESS)
    }
}

/// How many chips are ganged together on one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardTopology {
    #[default]
    Single,
    TwoDiversity,
    ThreeDiversity,
    FourDiversity,
}

impl BoardTopology {
    /// Number of diversity slots driven for this board.
    pub fn diversity_count(&self) -> usize {
        match self {
            BoardTopology::Single => 1,
            BoardTopology::TwoDiversity => 2,
            BoardTopology::ThreeDiversity => 3,
            BoardTopology::FourDiversity => 4,
        }
    }
}

/// Role of one chip inside a diversity gang.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiversityRole {
    #[default]
    Master,
    Mid,
    Slave,
}

impl DiversityRole {
    /// DIV_CFG field value for this role on a multi-chip board.
    pub fn div_cfg(&self) -> u32 {
        match self {
            DiversityRole::Master => 0x15E,
            DiversityRole::Mid => 0x11F,
            DiversityRole::Slave => 0x13D,
        }
    }
}

/// Baseband die variant, selects the trailing op-config constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BasebandVariant {
    #[default]
    Tcc3530,
    Tcc3531,
    Other,
}

/// Transport-stream output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamInterface {
    /// SPI master/slave TS output.
    #[default]
    Spi,
    /// Parallel/serial TS interface.
    Ts,
    /// Host reads the buffer over the main command interface.
    MainIo,
}

/// RF front-end IF architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RfIfType {
    LowIf,
    #[default]
    ZeroIf,
}

/// ISDB-Tmm time slot. Each slot carries a fixed offset from the nominal
/// channel centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TmmSlot {
    A1st13Seg,
    A2nd13Seg,
    A1st1Seg,
    A2nd1Seg,
    A3rd1Seg,
    A4th1Seg,
    A5th1Seg,
    A6th1Seg,
    A7th1Seg,
    B1st13Seg,
    B2nd13Seg,
    B1st1Seg,
    B2nd1Seg,
    B3rd1Seg,
    B4th1Seg,
    B5th1Seg,
    B6th1Seg,
    B7th1Seg,
    C1st13Seg,
    C2nd13Seg,
    C1st1Seg,
    C2nd1Seg,
    C3rd1Seg,
    C4th1Seg,
    C5th1Seg,
    C6th1Seg,
    C7th1Seg,
    UserDefine13Seg,
    UserDefine1Seg,
}

impl TmmSlot {
    /// Every named slot.
    pub const ALL: [TmmSlot; 29] = [
        TmmSlot::A1st13Seg,
        TmmSlot::A2nd13Seg,
        TmmSlot::A1st1Seg,
        TmmSlot::A2nd1Seg,
        TmmSlot::A3rd1Seg,
        TmmSlot::A4th1Seg,
        TmmSlot::A5th1Seg,
        TmmSlot::A6th1Seg,
        TmmSlot::A7th1Seg,
        TmmSlot::B1st13Seg,
        TmmSlot::B2nd13Seg,
        TmmSlot::B1st1Seg,
        TmmSlot::B2nd1Seg,
        TmmSlot::B3rd1Seg,
        TmmSlot::B4th1Seg,
        TmmSlot::B5th1Seg,
        TmmSlot::B6th1Seg,
        TmmSlot::B7th1Seg,
        TmmSlot::C1st13Seg,
        TmmSlot::C2nd13Seg,
        TmmSlot::C1st1Seg,
        TmmSlot::C2nd1Seg,
        TmmSlot::C3rd1Seg,
        TmmSlot::C4th1Seg,
        TmmSlot::C5th1Seg,
        TmmSlot::C6th1Seg,
        TmmSlot::C7th1Seg,
        TmmSlot::UserDefine13Seg,
        TmmSlot::UserDefine1Seg,
    ];

    /// Offset in kHz applied to the nominal frequency before table lookup.
    pub fn center_offset_khz(&self) -> i32 {
        match self {
            TmmSlot::A1st1Seg => -6857,
            TmmSlot::A2nd1Seg => -6428,
            TmmSlot::A3rd1Seg => -6000,
            TmmSlot::A4th1Seg => -5571,
            TmmSlot::A5th1Seg => -5143,
            TmmSlot::A6th1Seg => -4714,
            TmmSlot::A7th1Seg => -4285,
            TmmSlot::A1st13Seg => -1285,
            TmmSlot::A2nd13Seg => 4286,

            TmmSlot::B1st13Seg => -4285,
            TmmSlot::B1st1Seg => -1285,
            TmmSlot::B2nd1Seg => -857,
            TmmSlot::B3rd1Seg => -428,
            TmmSlot::B4th1Seg => 0,
            TmmSlot::B5th1Seg => 429,
            TmmSlot::B6th1Seg => 857,
            TmmSlot::B7th1Seg => 1286,
            TmmSlot::B2nd13Seg => 4286,

            TmmSlot::C1st13Seg => -4285,
            TmmSlot::C2nd13Seg => 1286,
            TmmSlot::C1st1Seg => 4286,
            TmmSlot::C2nd1Seg => 4715,
            TmmSlot::C3rd1Seg => 5143,
            TmmSlot::C4th1Seg => 5572,
            TmmSlot::C5th1Seg => 6000,
            TmmSlot::C6th1Seg => 6429,
            TmmSlot::C7th1Seg => 6857,

            TmmSlot::UserDefine13Seg | TmmSlot::UserDefine1Seg => 0,
        }
    }

    /// True for the 13-segment slots, including the user-defined one.
    pub fn is_thirteen_seg(&self) -> bool {
        matches!(
            self,
            TmmSlot::A1st13Seg
                | TmmSlot::A2nd13Seg
                | TmmSlot::B1st13Seg
                | TmmSlot::B2nd13Seg
                | TmmSlot::C1st13Seg
                | TmmSlot::C2nd13Seg
                | TmmSlot::UserDefine13Seg
        )
    }

    /// First OFDM sub-channel for a 1-segment slot.
    ///
    /// Named slots step by three sub-channels inside their A/B/C group;
    /// the user-defined slot sits at sub-channel 21. 13-segment slots return `None`.
    pub fn start_sub_channel(&self) -> Option<u32> {
        let position = match self {
            TmmSlot::A1st1Seg | TmmSlot::B1st1Seg | TmmSlot::C1st1Seg => 0,
            TmmSlot::A2nd1Seg | TmmSlot::B2nd1Seg | TmmSlot::C2nd1Seg => 1,
            TmmSlot::A3rd1Seg | TmmSlot::B3rd1Seg | TmmSlot::C3rd1Seg => 2,
            TmmSlot::A4th1Seg | TmmSlot::B4th1Seg | TmmSlot::C4th1Seg => 3,
            TmmSlot::A5th1Seg | TmmSlot::B5th1Seg | TmmSlot::C5th1Seg => 4,
            TmmSlot::A6th1Seg | TmmSlot::B6th1Seg | TmmSlot::C6th1Seg => 5,
            TmmSlot::A7th1Seg | TmmSlot::B7th1Seg | TmmSlot::C7th1Seg => 6,
            TmmSlot::UserDefine1Seg => return Some(21),
            _ => return None,
        };
        Some(position * 3)
    }
}

/// Service being received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    /// ISDB-T, all 13 segments.
    #[default]
    FullSeg,
    /// ISDB-T partial reception, the centre segment only.
    Partial1Seg,
    /// ISDB-Tsb single segment.
    Tsb1Seg,
    /// ISDB-Tsb three segments.
    Tsb3Seg,
    /// ISDB-Tsb partial reception of a 3-segment signal.
    Tsb1Of3Seg,
    /// ISDB-Tmm on the given time slot.
    Tmm(TmmSlot),
}

impl Segment {
    /// True for services decoded with the 13-segment (S_TYPE 2) datapath
    /// that also use the large output buffer.
    pub fn uses_large_buffer(&self) -> bool {
        match self {
            Segment::FullSeg | Segment::Tsb3Seg => true,
            Segment::Partial1Seg | Segment::Tsb1Seg | Segment::Tsb1Of3Seg => false,
            Segment::Tmm(slot) => slot.is_thirteen_seg(),
        }
    }

    /// True for the ISDB-Tsb family.
    pub fn is_tsb(&self) -> bool {
        matches!(self, Segment::Tsb1Seg | Segment::Tsb3Seg | Segment::Tsb1Of3Seg)
    }

    /// Nominal frequency after the ISDB-Tmm time-slot shift, or `None` if
    /// the shift overflows.
    pub fn shifted_frequency(&self, frequency_khz: i32) -> Option<i32> {
        match self {
            Segment::Tmm(slot) => frequency_khz.checked_add(slot.center_offset_khz()),
            _ => Some(frequency_khz),
        }
    }
}

/// Parameters of one tune call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuneRequest {
    pub segment: Segment,
    pub rf_if: RfIfType,
    /// Overrides buffer A's FIFO threshold in bytes (main-I/O output only).
    pub fifo_threshold: Option<u32>,
    /// Accepted for interface compatibility; the tune sequence is identical.
    pub fast_tune: bool,
}

impl TuneRequest {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            ..Default::default()
        }
    }
}

/// TS filter switches applied to the demodulator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamFormat {
    pub pid_filter: bool,
    pub ts_error_filter: bool,
    pub sync_byte_filter: bool,
    pub ts_error_insert: bool,
}

impl StreamFormat {
    /// Apply the switches to a filter configuration word (bits 6..=9).
    pub fn apply(&self, filter_cfg: u32) -> u32 {
        let mut value = filter_cfg & 0xFFFF_FC3F;
        if self.pid_filter {
            value |= 1 << 6;
        }
        if self.ts_error_filter {
            value |= 1 << 7;
        }
        if self.sync_byte_filter {
            value |= 1 << 8;
        }
        if self.ts_error_insert {
            value |= 1 << 9;
        }
        value
    }
}

/// Packed per-layer transmission parameters (13 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerParameters(pub u16);

impl LayerParameters {
    /// Carrier modulation code.
    pub fn modulation(&self) -> u8 {
        ((self.0 >> 10) & 0x07) as u8
    }

    /// Convolutional code rate code.
    pub fn code_rate(&self) -> u8 {
        ((self.0 >> 7) & 0x07) as u8
    }

    /// Time interleave length code.
    pub fn time_interleave(&self) -> u8 {
        ((self.0 >> 4) & 0x07) as u8
    }

    /// Number of segments in the layer (15 means unused).
    pub fn segments(&self) -> u8 {
        (self.0 & 0x0F) as u8
    }
}

/// Current or next TMCC parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TmccParameters {
    pub partial_reception: bool,
    pub layer_a: LayerParameters,
    pub layer_b: LayerParameters,
    pub layer_c: LayerParameters,
}

/// Decoded TMCC (transmission and multiplexing configuration control) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TmccInfo {
    pub system_id: u8,
    pub transmission_parameter_switch: u8,
    pub emergency_alarm: bool,
    pub current: TmccParameters,
    pub next: TmccParameters,
    pub phase_shift_correction: u8,
}

impl TmccInfo {
    /// Decode the first four words of a TMCC mailbox reply.
    pub fn from_words(w: [u32; 4]) -> Self {
        Self {
            system_id: ((w[0] >> 10) & 0x03) as u8,
            transmission_parameter_switch: ((w[0] >> 6) & 0x0F) as u8,
            emergency_alarm: (w[0] >> 5) & 0x01 != 0,
            current: TmccParameters {
                partial_reception: (w[0] >> 4) & 0x01 != 0,
                layer_a: LayerParameters((((w[1] >> 23) & 0x1FF) | ((w[0] & 0x0F) << 9)) as u16),
                layer_b: LayerParameters(((w[1] >> 10) & 0x1FFF) as u16),
                layer_c: LayerParameters((((w[2] >> 29) & 0x07) | ((w[1] & 0x3FF) << 3)) as u16),
            },
            next: TmccParameters {
                partial_reception: (w[2] >> 28) & 0x01 != 0,
                layer_a: LayerParameters(((w[2] >> 15) & 0x1FFF) as u16),
                layer_b: LayerParameters(((w[2] >> 2) & 0x1FFF) as u16),
                layer_c: LayerParameters((((w[3] >> 21) & 0x7FF) | ((w[2] & 0x03) << 11)) as u16),
            },
            phase_shift_correction: ((w[3] >> 18) & 0x07) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmm_offsets_span() {
        let min = TmmSlot::ALL.iter().map(|s| s.center_offset_khz()).min();
        let max = TmmSlot::ALL.iter().map(|s| s.center_offset_khz()).max();
        assert_eq!(min, Some(-6857));
        assert_eq!(max, Some(6857));
    }

    #[test]
    fn test_shifted_frequency() {
        assert_eq!(Segment::FullSeg.shifted_frequency(473143), Some(473143));
        let tmm = Segment::Tmm(TmmSlot::A1st1Seg);
        assert_eq!(
            tmm.shifted_frequency(5000),
            Some(5000 + TmmSlot::A1st1Seg.center_offset_khz())
        );
        assert_eq!(Segment::Tmm(TmmSlot::C7th1Seg).shifted_frequency(i32::MAX), None);
        assert_eq!(Segment::FullSeg.shifted_frequency(i32::MAX), Some(i32::MAX));
    }

    #[test]
    fn test_tmm_start_sub_channel() {
        assert_eq!(TmmSlot::A1st1Seg.start_sub_channel(), Some(0));
        assert_eq!(TmmSlot::B4th1Seg.start_sub_channel(), Some(9));
        assert_eq!(TmmSlot::C7th1Seg.start_sub_channel(), Some(18));
        assert_eq!(TmmSlot::UserDefine1Seg.start_sub_channel(), Some(21));
        assert_eq!(TmmSlot::B2nd13Seg.start_sub_channel(), None);
        assert_eq!(TmmSlot::UserDefine13Seg.start_sub_channel(), None);
    }

    #[test]
    fn test_tmm_thirteen_seg_slots() {
        let count = TmmSlot::ALL.iter().filter(|s| s.is_thirteen_seg()).count();
        assert_eq!(count, 7);
        for slot in TmmSlot::ALL {
            assert_ne!(slot.is_thirteen_seg(), slot.start_sub_channel().is_some());
        }
    }

    #[test]
    fn test_wire_address() {
        assert_eq!(CommandInterface::I2c.wire_address(0xA8), 0xA8);
        assert_eq!(CommandInterface::TccSpi.wire_address(0xA8), 0x54);
        assert_eq!(CommandInterface::Unsupported.wire_address(0xA8), 0xA8);
        assert_eq!(CommandInterface::I2c.broadcast_address(), 0xA0);
        assert_eq!(CommandInterface::TccSpi.broadcast_address(), 0x50);
    }

    #[test]
    fn test_large_buffer_segments() {
        assert!(Segment::FullSeg.uses_large_buffer());
        assert!(Segment::Tsb3Seg.uses_large_buffer());
        assert!(!Segment::Partial1Seg.uses_large_buffer());
        assert!(Segment::Tmm(TmmSlot::C2nd13Seg).uses_large_buffer());
        assert!(!Segment::Tmm(TmmSlot::C2nd1Seg).uses_large_buffer());
    }

    #[test]
    fn test_stream_format_bits() {
        let format = StreamFormat {
            pid_filter: true,
            ts_error_filter: false,
            sync_byte_filter: true,
            ts_error_insert: false,
        };
        assert_eq!(format.apply(0xFFFF_FFFF), 0xFFFF_FD7F);
        assert_eq!(StreamFormat::default().apply(0x3C0), 0);
    }

    #[test]
    fn test_tmcc_decode() {
        let w0 = (2 << 10) | (0x5 << 6) | (1 << 5) | (1 << 4) | 0x3;
        let w1 = (0x1AB << 23) | (0x0F0F << 10) | 0x155;
        let w2 = (0x6 << 29) | (1 << 28) | (0x1234 << 15) | (0x0ABC << 2) | 0x2;
        let w3 = (0x456 << 21) | (0x5 << 18);
        let info = TmccInfo::from_words([w0, w1, w2, w3]);
        assert_eq!(info.system_id, 2);
        assert_eq!(info.transmission_parameter_switch, 5);
        assert!(info.emergency_alarm);
        assert!(info.current.partial_reception);
        assert_eq!(info.current.layer_a.0, 0x1AB | (0x3 << 9));
        assert_eq!(info.current.layer_b.0, 0x0F0F);
        assert_eq!(info.current.layer_c.0, 0x6 | (0x155 << 3));
        assert!(info.next.partial_reception);
        assert_eq!(info.next.layer_a.0, 0x1234);
        assert_eq!(info.next.layer_b.0, 0x0ABC);
        assert_eq!(info.next.layer_c.0, 0x456 | (0x2 << 11));
        assert_eq!(info.phase_shift_correction, 5);
    }

    #[test]
    fn test_layer_parameters() {
        let layer = LayerParameters((0x3 << 10) | (0x2 << 7) | (0x1 << 4) | 0xC);
        assert_eq!(layer.modulation(), 3);
        assert_eq!(layer.code_rate(), 2);
        assert_eq!(layer.time_interleave(), 1);
        assert_eq!(layer.segments(), 12);
    }

    #[test]
    fn test_core_version() {
        assert_eq!(core_version(), 0x00_01_2B);
    }
}
