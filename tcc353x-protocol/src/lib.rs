//! Chip-level definitions for the TCC353x ISDB-T/Tmm/Tsb demodulator family.
//!
//! This crate holds everything about the chip that can be described without
//! talking to one: the coldboot firmware container, the DPLL and spur
//! suppression tables, the baseband op-config layout, the mailbox frame
//! format and the service types a tune is described with.
//!
//! # Coldboot Format
//!
//! ```text
//! +--------+--------+-----------+ +--------+--------+-----------+
//! | Tag    | Length |   Data    | | Tag    | Length |   Data    | ...
//! | u32 BE | u32 BE |           | | u32 BE | u32 BE |           |
//! +--------+--------+-----------+ +--------+--------+-----------+
//!   code (tag 1), DAGU (2), DINT (3), RAND (4), column order (5, optional)
//! ```
//!
//! # Example
//!
//! ```rust
//! use tcc353x_protocol::{ContainerBuilder, FirmwareContainer};
//! use tcc353x_protocol::{auto_pll, Segment, TuneRequest, PLL_ISDB_T_FULLSEG_2C};
//!
//! // Build and parse a coldboot image
//! let image = ContainerBuilder::new().code(&[0xA5; 32]).build();
//! let container = FirmwareContainer::parse(&image).unwrap();
//! assert!(container.code_crc_valid());
//!
//! // Pick the PLL word for a full-seg channel
//! let request = TuneRequest::new(Segment::FullSeg);
//! assert_eq!(auto_pll(&request, 473143), PLL_ISDB_T_FULLSEG_2C);
//! ```

pub mod coldboot;
pub mod error;
pub mod mailbox;
pub mod opconfig;
pub mod pll;
pub mod tables;
pub mod types;

pub use coldboot::{crc32_mpeg2, ContainerBuilder, Crc32Mpeg2, FirmwareContainer};
pub use error::{ProtocolError, ResultCode};
pub use mailbox::{command, CodeVersion, Mailbox};
pub use opconfig::{build_op_config, OpConfig, OpConfigParams, OpField, OP_CONFIG_WORDS};
pub use pll::{
    apply_spur_suppression, auto_pll, main_clock_khz, select_pll, PllRegisters, PllTable,
    SpurSettings,
};
pub use tables::{
    FrequencyTableEntry, PLL_ISDB_TMM_FULLSEG, PLL_ISDB_TSB, PLL_ISDB_T_FULLSEG,
    PLL_ISDB_T_FULLSEG_2C, PLL_ISDB_T_PARTIAL_1_SEG,
};
pub use types::{
    core_version, BasebandVariant, BoardTopology, CommandInterface, DiversityRole, LayerParameters,
    RfIfType, Segment, StreamFormat, StreamInterface, TmccInfo, TmccParameters, TmmSlot,
    TuneRequest, CHIP_ID, MAX_DIVERSITY, MAX_MODULES,
};
