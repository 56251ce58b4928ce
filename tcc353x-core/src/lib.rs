//! Control core for TCC353x ISDB-T/Tmm/Tsb demodulators.
//!
//! The core sits between a byte-level bus transport and the chip firmware.
//! A [`Registry`] attaches modules of one to four ganged chips, downloads
//! their firmware, programs PLL and baseband for a channel and drives the
//! transport-stream output.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tcc353x::sim::{SimPlatform, SimRf, SimulatedBus};
//! use tcc353x::{DriverConfig, Registry, TuneState};
//! use tcc353x_protocol::{BoardTopology, ContainerBuilder, Segment, TuneRequest};
//!
//! let registry = Registry::new(
//!     Arc::new(SimulatedBus::new(2)),
//!     Arc::new(SimPlatform::new()),
//!     Arc::new(SimRf::default()),
//!     DriverConfig::default(),
//! );
//! registry
//!     .attach(0, &SimulatedBus::slot_options(BoardTopology::TwoDiversity))
//!     .unwrap();
//!
//! let image = ContainerBuilder::new().code(&[0xA5; 512]).build();
//! registry.init(0, Some(&image[..])).unwrap();
//! registry
//!     .tune(0, 473143, &TuneRequest::new(Segment::FullSeg))
//!     .unwrap();
//! assert_eq!(registry.tune_state(0).unwrap(), TuneState::Streaming);
//!
//! registry.close(0).unwrap();
//! ```

mod bootstrap;
pub mod bus;
mod channel;
pub mod error;
pub mod handle;
pub mod options;
pub mod platform;
mod pll;
mod registry;
pub mod regs;
pub mod sim;
mod stream;
mod tune;

pub use bus::{BusTarget, BusTransport, RfFrontEnd};
pub use error::{result_code, BusError, DriverError};
pub use handle::{ReceiverHandle, TuneState};
pub use options::{DriverConfig, PllPolicy, ReceiverOptions, RegisterConfig};
pub use platform::{BinarySemaphore, Platform, Semaphore, StdPlatform};
pub use registry::Registry;
pub use stream::UserCommand;
