//! Narrow interfaces to the collaborators the core drives: the byte-level
//! bus transport and the RF front end.

use tcc353x_protocol::{CommandInterface, TuneRequest};

use crate::error::{BusError, DriverError};

/// Addressing of one chip on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusTarget {
    pub module: usize,
    pub slot: usize,
    pub interface: CommandInterface,
    /// Wire address, already shifted for the interface.
    pub address: u8,
}

impl BusTarget {
    /// True when addressing every ganged chip at once.
    pub fn is_broadcast(&self) -> bool {
        self.address == self.interface.broadcast_address()
    }
}

/// Register-level bus access (I2C or TCC-SPI).
///
/// Multi-byte writes to a plain register land in consecutive registers;
/// writes to FIFO/window registers stream into that window.
pub trait BusTransport: Send + Sync {
    fn write(&self, target: &BusTarget, register: u8, data: &[u8]) -> Result<(), BusError>;
    fn read(&self, target: &BusTarget, register: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

/// RF tuner attached to the demodulator.
pub trait RfFrontEnd: Send + Sync {
    fn init(&self, module: usize, slot: usize) -> Result<(), DriverError>;

    fn tune(
        &self,
        module: usize,
        slot: usize,
        frequency_khz: i32,
        bandwidth_khz: u32,
        osc_khz: u32,
        request: &TuneRequest,
    ) -> Result<(), DriverError>;
}
