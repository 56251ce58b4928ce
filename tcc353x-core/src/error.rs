//! Error types for the TCC353x control core.

use tcc353x_protocol::{ProtocolError, ResultCode};
use thiserror::Error;

/// Errors reported by a bus transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No device acknowledged the address.
    #[error("No acknowledge from address 0x{0:02X}")]
    Nack(u8),

    /// Transfer failed in the controller.
    #[error("Bus transfer failed: {0}")]
    Transfer(String),
}

/// Errors returned by driver operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Module index outside the registry.
    #[error("Invalid module index {0}")]
    InvalidModule(usize),

    /// Slot index outside the module's diversity count.
    #[error("Invalid slot {slot} for module {module}")]
    InvalidSlot { module: usize, slot: usize },

    /// The module has no attached session.
    #[error("Module {0} is not attached")]
    NotAttached(usize),

    /// The module already has an attached session.
    #[error("Module {0} is already attached")]
    AlreadyAttached(usize),

    /// Per-slot options are inconsistent with the board topology.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Transport-level failure.
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Firmware container or mailbox frame was malformed.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The chip did not identify as a TCC353x.
    #[error("Unexpected chip id 0x{found:02X} (expected 0x{expected:02X})")]
    ChipIdMismatch { expected: u8, found: u8 },

    /// Downloaded code failed the hardware CRC on one or more slots.
    #[error("Firmware CRC mismatch on slots {0:?}")]
    CrcMismatch(Vec<usize>),

    /// The firmware did not answer a mailbox command in time.
    #[error("Mailbox timeout on command 0x{0:04X}")]
    MailboxTimeout(u16),

    /// The mailbox FIFO never reported ready for a new command.
    #[error("Mailbox not ready for access")]
    MailboxBusy,

    /// The firmware answered with a non-zero status.
    #[error("Mailbox command 0x{command:04X} failed with status {status}")]
    MailboxStatus { command: u16, status: u8 },

    /// The frequency became non-positive after the time-slot shift.
    #[error("Invalid frequency {0} kHz")]
    InvalidFrequency(i32),

    /// The RF front end rejected a call.
    #[error("RF front end error: {0}")]
    RfFrontEnd(String),

    /// The operation is not supported by this core.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Unknown user command.
    #[error("Unknown command {0}")]
    UnknownCommand(u32),
}

impl DriverError {
    /// Result code reported for this error across the application surface.
    pub fn code(&self) -> ResultCode {
        match self {
            DriverError::InvalidModule(_)
            | DriverError::InvalidSlot { .. }
            | DriverError::NotAttached(_) => ResultCode::FailInvalidHandle,
            DriverError::MailboxTimeout(_) | DriverError::MailboxBusy => ResultCode::FailTimeout,
            DriverError::UnknownCommand(_) => ResultCode::FailUnknown,
            _ => ResultCode::Fail,
        }
    }
}

/// Result code for an operation outcome.
pub fn result_code<T>(result: &Result<T, DriverError>) -> ResultCode {
    match result {
        Ok(_) => ResultCode::Success,
        Err(e) => e.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DriverError::NotAttached(0).code(), ResultCode::FailInvalidHandle);
        assert_eq!(DriverError::MailboxTimeout(1).code(), ResultCode::FailTimeout);
        assert_eq!(DriverError::UnknownCommand(9).code(), ResultCode::FailUnknown);
        assert_eq!(DriverError::CrcMismatch(vec![1]).code(), ResultCode::Fail);
        assert_eq!(result_code::<()>(&Ok(())), ResultCode::Success);
    }

    #[test]
    fn test_from_bus_error() {
        let err: DriverError = BusError::Nack(0xA8).into();
        assert_eq!(err.to_string(), "Bus error: No acknowledge from address 0xA8");
    }
}
