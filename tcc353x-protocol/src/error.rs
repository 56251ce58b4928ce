//! Error and result-code types shared by the TCC353x driver crates.

use thiserror::Error;

/// Format errors raised while decoding firmware images and mailbox frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A coldboot segment tag did not match the tag expected at its position.
    #[error("Unexpected segment tag at offset {offset}: expected {expected}, got 0x{found:08X}")]
    UnexpectedTag {
        offset: usize,
        expected: u32,
        found: u32,
    },

    /// The buffer ended before a header or segment body was complete.
    #[error("Truncated image: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The code segment is too short to carry its CRC trailer.
    #[error("Code segment too short: {0} bytes")]
    SegmentTooShort(usize),

    /// A mailbox reply did not start with the slave-mail marker.
    #[error("Invalid mailbox header: 0x{0:08X}")]
    InvalidMailHeader(u32),

    /// A mailbox frame carries more payload words than the FIFO can hold.
    #[error("Mailbox payload too long: {0} words (max: {1})")]
    MailTooLong(usize, usize),
}

/// Result codes reported across the driver surface.
///
/// These mirror the numeric codes applications historically compare against,
/// so the discriminants are part of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    /// Operation completed.
    Success = 0,
    /// Generic failure.
    Fail = -1,
    /// Unknown command or option.
    FailUnknown = -2,
    /// The module/slot is not attached.
    FailInvalidHandle = -3,
    /// A bounded poll or mailbox exchange ran out of time.
    FailTimeout = -4,
    /// Required data was not supplied.
    FailNullAccess = -5,
}

impl From<i32> for ResultCode {
    fn from(value: i32) -> Self {
        match value {
            0 => ResultCode::Success,
            -2 => ResultCode::FailUnknown,
            -3 => ResultCode::FailInvalidHandle,
            -4 => ResultCode::FailTimeout,
            -5 => ResultCode::FailNullAccess,
            _ => ResultCode::Fail,
        }
    }
}

impl From<ResultCode> for i32 {
    fn from(code: ResultCode) -> Self {
        code as i32
    }
}

impl ResultCode {
    /// Check if this code indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_conversion() {
        for code in [
            ResultCode::Success,
            ResultCode::Fail,
            ResultCode::FailUnknown,
            ResultCode::FailInvalidHandle,
            ResultCode::FailTimeout,
            ResultCode::FailNullAccess,
        ] {
            assert_eq!(ResultCode::from(i32::from(code)), code);
        }
        assert_eq!(ResultCode::from(-99), ResultCode::Fail);
        assert!(ResultCode::Success.is_success());
        assert!(!ResultCode::FailTimeout.is_success());
    }
}
