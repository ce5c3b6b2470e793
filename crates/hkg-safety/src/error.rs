//! Errors raised when building core types outside the hook path.

use thiserror::Error;

/// Errors that can occur while constructing frames for the safety core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafetyError {
    #[error("payload of {len} bytes exceeds the 8-byte CAN limit")]
    PayloadTooLong { len: usize },

    #[error("DLC {dlc} exceeds the 8-byte CAN limit")]
    InvalidDlc { dlc: u8 },
}

/// Convenience alias for safety core results.
pub type SafetyResult<T> = Result<T, SafetyError>;
