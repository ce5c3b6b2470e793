//! Gateway host error types.

use hkg_safety::SafetyError;
use thiserror::Error;

/// Errors that can occur in the host harness around the safety core.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("CAN interface error: {0}")]
    Interface(String),

    #[error("Receive timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Bus stream ended")]
    EndOfStream,

    #[error("candump line {line_number}: {reason}")]
    Parse { line_number: usize, reason: String },

    #[error("Status publish error: {0}")]
    Status(String),

    #[error(transparent)]
    Frame(#[from] SafetyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias for gateway host results.
pub type GatewayResult<T> = Result<T, GatewayError>;
