//! Ignition sampling seam. The safety modes only pass the reading through.

use hkg_protocol::Ignition;

/// Source of the ignition line state, backed by GPIO on the real board.
pub trait IgnitionSampler {
    fn sample(&self) -> Ignition;
}

/// Always answers `Unknown`, telling the board to read its GPIO line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpioDeferred;

impl IgnitionSampler for GpioDeferred {
    fn sample(&self) -> Ignition {
        Ignition::Unknown
    }
}

/// Fixed reading, for host builds and tests.
impl IgnitionSampler for Ignition {
    fn sample(&self) -> Ignition {
        *self
    }
}
