//! Safety core of the HKG CAN gateway.
//!
//! Every hook here is synchronous, allocation-free and total: each call
//! returns a decision for every input, including malformed frames.
//! All mutable state lives in one [`SafetyState`] owned by the caller and
//! passed by `&mut` into the hooks of the active [`SafetyMode`].

pub mod checksum;
pub mod error;
pub mod frame;
pub mod ignition;
pub mod mode;
pub mod rewriter;
pub mod routing;
pub mod session;
pub mod state;
pub mod takeover;

// Re-export key types for convenience
pub use checksum::ChecksumDetector;
pub use error::{SafetyError, SafetyResult};
pub use frame::{BusId, CAMERA_BUS, Frame, MDPS_BUS, VEHICLE_BUS};
pub use hkg_protocol::{ChecksumAlgorithm, Ignition, ModeKind};
pub use ignition::{GpioDeferred, IgnitionSampler};
pub use mode::{ForwardOutcome, SafetyMode};
pub use routing::RoutingDecision;
pub use session::SafetySession;
pub use state::SafetyState;
pub use takeover::{GuardedAddress, TakeoverBank, TakeoverCounter};
