//! HKG gateway host harness.
//!
//! Feeds frames from a [`CanInterface`] through a single
//! [`hkg_safety::SafetySession`], emits the forwarding decisions back to the
//! interface, and publishes periodic status heartbeats.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod interface;
pub mod mock;
pub mod replay;
pub mod status;

// Re-export key types for convenience
pub use config::GatewayConfig;
pub use dispatch::Dispatcher;
pub use error::{GatewayError, GatewayResult};
pub use interface::{BusEvent, CanInterface};
pub use mock::MockCanInterface;
pub use replay::ReplayCanInterface;
pub use status::{LogStatusSink, MockStatusSink, StatusSink};
