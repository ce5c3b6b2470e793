//! Bus interface abstraction between the dispatch loop and the transceiver
//! driver.
//!
//! `CanInterface` trait with `send_frame`/`recv_event`. Two impls:
//! - `MockCanInterface`: scripted events and frame recording (in `mock.rs`)
//! - `ReplayCanInterface`: candump log playback (in `replay.rs`)

use async_trait::async_trait;
use std::time::Duration;

use hkg_safety::Frame;

use crate::error::GatewayResult;

/// One event delivered by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// A frame received from a vehicle bus.
    Received(Frame),
    /// A frame the autopilot asks the gateway to transmit.
    TransmitRequest(Frame),
}

/// Trait for bus interface implementations.
#[async_trait]
pub trait CanInterface: Send + Sync {
    /// Emit a frame on `frame.bus()`.
    async fn send_frame(&self, frame: &Frame) -> GatewayResult<()>;

    /// Receive the next event, blocking up to `timeout`.
    ///
    /// Returns `GatewayError::Timeout` when nothing arrived and
    /// `GatewayError::EndOfStream` when the source is exhausted for good.
    async fn recv_event(&self, timeout: Duration) -> GatewayResult<BusEvent>;
}
