//! Mock bus interface for testing.
//!
//! Supports scripted event queues and frame recording. All tests use this
//! instead of real CAN hardware so the suite runs in CI on any platform.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use hkg_safety::{BusId, Frame};

use crate::error::{GatewayError, GatewayResult};
use crate::interface::{BusEvent, CanInterface};

/// Mock interface with scripted events and frame recording.
pub struct MockCanInterface {
    /// Events returned by `recv_event` (FIFO order).
    events: Mutex<VecDeque<BusEvent>>,
    /// All frames passed to `send_frame` (for test assertions).
    sent_frames: Mutex<Vec<Frame>>,
    /// Buses whose sends fail as if the controller went bus-off.
    offline_buses: Mutex<Vec<BusId>>,
    /// Report end-of-stream instead of a timeout once the queue is empty.
    finite: bool,
}

impl MockCanInterface {
    /// Create a new idle mock; an empty queue times out.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            sent_frames: Mutex::new(Vec::new()),
            offline_buses: Mutex::new(Vec::new()),
            finite: false,
        }
    }

    /// Create a mock that ends the stream after `events`.
    pub fn with_events(events: Vec<BusEvent>) -> Self {
        Self {
            events: Mutex::new(events.into()),
            sent_frames: Mutex::new(Vec::new()),
            offline_buses: Mutex::new(Vec::new()),
            finite: true,
        }
    }

    /// Queue a received frame.
    pub fn queue_rx(&self, frame: Frame) {
        self.events.lock().unwrap().push_back(BusEvent::Received(frame));
    }

    /// Queue an autopilot transmit request.
    pub fn queue_tx(&self, frame: Frame) {
        self.events
            .lock()
            .unwrap()
            .push_back(BusEvent::TransmitRequest(frame));
    }

    /// Make every later send on `bus` fail.
    pub fn set_bus_offline(&self, bus: BusId) {
        self.offline_buses.lock().unwrap().push(bus);
    }

    /// Get copies of all frames that were sent.
    pub fn sent_frames(&self) -> Vec<Frame> {
        self.sent_frames.lock().unwrap().clone()
    }

    /// Frames sent on one bus.
    pub fn sent_on(&self, bus: BusId) -> Vec<Frame> {
        self.sent_frames
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.bus() == bus)
            .copied()
            .collect()
    }

    /// Get the last sent frame, if any.
    pub fn last_sent(&self) -> Option<Frame> {
        self.sent_frames.lock().unwrap().last().copied()
    }
}

impl Default for MockCanInterface {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CanInterface for MockCanInterface {
    async fn send_frame(&self, frame: &Frame) -> GatewayResult<()> {
        if self.offline_buses.lock().unwrap().contains(&frame.bus()) {
            return Err(GatewayError::Interface(format!("bus {} is offline", frame.bus())));
        }
        self.sent_frames.lock().unwrap().push(*frame);
        Ok(())
    }

    async fn recv_event(&self, timeout: Duration) -> GatewayResult<BusEvent> {
        let next = self.events.lock().unwrap().pop_front();
        match next {
            Some(event) => Ok(event),
            None if self.finite => Err(GatewayError::EndOfStream),
            None => Err(GatewayError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
