//! Serialized frame dispatch.
//!
//! One `Dispatcher` owns the `SafetySession`. Each event is handled to
//! completion before the next is read, so the safety hooks always run with
//! exclusive access to the state. Awaits only happen around I/O, never
//! inside a hook.

use std::time::Duration;

use hkg_protocol::{FrameStats, SessionId};
use hkg_safety::{ForwardOutcome, Frame, IgnitionSampler, SafetySession};
use tokio::time::Instant;

use crate::error::{GatewayError, GatewayResult};
use crate::interface::{BusEvent, CanInterface};
use crate::status::{self, StatusSink};

/// Drives one safety session from a bus interface.
pub struct Dispatcher {
    session_id: SessionId,
    session: SafetySession,
    stats: FrameStats,
}

impl Dispatcher {
    pub fn new(session: SafetySession) -> Self {
        Self {
            session_id: SessionId::new(),
            session,
            stats: FrameStats::default(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn session(&self) -> &SafetySession {
        &self.session
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Observe a received frame, then emit it wherever the forward hook says.
    pub async fn handle_rx(&mut self, iface: &dyn CanInterface, frame: &Frame) -> GatewayResult<ForwardOutcome> {
        self.stats.received += 1;
        self.session.rx(frame);
        let outcome = self.session.fwd(frame.bus(), frame);

        if outcome.rewritten {
            self.stats.rewritten += 1;
        }
        if outcome.decision.is_drop() {
            self.stats.dropped += 1;
            tracing::trace!(%frame, "dropped");
            return Ok(outcome);
        }
        self.stats.forwarded += 1;
        // Try every destination, report the first failure.
        let mut first_err = None;
        for bus in outcome.decision.destinations() {
            if let Err(e) = iface.send_frame(&outcome.frame.on_bus(bus)).await {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(outcome),
        }
    }

    /// Check an autopilot transmit request and send it if allowed.
    pub async fn handle_tx(&mut self, iface: &dyn CanInterface, frame: &Frame) -> GatewayResult<bool> {
        let allowed = self.session.tx(frame);
        if allowed {
            self.stats.tx_allowed += 1;
            iface.send_frame(frame).await?;
        } else {
            self.stats.tx_denied += 1;
            tracing::debug!(%frame, "transmit denied");
        }
        Ok(allowed)
    }

    async fn handle_event(&mut self, iface: &dyn CanInterface, event: BusEvent) -> GatewayResult<()> {
        match event {
            BusEvent::Received(frame) => self.handle_rx(iface, &frame).await.map(|_| ()),
            BusEvent::TransmitRequest(frame) => self.handle_tx(iface, &frame).await.map(|_| ()),
        }
    }

    async fn publish_status(&self, sink: &dyn StatusSink, sampler: &(dyn IgnitionSampler + Sync), started: Instant) {
        let heartbeat = status::build_heartbeat(
            self.session_id,
            &self.session,
            self.stats,
            self.session.ignition(sampler),
            started.elapsed().as_secs(),
        );
        if let Err(e) = sink.publish(&heartbeat).await {
            tracing::warn!(error = %e, "failed to publish status");
        }
    }

    /// Run until the interface reports end of stream.
    ///
    /// Timeouts are idle polls. A failed send is logged and the loop moves on
    /// to the next frame. A status heartbeat goes out every
    /// `status_interval` and once more when the stream ends.
    pub async fn run(
        &mut self,
        iface: &dyn CanInterface,
        sink: &dyn StatusSink,
        sampler: &(dyn IgnitionSampler + Sync),
        recv_timeout: Duration,
        status_interval: Duration,
    ) -> GatewayResult<FrameStats> {
        let started = Instant::now();
        let mut last_status = started;

        loop {
            match iface.recv_event(recv_timeout).await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(iface, event).await {
                        tracing::warn!(error = %e, "failed to emit frame");
                    }
                }
                Err(GatewayError::Timeout { .. }) => {}
                Err(GatewayError::EndOfStream) => break,
                Err(e) => return Err(e),
            }

            if last_status.elapsed() >= status_interval {
                self.publish_status(sink, sampler, started).await;
                last_status = Instant::now();
            }
        }

        self.publish_status(sink, sampler, started).await;
        tracing::info!(
            received = self.stats.received,
            forwarded = self.stats.forwarded,
            dropped = self.stats.dropped,
            rewritten = self.stats.rewritten,
            "bus stream ended"
        );
        Ok(self.stats)
    }
}
