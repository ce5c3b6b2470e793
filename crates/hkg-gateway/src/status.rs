//! Status heartbeat publishing.
//!
//! The dispatch loop builds a `Heartbeat` at a configurable interval so the
//! diagnostics UI can show the session's safety state.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use hkg_protocol::{FrameStats, Heartbeat, Ignition, SessionId};
use hkg_safety::SafetySession;

use crate::error::{GatewayError, GatewayResult};

/// Destination for status heartbeats.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn publish(&self, heartbeat: &Heartbeat) -> GatewayResult<()>;
}

/// Writes each heartbeat as a structured log event.
pub struct LogStatusSink;

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn publish(&self, heartbeat: &Heartbeat) -> GatewayResult<()> {
        let json = serde_json::to_string(heartbeat).map_err(|e| GatewayError::Status(e.to_string()))?;
        tracing::info!(
            session_id = %heartbeat.session_id,
            forwarding_enabled = heartbeat.status.forwarding_enabled,
            status = %json,
            "gateway status"
        );
        Ok(())
    }
}

/// Records heartbeats for test assertions.
#[derive(Default)]
pub struct MockStatusSink {
    published: Mutex<Vec<Heartbeat>>,
}

impl MockStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Heartbeat> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusSink for MockStatusSink {
    async fn publish(&self, heartbeat: &Heartbeat) -> GatewayResult<()> {
        self.published.lock().unwrap().push(heartbeat.clone());
        Ok(())
    }
}

/// Assemble a heartbeat from the current session state.
pub fn build_heartbeat(
    session_id: SessionId,
    session: &SafetySession,
    stats: FrameStats,
    ignition: Ignition,
    uptime_secs: u64,
) -> Heartbeat {
    Heartbeat {
        session_id,
        ignition,
        uptime_secs,
        gateway_version: env!("CARGO_PKG_VERSION").to_string(),
        status: session.status(stats),
        timestamp: Utc::now(),
    }
}
