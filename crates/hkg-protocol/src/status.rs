use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mode::{ChecksumAlgorithm, Ignition, ModeKind};

/// Identifies one power-on session of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Frame counters kept by the host dispatch loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    pub received: u64,
    pub forwarded: u64,
    pub dropped: u64,
    pub rewritten: u64,
    pub tx_allowed: u64,
    pub tx_denied: u64,
}

/// Read-only snapshot of the safety state, consumed by the diagnostics UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub mode: ModeKind,
    pub controls_allowed: bool,
    pub forwarding_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
    pub cycle_counter: u32,
    pub stats: FrameStats,
}

/// Periodic status message published by the host harness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    pub session_id: SessionId,
    pub ignition: Ignition,
    pub uptime_secs: u64,
    pub gateway_version: String,
    pub status: GatewayStatus,
    pub timestamp: DateTime<Utc>,
}
