//! Gateway configuration, loadable from TOML.
//!
//! Supplied once at session start; the safety core never reads or writes it.

use std::collections::HashMap;

use hkg_protocol::{Ignition, ModeKind};
use hkg_safety::BusId;
use serde::Deserialize;

/// Top-level configuration for the gateway host.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Safety mode entered at start.
    #[serde(default)]
    pub mode: ModeKind,
    /// Opaque parameter passed to the mode's init hook.
    #[serde(default)]
    pub param: i16,
    /// candump log to replay instead of a live bus. None runs an idle mock bus.
    #[serde(default)]
    pub replay_log: Option<String>,
    /// Fixed ignition reading. None defers to GPIO (reported as unknown).
    #[serde(default)]
    pub ignition: Option<Ignition>,
    /// Status heartbeat interval in seconds.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
    /// Receive timeout per poll, in milliseconds.
    #[serde(default = "default_recv_timeout")]
    pub recv_timeout_ms: u64,
    /// Interface name to bus mapping.
    #[serde(default)]
    pub channels: ChannelMap,
}

/// Maps interface names in logs or on the host to gateway bus indices.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelMap {
    /// Interfaces whose frames were received from the vehicle.
    #[serde(default = "default_rx_channels")]
    pub rx: HashMap<String, BusId>,
    /// Interfaces whose frames are transmit requests from the autopilot.
    #[serde(default)]
    pub tx: HashMap<String, BusId>,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            rx: default_rx_channels(),
            tx: HashMap::new(),
        }
    }
}

fn default_rx_channels() -> HashMap<String, BusId> {
    HashMap::from([
        ("can0".to_string(), 0),
        ("can1".to_string(), 1),
        ("can2".to_string(), 2),
    ])
}

fn default_status_interval() -> u64 {
    5
}

fn default_recv_timeout() -> u64 {
    100
}

impl GatewayConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
