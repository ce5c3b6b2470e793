//! HKG gateway host: runs the safety core against a replayed or idle bus.
//!
//! Loads the session config, builds one safety session, and dispatches bus
//! events through it until the stream ends or a shutdown signal arrives.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use hkg_gateway::config::GatewayConfig;
use hkg_gateway::{CanInterface, Dispatcher, LogStatusSink, MockCanInterface, ReplayCanInterface};
use hkg_safety::{GpioDeferred, IgnitionSampler, SafetyMode, SafetySession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hkg-gateway starting");

    // ── Load config ─────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/hkg-gateway/gateway.toml".to_string());

    let config = GatewayConfig::from_file(&config_path)?;
    tracing::info!(mode = %config.mode, param = config.param, "config loaded");

    // ── Bus interface ───────────────────────────────────────────
    let iface: Box<dyn CanInterface> = match &config.replay_log {
        Some(path) => {
            let replay = ReplayCanInterface::from_file(path, &config.channels)?;
            tracing::info!(path = %path, events = replay.remaining(), "replaying candump log");
            Box::new(replay)
        }
        None => {
            tracing::info!("no replay log configured, running against an idle mock bus");
            Box::new(MockCanInterface::new())
        }
    };

    // ── Ignition ────────────────────────────────────────────────
    let sampler: Box<dyn IgnitionSampler + Sync> = match config.ignition {
        Some(reading) => Box::new(reading),
        None => Box::new(GpioDeferred),
    };

    // ── Safety session ──────────────────────────────────────────
    let session = SafetySession::new(SafetyMode::from(config.mode), config.param);
    let mut dispatcher = Dispatcher::new(session);
    tracing::info!(session_id = %dispatcher.session_id(), "hkg-gateway ready");

    tokio::select! {
        result = dispatcher.run(
            iface.as_ref(),
            &LogStatusSink,
            sampler.as_ref(),
            Duration::from_millis(config.recv_timeout_ms),
            Duration::from_secs(config.status_interval_secs),
        ) => {
            let stats = result?;
            tracing::info!(received = stats.received, forwarded = stats.forwarded, "dispatch finished");
        }
        // Graceful shutdown on SIGINT/SIGTERM
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    tracing::info!("hkg-gateway stopped");
    Ok(())
}
