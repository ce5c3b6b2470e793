//! A power-on session: the active mode plus its safety state.

use hkg_protocol::{FrameStats, GatewayStatus, Ignition, ModeKind};

use crate::frame::{BusId, Frame};
use crate::ignition::IgnitionSampler;
use crate::mode::{ForwardOutcome, SafetyMode};
use crate::state::SafetyState;

/// Owns the [`SafetyState`] and routes every hook call through the active
/// mode. Hosts that serialize dispatch hold exactly one of these.
#[derive(Debug, Clone)]
pub struct SafetySession {
    mode: SafetyMode,
    param: i16,
    state: SafetyState,
}

impl SafetySession {
    /// Fresh state with `mode` initialized.
    pub fn new(mode: SafetyMode, param: i16) -> Self {
        let mut state = SafetyState::new();
        mode.init(&mut state, param);
        Self { mode, param, state }
    }

    pub fn mode(&self) -> SafetyMode {
        self.mode
    }

    pub fn param(&self) -> i16 {
        self.param
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }

    /// Switch modes mid-session. Counters, calibration and the latch carry
    /// over; only the mode's own init runs.
    pub fn set_mode(&mut self, mode: SafetyMode, param: i16) {
        self.mode = mode;
        self.param = param;
        mode.init(&mut self.state, param);
    }

    pub fn rx(&mut self, frame: &Frame) {
        self.mode.rx(&mut self.state, frame);
    }

    pub fn tx(&mut self, frame: &Frame) -> bool {
        self.mode.tx(&mut self.state, frame)
    }

    pub fn tx_lin(&self, channel: u8, payload: &[u8]) -> bool {
        self.mode.tx_lin(channel, payload)
    }

    pub fn ignition(&self, sampler: &dyn IgnitionSampler) -> Ignition {
        self.mode.ignition(sampler)
    }

    pub fn fwd(&mut self, bus: BusId, frame: &Frame) -> ForwardOutcome {
        self.mode.fwd(&mut self.state, bus, frame)
    }

    pub fn status(&self, stats: FrameStats) -> GatewayStatus {
        self.state.status(self.mode.kind(), stats)
    }

    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }
}
