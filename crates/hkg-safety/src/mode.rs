//! Safety modes and their hooks.
//!
//! Every mode exposes the same capability set (init, rx, tx, tx_lin,
//! ignition, fwd). New brand modes are added as variants of [`SafetyMode`];
//! they share the forwarding hook below unless they need their own.

use hkg_protocol::{Ignition, ModeKind};

use crate::frame::{BusId, CAMERA_BUS, Frame, VEHICLE_BUS};
use crate::ignition::IgnitionSampler;
use crate::rewriter::MDPS12;
use crate::routing::{self, RoutingDecision};
use crate::state::SafetyState;
use crate::takeover::{Claim, GuardedAddress, LKAS11};

/// Result of the forward hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub decision: RoutingDecision,
    /// The frame to emit: the received one, or its rewritten copy.
    pub frame: Frame,
    pub rewritten: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyMode {
    NoOutput,
    AllOutput,
}

impl From<ModeKind> for SafetyMode {
    fn from(kind: ModeKind) -> Self {
        match kind {
            ModeKind::NoOutput => Self::NoOutput,
            ModeKind::AllOutput => Self::AllOutput,
        }
    }
}

impl SafetyMode {
    pub fn kind(self) -> ModeKind {
        match self {
            Self::NoOutput => ModeKind::NoOutput,
            Self::AllOutput => ModeKind::AllOutput,
        }
    }

    /// Enter this mode. `param` is the opaque mode parameter from the host.
    pub fn init(self, state: &mut SafetyState, _param: i16) {
        state.controls_allowed = matches!(self, Self::AllOutput);
        tracing::debug!(mode = %self.kind(), controls_allowed = state.controls_allowed, "safety mode initialized");
    }

    /// Observe a received frame. Drives checksum calibration on MDPS12.
    pub fn rx(self, state: &mut SafetyState, frame: &Frame) {
        if frame.address() != MDPS12 {
            return;
        }
        if let Some(algorithm) = state.checksum.observe(frame.payload()) {
            tracing::info!(?algorithm, bus = frame.bus(), "MDPS12 checksum algorithm resolved");
        }
    }

    /// Decide whether the autopilot may transmit `frame`. Transmits on
    /// guarded addresses also feed the takeover counters.
    pub fn tx(self, state: &mut SafetyState, frame: &Frame) -> bool {
        if let Some(guarded) = GuardedAddress::from_address(frame.address())
            && state.takeover.get_mut(guarded).record_tx()
        {
            tracing::trace!(?guarded, "takeover window armed");
        }
        match self {
            Self::NoOutput => false,
            Self::AllOutput => true,
        }
    }

    /// Decide whether the autopilot may write to a LIN sub-bus.
    pub fn tx_lin(self, _channel: u8, _payload: &[u8]) -> bool {
        match self {
            Self::NoOutput => false,
            Self::AllOutput => true,
        }
    }

    pub fn ignition(self, sampler: &dyn IgnitionSampler) -> Ignition {
        sampler.sample()
    }

    /// Route a frame received on `bus`, rewriting MDPS12 when scheduled.
    pub fn fwd(self, state: &mut SafetyState, bus: BusId, frame: &Frame) -> ForwardOutcome {
        let address = frame.address();

        // LKAS11 on the vehicle bus means a second lane-keeping controller
        // is wired there.
        if address == LKAS11 && bus == VEHICLE_BUS && state.trip_latch() {
            tracing::warn!(bus, address, "stock LKAS11 seen on vehicle bus, forwarding disabled");
        }

        let rewritten = if address == MDPS12 {
            state.ramp.process(frame, state.checksum.resolved())
        } else {
            None
        };

        let decision = if state.forwarding_enabled {
            match (bus, GuardedAddress::from_address(address)) {
                (VEHICLE_BUS, Some(GuardedAddress::Clu11)) => {
                    match state.takeover.get_mut(GuardedAddress::Clu11).claim() {
                        Claim::Autopilot => RoutingDecision::Forward(CAMERA_BUS),
                        Claim::Stock => routing::route(bus, true),
                    }
                }
                (CAMERA_BUS, Some(GuardedAddress::Lkas11)) => {
                    // The autopilot already sees the camera bus directly.
                    match state.takeover.get_mut(GuardedAddress::Lkas11).claim() {
                        Claim::Autopilot => RoutingDecision::Drop,
                        Claim::Stock => routing::route(bus, true),
                    }
                }
                _ => routing::route(bus, true),
            }
        } else {
            if bus == VEHICLE_BUS && GuardedAddress::from_address(address) == Some(GuardedAddress::Clu11) {
                state.takeover.get_mut(GuardedAddress::Clu11).mark_overridden();
            }
            routing::route(bus, false)
        };

        ForwardOutcome {
            decision,
            frame: rewritten.unwrap_or(*frame),
            rewritten: rewritten.is_some(),
        }
    }
}
