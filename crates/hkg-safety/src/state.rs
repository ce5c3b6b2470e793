//! The single mutable safety context of a power-on session.

use hkg_protocol::{ChecksumAlgorithm, FrameStats, GatewayStatus, ModeKind};

use crate::checksum::ChecksumDetector;
use crate::rewriter::TorqueRamp;
use crate::takeover::{GuardedAddress, TakeoverBank, TakeoverCounter};

/// All state mutated by the safety hooks.
///
/// Created once at power-on and owned by whoever serializes frame dispatch;
/// hooks receive it by `&mut`, so there is exactly one writer.
#[derive(Debug, Clone)]
pub struct SafetyState {
    pub(crate) controls_allowed: bool,
    pub(crate) forwarding_enabled: bool,
    pub(crate) checksum: ChecksumDetector,
    pub(crate) takeover: TakeoverBank,
    pub(crate) ramp: TorqueRamp,
}

impl SafetyState {
    pub fn new() -> Self {
        Self {
            controls_allowed: false,
            forwarding_enabled: true,
            checksum: ChecksumDetector::new(),
            takeover: TakeoverBank::default(),
            ramp: TorqueRamp::default(),
        }
    }

    pub fn controls_allowed(&self) -> bool {
        self.controls_allowed
    }

    pub fn forwarding_enabled(&self) -> bool {
        self.forwarding_enabled
    }

    pub fn checksum_algorithm(&self) -> Option<ChecksumAlgorithm> {
        self.checksum.resolved()
    }

    pub fn takeover(&self, guarded: GuardedAddress) -> &TakeoverCounter {
        self.takeover.get(guarded)
    }

    pub fn cycle_counter(&self) -> u32 {
        self.ramp.cycle_counter()
    }

    pub fn last_ramp_value(&self) -> i32 {
        self.ramp.last_ramp_value()
    }

    /// Clear `forwarding_enabled` for the rest of the session. Returns `true`
    /// only on the call that tripped it.
    pub(crate) fn trip_latch(&mut self) -> bool {
        let tripped = self.forwarding_enabled;
        self.forwarding_enabled = false;
        tripped
    }

    /// Snapshot for the diagnostics surface.
    pub fn status(&self, mode: ModeKind, stats: FrameStats) -> GatewayStatus {
        GatewayStatus {
            mode,
            controls_allowed: self.controls_allowed,
            forwarding_enabled: self.forwarding_enabled,
            checksum_algorithm: self.checksum_algorithm(),
            cycle_counter: self.cycle_counter(),
            stats,
        }
    }
}

impl Default for SafetyState {
    fn default() -> Self {
        Self::new()
    }
}
