//! Takeover counters arbitrating between the stock module and the autopilot
//! for addresses both of them can drive.
//!
//! Each guarded address carries two countdowns:
//! - `op_live`: how many more stock frames the autopilot keeps priority over
//!   (re-armed only by a fresh autopilot transmit, `0..=GRACE_WINDOW`);
//! - `fwd_suppressed`: how many upcoming autopilot transmits are still
//!   considered answered by a recent stock frame (`0..=2`).
//!
//! Both only move between those bounds, so no reachable sequence of hooks
//! can overflow them.

/// Lane keeping command from the camera (LKAS11).
pub const LKAS11: u32 = 832;
/// Cluster status incl. cruise buttons (CLU11).
pub const CLU11: u32 = 1265;

/// Stock frames the autopilot keeps priority over after one transmit.
pub const GRACE_WINDOW: i32 = 20;

/// Suppression left after a stock frame was forwarded normally.
pub const SUPPRESS_AFTER_STOCK: i32 = 2;
/// Suppression left after a stock frame lost to the autopilot.
pub const SUPPRESS_AFTER_TAKEOVER: i32 = 1;

/// Address class subject to the takeover handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardedAddress {
    Lkas11,
    Clu11,
}

impl GuardedAddress {
    pub fn from_address(address: u32) -> Option<Self> {
        match address {
            LKAS11 => Some(Self::Lkas11),
            CLU11 => Some(Self::Clu11),
            _ => None,
        }
    }

    pub fn address(self) -> u32 {
        match self {
            Self::Lkas11 => LKAS11,
            Self::Clu11 => CLU11,
        }
    }
}

/// Who wins the current stock frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The autopilot's own frame stands in; reroute the stock one.
    Autopilot,
    /// Forward the stock frame to its normal consumers.
    Stock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TakeoverCounter {
    op_live: i32,
    fwd_suppressed: i32,
}

impl TakeoverCounter {
    pub fn op_live(&self) -> i32 {
        self.op_live
    }

    pub fn fwd_suppressed(&self) -> i32 {
        self.fwd_suppressed
    }

    /// The autopilot transmitted on this address. Returns `true` if the grace
    /// window was (re-)armed.
    pub fn record_tx(&mut self) -> bool {
        if self.fwd_suppressed < 1 {
            self.op_live = GRACE_WINDOW;
            true
        } else {
            self.fwd_suppressed -= 1;
            false
        }
    }

    /// A stock frame for this address is about to be routed.
    pub fn claim(&mut self) -> Claim {
        if self.op_live >= 1 {
            self.op_live -= 1;
            self.fwd_suppressed = SUPPRESS_AFTER_TAKEOVER;
            Claim::Autopilot
        } else {
            self.fwd_suppressed = SUPPRESS_AFTER_STOCK;
            Claim::Stock
        }
    }

    /// Stock frame routed through the fail-safe table.
    pub fn mark_overridden(&mut self) {
        self.fwd_suppressed = SUPPRESS_AFTER_TAKEOVER;
    }
}

/// One counter pair per guarded address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TakeoverBank {
    lkas11: TakeoverCounter,
    clu11: TakeoverCounter,
}

impl TakeoverBank {
    pub fn get(&self, guarded: GuardedAddress) -> &TakeoverCounter {
        match guarded {
            GuardedAddress::Lkas11 => &self.lkas11,
            GuardedAddress::Clu11 => &self.clu11,
        }
    }

    pub fn get_mut(&mut self, guarded: GuardedAddress) -> &mut TakeoverCounter {
        match guarded {
            GuardedAddress::Lkas11 => &mut self.lkas11,
            GuardedAddress::Clu11 => &mut self.clu11,
        }
    }
}
