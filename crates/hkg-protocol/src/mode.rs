//! Mode selection, checksum algorithm and ignition enums shared between the
//! safety core and the host harness.

use serde::{Deserialize, Serialize};

/// Safety mode selected once at session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    /// Autopilot commands denied; gateway still routes vehicle traffic.
    #[default]
    NoOutput,
    /// Autopilot commands allowed.
    AllOutput,
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoOutput => write!(f, "no_output"),
            Self::AllOutput => write!(f, "all_output"),
        }
    }
}

/// Integrity-byte algorithm used by the steering module on this vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumAlgorithm {
    /// Byte sum modulo 256.
    AdditiveSum,
    /// CRC-8, poly 0x1D, init 0xFF, xor-out 0xFF.
    Crc8,
}

/// Tri-state ignition reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ignition {
    On,
    Off,
    /// No reading available; defer to the GPIO line.
    Unknown,
}

impl Ignition {
    /// Map the driver's integer encoding (1, 0, -1).
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::On,
            0 => Self::Off,
            _ => Self::Unknown,
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Self::On => 1,
            Self::Off => 0,
            Self::Unknown => -1,
        }
    }

    /// Unknown is treated as running.
    pub fn requires_full_checks(self) -> bool {
        !matches!(self, Self::Off)
    }
}
