//! The CAN frame as seen by the safety hooks.
//!
//! The byte array is the only stored representation. The packed mailbox
//! register view (`RDLR`/`RDHR`) is derived on demand, so the two can never
//! disagree.

use crate::error::{SafetyError, SafetyResult};

/// Physical bus index on the gateway (0, 1 or 2).
pub type BusId = u8;

/// Vehicle powertrain/chassis bus.
pub const VEHICLE_BUS: BusId = 0;
/// Bus carrying the steering (MDPS) module.
pub const MDPS_BUS: BusId = 1;
/// Camera bus, facing the autopilot.
pub const CAMERA_BUS: BusId = 2;

/// Classic CAN payload limit.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// A classic CAN frame received on, or destined for, one gateway bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bus: BusId,
    address: u32,
    /// Bytes past `len` are always zero.
    data: [u8; MAX_PAYLOAD_LEN],
    len: u8,
}

impl Frame {
    /// Build a frame from a payload slice of at most 8 bytes.
    pub fn new(bus: BusId, address: u32, payload: &[u8]) -> SafetyResult<Self> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(SafetyError::PayloadTooLong { len: payload.len() });
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            bus,
            address,
            data,
            len: payload.len() as u8,
        })
    }

    /// Build a frame from the mailbox register pair (low word holds bytes 0..4).
    pub fn from_registers(bus: BusId, address: u32, rdlr: u32, rdhr: u32, dlc: u8) -> SafetyResult<Self> {
        if dlc as usize > MAX_PAYLOAD_LEN {
            return Err(SafetyError::InvalidDlc { dlc });
        }
        let mut data = [0u8; MAX_PAYLOAD_LEN];
        data[..4].copy_from_slice(&rdlr.to_le_bytes());
        data[4..].copy_from_slice(&rdhr.to_le_bytes());
        data[dlc as usize..].fill(0);
        Ok(Self {
            bus,
            address,
            data,
            len: dlc,
        })
    }

    pub fn bus(&self) -> BusId {
        self.bus
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes actually carried by the frame.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Byte `index`, or `None` past the end of the payload.
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.payload().get(index).copied()
    }

    /// Packed register view `(RDLR, RDHR)`, derived from the bytes.
    pub fn registers(&self) -> (u32, u32) {
        let [b0, b1, b2, b3, b4, b5, b6, b7] = self.data;
        (
            u32::from_le_bytes([b0, b1, b2, b3]),
            u32::from_le_bytes([b4, b5, b6, b7]),
        )
    }

    /// The same frame addressed to another bus, for emission.
    pub fn on_bus(&self, bus: BusId) -> Self {
        Self { bus, ..*self }
    }

    pub(crate) fn data(&self) -> [u8; MAX_PAYLOAD_LEN] {
        self.data
    }

    /// Same bus, address and length with a replaced payload.
    pub(crate) fn with_data(&self, mut data: [u8; MAX_PAYLOAD_LEN]) -> Self {
        data[self.len as usize..].fill(0);
        Self { data, ..*self }
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bus{} 0x{:03X} [", self.bus, self.address)?;
        for (i, b) in self.payload().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02X}")?;
        }
        write!(f, "]")
    }
}
