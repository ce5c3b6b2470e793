//! Integrity-byte computation for the steering module's frames, and the
//! one-shot detector that decides which algorithm this vehicle uses.

use hkg_protocol::ChecksumAlgorithm;

/// Position of the integrity byte in MDPS12.
pub const INTEGRITY_INDEX: usize = 3;

/// CRC-8 SAE-J1850 parameters.
pub const CRC8_POLY: u8 = 0x1D;
pub const CRC8_INIT: u8 = 0xFF;
pub const CRC8_XOR_OUT: u8 = 0xFF;

/// Modulo-256 sum of every byte except `skip_index`.
pub fn compute_additive(payload: &[u8], skip_index: usize) -> u8 {
    payload
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != skip_index)
        .fold(0u8, |sum, (_, &byte)| sum.wrapping_add(byte))
}

/// Bit-serial, MSB-first CRC-8 over every byte except `skip_index`.
pub fn compute_crc8(payload: &[u8], skip_index: usize) -> u8 {
    let mut crc = CRC8_INIT;
    for (_, &byte) in payload.iter().enumerate().filter(|&(i, _)| i != skip_index) {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc ^ CRC8_XOR_OUT
}

/// Integrity byte for `payload` under `algorithm`.
pub fn compute(algorithm: ChecksumAlgorithm, payload: &[u8], skip_index: usize) -> u8 {
    match algorithm {
        ChecksumAlgorithm::AdditiveSum => compute_additive(payload, skip_index),
        ChecksumAlgorithm::Crc8 => compute_crc8(payload, skip_index),
    }
}

/// Classify an authentic frame by whether its carried byte is the additive sum.
///
/// Returns `None` when the payload is too short to carry the integrity byte.
pub fn detect(payload: &[u8], integrity_index: usize) -> Option<ChecksumAlgorithm> {
    let carried = *payload.get(integrity_index)?;
    if compute_additive(payload, integrity_index) == carried {
        Some(ChecksumAlgorithm::AdditiveSum)
    } else {
        Some(ChecksumAlgorithm::Crc8)
    }
}

/// Write-once holder for the detected algorithm.
///
/// The first usable calibration frame decides; later frames are ignored even
/// if they would classify differently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecksumDetector {
    resolved: Option<ChecksumAlgorithm>,
}

impl ChecksumDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolved(&self) -> Option<ChecksumAlgorithm> {
        self.resolved
    }

    /// Feed one calibration frame. Returns the algorithm only on the call that
    /// resolved it.
    pub fn observe(&mut self, payload: &[u8]) -> Option<ChecksumAlgorithm> {
        if self.resolved.is_some() {
            return None;
        }
        let algorithm = detect(payload, INTEGRITY_INDEX)?;
        self.resolved = Some(algorithm);
        Some(algorithm)
    }
}
