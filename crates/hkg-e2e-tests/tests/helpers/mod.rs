//! Shared fixtures for the gateway end-to-end tests.

#![allow(dead_code)]

use hkg_safety::checksum::{self, INTEGRITY_INDEX};
use hkg_safety::rewriter::MDPS12;
use hkg_safety::{BusId, ChecksumAlgorithm, Frame, MDPS_BUS, SafetyMode, SafetySession};

pub const LKAS11: u32 = 832;
pub const CLU11: u32 = 1265;

/// MDPS12 body used across tests: StrColTq = 0x2D0 (720), OutTq = 0x7E1.
pub const MDPS12_BODY: [u8; 8] = [0xD0, 0x32, 0x5A, 0x00, 0x11, 0x22, 0x13, 0x7E];

pub fn frame(bus: BusId, address: u32, payload: &[u8]) -> Frame {
    Frame::new(bus, address, payload).unwrap()
}

/// An authentic MDPS12 frame whose integrity byte uses `algorithm`.
pub fn mdps12(body: [u8; 8], algorithm: ChecksumAlgorithm) -> Frame {
    let mut data = body;
    data[INTEGRITY_INDEX] = 0;
    data[INTEGRITY_INDEX] = checksum::compute(algorithm, &data, INTEGRITY_INDEX);
    frame(MDPS_BUS, MDPS12, &data)
}

/// Session whose checksum algorithm is already resolved from one rx.
pub fn calibrated_session(mode: SafetyMode, algorithm: ChecksumAlgorithm) -> SafetySession {
    let mut session = SafetySession::new(mode, 0);
    session.rx(&mdps12(MDPS12_BODY, algorithm));
    assert_eq!(session.state().checksum_algorithm(), Some(algorithm));
    session
}

/// Forward `count` MDPS12 frames, discarding the outcomes.
pub fn advance_mdps12(session: &mut SafetySession, count: u32, algorithm: ChecksumAlgorithm) {
    let frame = mdps12(MDPS12_BODY, algorithm);
    for _ in 0..count {
        session.fwd(MDPS_BUS, &frame);
    }
}
