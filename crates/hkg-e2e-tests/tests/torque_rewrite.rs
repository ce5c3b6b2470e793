//! E2E tests for the MDPS12 torque ramp rewrite on the forward path.

mod helpers;

use hkg_safety::checksum::{self, INTEGRITY_INDEX};
use hkg_safety::rewriter::{CYCLE_PERIOD, MDPS12, OUT_TQ, OUT_TQ_OVERRIDE, RAMP_START, STR_COL_TQ};
use hkg_safety::{ChecksumAlgorithm, MDPS_BUS, RoutingDecision, SafetyMode, SafetySession};

use helpers::{MDPS12_BODY, advance_mdps12, calibrated_session, frame, mdps12};

fn decode(frame: &hkg_safety::Frame) -> (u32, u32) {
    let mut data = [0u8; 8];
    data.copy_from_slice(frame.payload());
    (STR_COL_TQ.extract(&data), OUT_TQ.extract(&data))
}

/// cycle_counter counts MDPS12 frames and wraps at 345.
#[test]
fn e2e_cycle_counter_wraps() {
    let mut session = calibrated_session(SafetyMode::NoOutput, ChecksumAlgorithm::AdditiveSum);
    for expected in 1..CYCLE_PERIOD {
        advance_mdps12(&mut session, 1, ChecksumAlgorithm::AdditiveSum);
        assert_eq!(session.state().cycle_counter(), expected);
    }
    advance_mdps12(&mut session, 1, ChecksumAlgorithm::AdditiveSum);
    assert_eq!(session.state().cycle_counter(), 0);

    // Other addresses do not advance it.
    session.fwd(MDPS_BUS, &frame(MDPS_BUS, 0x100, &[0; 8]));
    assert_eq!(session.state().cycle_counter(), 0);
}

/// The frame processed at cycle 330 seeds the ramp with its own torque - 164,
/// so the ramp at cycle 331 is decoded_torque_at_330 - 164. Later frames add
/// 34 each, whatever torque they carry.
#[test]
fn e2e_ramp_schedule() {
    let algorithm = ChecksumAlgorithm::Crc8;
    let mut session = calibrated_session(SafetyMode::AllOutput, algorithm);
    advance_mdps12(&mut session, RAMP_START, algorithm);
    assert_eq!(session.state().cycle_counter(), RAMP_START);

    // StrColTq 768 at cycle 330, 256 afterwards.
    let mut body_330 = MDPS12_BODY;
    body_330[0] = 0x00;
    body_330[1] = (MDPS12_BODY[1] & 0xF8) | 0x03;
    let mut body_later = MDPS12_BODY;
    body_later[0] = 0x00;
    body_later[1] = (MDPS12_BODY[1] & 0xF8) | 0x01;
    let at_330 = mdps12(body_330, algorithm);
    let later = mdps12(body_later, algorithm);
    assert_eq!(decode(&at_330).0, 768);
    assert_eq!(decode(&later).0, 256);

    let first = session.fwd(MDPS_BUS, &at_330);
    assert!(first.rewritten);
    assert_eq!(session.state().cycle_counter(), RAMP_START + 1);
    assert_eq!(session.state().last_ramp_value(), 768 - 164);
    assert_eq!(decode(&first.frame), (604, OUT_TQ_OVERRIDE));

    let mut previous = session.state().last_ramp_value();
    for _ in RAMP_START + 1..CYCLE_PERIOD {
        let out = session.fwd(MDPS_BUS, &later);
        assert!(out.rewritten);
        assert_eq!(session.state().last_ramp_value(), previous + 34);
        assert_eq!(decode(&out.frame).0, (previous + 34) as u32);
        previous += 34;
    }

    // Back at cycle 0: frames pass unmodified again.
    assert_eq!(session.state().cycle_counter(), 0);
    let out = session.fwd(MDPS_BUS, &later);
    assert!(!out.rewritten);
    assert_eq!(out.frame, later);
}

/// Each 345-frame period rewrites exactly the 15 frames from cycle 330 on.
#[test]
fn e2e_fifteen_rewrites_per_period() {
    let algorithm = ChecksumAlgorithm::AdditiveSum;
    let mut session = calibrated_session(SafetyMode::NoOutput, algorithm);
    let input = mdps12(MDPS12_BODY, algorithm);

    for _ in 0..2 {
        let rewritten: Vec<u32> = (0..CYCLE_PERIOD)
            .filter(|_| session.fwd(MDPS_BUS, &input).rewritten)
            .collect();
        assert_eq!(rewritten, (RAMP_START..CYCLE_PERIOD).collect::<Vec<_>>());
    }
}

/// The emitted integrity byte equals an independent recomputation, for both
/// algorithms, and the rewritten frame keeps the normal routing.
#[test]
fn e2e_rewritten_checksum_is_valid() {
    for algorithm in [ChecksumAlgorithm::AdditiveSum, ChecksumAlgorithm::Crc8] {
        let mut session = calibrated_session(SafetyMode::NoOutput, algorithm);
        advance_mdps12(&mut session, RAMP_START, algorithm);

        for _ in RAMP_START..CYCLE_PERIOD {
            let out = session.fwd(MDPS_BUS, &mdps12(MDPS12_BODY, algorithm));
            assert_eq!(out.decision, RoutingDecision::Mirror(2, 0));
            let recomputed = checksum::compute(algorithm, out.frame.payload(), INTEGRITY_INDEX);
            assert_eq!(out.frame.byte(INTEGRITY_INDEX), Some(recomputed));
            // Bytes outside the two fields and the checksum are untouched.
            assert_eq!(out.frame.byte(2), Some(MDPS12_BODY[2]));
            assert_eq!(out.frame.byte(4), Some(MDPS12_BODY[4]));
            assert_eq!(out.frame.byte(5), Some(MDPS12_BODY[5]));
            assert_eq!(out.frame.byte(6).map(|b| b & 0x0F), Some(MDPS12_BODY[6] & 0x0F));
            assert_eq!(out.frame.byte(1).map(|b| b & 0xF8), Some(MDPS12_BODY[1] & 0xF8));
        }
    }
}

/// Register view of the emitted frame is derived from its bytes.
#[test]
fn e2e_rewritten_register_view_agrees() {
    let algorithm = ChecksumAlgorithm::AdditiveSum;
    let mut session = calibrated_session(SafetyMode::AllOutput, algorithm);
    advance_mdps12(&mut session, RAMP_START, algorithm);

    let out = session.fwd(MDPS_BUS, &mdps12(MDPS12_BODY, algorithm)).frame;
    let p = out.payload();
    let (rdlr, rdhr) = out.registers();
    assert_eq!(rdlr, u32::from_le_bytes([p[0], p[1], p[2], p[3]]));
    assert_eq!(rdhr, u32::from_le_bytes([p[4], p[5], p[6], p[7]]));
}

/// Short MDPS12 frames in the active window are forwarded untouched.
#[test]
fn e2e_short_frame_not_rewritten() {
    let algorithm = ChecksumAlgorithm::AdditiveSum;
    let mut session = calibrated_session(SafetyMode::AllOutput, algorithm);
    advance_mdps12(&mut session, RAMP_START, algorithm);

    let short = frame(MDPS_BUS, MDPS12, &[0xD0, 0x32, 0x5A]);
    let out = session.fwd(MDPS_BUS, &short);
    assert!(!out.rewritten);
    assert_eq!(out.frame, short);
    assert_eq!(out.decision, RoutingDecision::Mirror(2, 0));
}

/// Before calibration nothing is rewritten, but the schedule still advances.
#[test]
fn e2e_uncalibrated_session_never_rewrites() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    let input = frame(MDPS_BUS, MDPS12, &MDPS12_BODY);
    for _ in 0..CYCLE_PERIOD {
        assert!(!session.fwd(MDPS_BUS, &input).rewritten);
    }
    assert_eq!(session.state().cycle_counter(), 0);
}
