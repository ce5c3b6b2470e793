//! E2E tests for the stock/autopilot takeover handshake and the safety latch.

mod helpers;

use hkg_gateway::{BusEvent, Dispatcher, MockCanInterface, MockStatusSink};
use hkg_protocol::Ignition;
use hkg_safety::takeover::GRACE_WINDOW;
use hkg_safety::{
    CAMERA_BUS, GuardedAddress, RoutingDecision, SafetyMode, SafetySession, VEHICLE_BUS,
};
use std::time::Duration;

use helpers::{CLU11, LKAS11, frame};

/// After one autopilot CLU11, the next 20 stock CLU11 frames go to the
/// camera bus only; the 21st is forwarded normally.
#[test]
fn e2e_clu11_grace_window() {
    for mode in [SafetyMode::NoOutput, SafetyMode::AllOutput] {
        let mut session = SafetySession::new(mode, 0);
        let stock = frame(VEHICLE_BUS, CLU11, &[0x00, 0x01, 0x02, 0x03]);
        session.tx(&frame(VEHICLE_BUS, CLU11, &[0x08, 0x01, 0x02, 0x03]));

        for i in 1..=GRACE_WINDOW {
            let out = session.fwd(VEHICLE_BUS, &stock);
            assert_eq!(out.decision, RoutingDecision::Forward(CAMERA_BUS), "cycle {i}");
            assert_eq!(session.state().takeover(GuardedAddress::Clu11).op_live(), GRACE_WINDOW - i);
        }
        let out = session.fwd(VEHICLE_BUS, &stock);
        assert_eq!(out.decision, RoutingDecision::Mirror(1, 2));
    }
}

/// Same handshake for LKAS11 from the camera bus: held back during the
/// window, mirrored to both other buses afterwards.
#[test]
fn e2e_lkas11_grace_window() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    let stock = frame(CAMERA_BUS, LKAS11, &[0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    session.tx(&frame(VEHICLE_BUS, LKAS11, &[0x41, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]));

    for _ in 0..GRACE_WINDOW {
        assert_eq!(session.fwd(CAMERA_BUS, &stock).decision, RoutingDecision::Drop);
    }
    assert_eq!(session.fwd(CAMERA_BUS, &stock).decision, RoutingDecision::Mirror(1, 0));
}

/// Without fresh transmits the autopilot cannot hold the bus past the window.
#[test]
fn e2e_vanished_autopilot_releases_bus() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    let stock = frame(VEHICLE_BUS, CLU11, &[0x00; 4]);
    session.tx(&stock);

    let taken = (0..100)
        .filter(|_| session.fwd(VEHICLE_BUS, &stock).decision == RoutingDecision::Forward(CAMERA_BUS))
        .count();
    assert_eq!(taken, GRACE_WINDOW as usize);
}

/// Interleaved traffic: a transmit that follows a stock frame is absorbed,
/// and every stock frame ends up on some bus.
#[test]
fn e2e_interleaved_handshake_never_loses_stock_frame() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    let stock = frame(VEHICLE_BUS, CLU11, &[0x00; 4]);
    let op = frame(VEHICLE_BUS, CLU11, &[0x01; 4]);

    for _ in 0..200 {
        session.tx(&op);
        let out = session.fwd(VEHICLE_BUS, &stock);
        assert!(!out.decision.is_drop());
        let counter = session.state().takeover(GuardedAddress::Clu11);
        assert!((0..=GRACE_WINDOW).contains(&counter.op_live()));
        assert!((0..=2).contains(&counter.fwd_suppressed()));
    }
}

/// LKAS11 on the vehicle bus trips the latch for good.
#[test]
fn e2e_latch_never_rearms() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    session.fwd(VEHICLE_BUS, &frame(VEHICLE_BUS, LKAS11, &[0x00; 8]));
    assert!(!session.state().forwarding_enabled());

    for address in [0x100, CLU11, LKAS11, 593, 0x7FF] {
        for bus in 0..3 {
            session.tx(&frame(bus, address, &[0xFF; 8]));
            session.rx(&frame(bus, address, &[0xFF; 8]));
            session.fwd(bus, &frame(bus, address, &[0xFF; 8]));
        }
    }
    session.set_mode(SafetyMode::NoOutput, 0);
    assert!(!session.state().forwarding_enabled());

    // Fail-safe table from here on; the takeover no longer applies.
    session.tx(&frame(VEHICLE_BUS, CLU11, &[0x00; 4]));
    let out = session.fwd(VEHICLE_BUS, &frame(VEHICLE_BUS, CLU11, &[0x00; 4]));
    assert_eq!(out.decision, RoutingDecision::Forward(1));
    assert_eq!(session.fwd(CAMERA_BUS, &frame(CAMERA_BUS, 0x100, &[])).decision, RoutingDecision::Drop);
}

/// The dispatcher emits the takeover routing on the wire.
#[tokio::test]
async fn e2e_dispatcher_emits_takeover_routing() {
    let op = frame(VEHICLE_BUS, CLU11, &[0x01, 0x00, 0x00, 0x00]);
    let stock = frame(VEHICLE_BUS, CLU11, &[0x00, 0x00, 0x00, 0x00]);
    let mut events = vec![BusEvent::TransmitRequest(op)];
    events.extend(std::iter::repeat_n(BusEvent::Received(stock), 21));

    let mock = MockCanInterface::with_events(events);
    let sink = MockStatusSink::new();
    let mut dispatcher = Dispatcher::new(SafetySession::new(SafetyMode::AllOutput, 0));
    dispatcher
        .run(&mock, &sink, &Ignition::Unknown, Duration::from_millis(5), Duration::from_secs(60))
        .await
        .unwrap();

    // op frame on bus 0, 20 takeover copies on bus 2, final stock frame on 1 and 2.
    assert_eq!(mock.sent_on(0), vec![op]);
    assert_eq!(mock.sent_on(1).len(), 1);
    assert_eq!(mock.sent_on(2).len(), 21);
    assert!(mock.sent_on(2).iter().all(|f| f.payload() == stock.payload()));
}
