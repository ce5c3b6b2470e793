//! E2E tests for static routing of non-guarded traffic.

mod helpers;

use hkg_safety::routing::route;
use hkg_safety::{RoutingDecision, SafetyMode, SafetySession, VEHICLE_BUS};

use helpers::{LKAS11, frame};

const PAYLOADS: [&[u8]; 5] = [
    &[],
    &[0x00],
    &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    &[0x12, 0x34, 0x56],
    &[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03],
];

const ADDRESSES: [u32; 6] = [0x000, 0x100, 0x2B0, 0x4F0, 0x7FF, 0x1FFF_FFFF];

/// Non-guarded traffic follows the table, regardless of payload.
#[test]
fn e2e_non_guarded_follows_table() {
    let mut session = SafetySession::new(SafetyMode::AllOutput, 0);
    for bus in 0..4 {
        for address in ADDRESSES {
            for payload in PAYLOADS {
                let input = frame(bus, address, payload);
                let out = session.fwd(bus, &input);
                assert_eq!(out.decision, route(bus, true), "bus {bus} address {address:#X}");
                assert_eq!(out.frame, input);
            }
        }
    }
    assert!(session.state().forwarding_enabled());
}

/// After the latch trips the same traffic follows the fail-safe table.
#[test]
fn e2e_non_guarded_follows_fail_safe_table() {
    let mut session = SafetySession::new(SafetyMode::NoOutput, 0);
    session.fwd(VEHICLE_BUS, &frame(VEHICLE_BUS, LKAS11, &[0; 8]));

    for bus in 0..4 {
        for address in ADDRESSES {
            for payload in PAYLOADS {
                let out = session.fwd(bus, &frame(bus, address, payload));
                assert_eq!(out.decision, route(bus, false));
            }
        }
    }
    assert_eq!(route(0, false), RoutingDecision::Forward(1));
    assert_eq!(route(1, false), RoutingDecision::Forward(0));
    assert_eq!(route(2, false), RoutingDecision::Drop);
}
