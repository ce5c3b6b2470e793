//! Static bus-to-bus forwarding table.

use crate::frame::{BusId, CAMERA_BUS, MDPS_BUS, VEHICLE_BUS};

/// Where a received frame goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    Drop,
    Forward(BusId),
    /// Forward to two buses at once.
    Mirror(BusId, BusId),
}

impl RoutingDecision {
    /// Integer code understood by the transceiver driver: `-1` drop, a bus
    /// index, or a two-digit code whose digits are the two buses.
    pub fn to_raw(self) -> i32 {
        match self {
            Self::Drop => -1,
            Self::Forward(bus) => i32::from(bus),
            Self::Mirror(a, b) => i32::from(a) * 10 + i32::from(b),
        }
    }

    /// Destination buses in emission order.
    pub fn destinations(self) -> impl Iterator<Item = BusId> {
        let (first, second) = match self {
            Self::Drop => (None, None),
            Self::Forward(bus) => (Some(bus), None),
            Self::Mirror(a, b) => (Some(a), Some(b)),
        };
        first.into_iter().chain(second)
    }

    pub fn reaches(self, bus: BusId) -> bool {
        self.destinations().any(|dest| dest == bus)
    }

    pub fn is_drop(self) -> bool {
        matches!(self, Self::Drop)
    }
}

/// Table lookup for a frame received on `bus`.
///
/// With forwarding enabled every bus is bridged to the other two. Once the
/// safety latch has tripped, only the vehicle and MDPS buses stay bridged.
pub fn route(bus: BusId, forwarding_enabled: bool) -> RoutingDecision {
    match (forwarding_enabled, bus) {
        (true, VEHICLE_BUS) => RoutingDecision::Mirror(MDPS_BUS, CAMERA_BUS),
        (true, MDPS_BUS) => RoutingDecision::Mirror(CAMERA_BUS, VEHICLE_BUS),
        (true, CAMERA_BUS) => RoutingDecision::Mirror(MDPS_BUS, VEHICLE_BUS),
        (false, VEHICLE_BUS) => RoutingDecision::Forward(MDPS_BUS),
        (false, MDPS_BUS) => RoutingDecision::Forward(VEHICLE_BUS),
        _ => RoutingDecision::Drop,
    }
}
