//! Domain entities for a matching cycle: locations, paths, ride requests
//! and shuttles.
//!
//! These are snapshot value types. The engine receives them from the
//! collaborating store at the start of a cycle and never mutates them;
//! state changes happen through [`crate::store::FleetStore::commit_match`].

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identity of a [`Location`].
    LocationId
);
entity_id!(
    /// Identity of a [`RideRequest`].
    RideId
);
entity_id!(
    /// Identity of a [`Shuttle`].
    ShuttleId
);
entity_id!(
    /// Identity of the user who requested a ride.
    UserId
);

/// Whether a location is a stop riders can board at or a pure routing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationKind {
    Stop,
    Waypoint,
}

/// A named point on the campus network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Short unique code, e.g. "LIB" or "GATE2".
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: LocationKind,
}

/// An undirected edge between two locations.
///
/// Paths carry no stored weight; the edge weight is derived from the
/// endpoint coordinates when the graph is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub node_a: LocationId,
    pub node_b: LocationId,
}

/// Lifecycle of a ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    Pending,
    Matched,
    Cancelled,
    Completed,
}

/// A rider's request to travel from one location to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RideId,
    pub requested_by: UserId,
    pub source: LocationId,
    pub destination: LocationId,
    pub status: RideStatus,
    pub assigned_shuttle: Option<ShuttleId>,
}

impl RideRequest {
    /// Only pending rides take part in matching.
    pub fn is_pending(&self) -> bool {
        self.status == RideStatus::Pending
    }
}

/// Lifecycle of a shuttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuttleStatus {
    Active,
    Assigned,
    Maintenance,
}

/// A shuttle in the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shuttle {
    pub id: ShuttleId,
    /// Fleet number, e.g. "SH-04".
    pub number: String,
    pub current_location: LocationId,
    pub status: ShuttleStatus,
    /// Pickup → dropoff of the ride this shuttle is serving, if any.
    pub route: Option<(LocationId, LocationId)>,
}

impl Shuttle {
    /// Only active shuttles take part in matching.
    pub fn is_active(&self) -> bool {
        self.status == ShuttleStatus::Active
    }
}
