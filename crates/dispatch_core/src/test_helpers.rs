//! Shared fixtures for tests, benches and examples.
//!
//! Gated behind the `test-helpers` feature (on by default) so downstream
//! builds can drop them.

use crate::model::{
    Location, LocationId, LocationKind, Path, RideId, RideRequest, RideStatus, Shuttle, ShuttleId,
    ShuttleStatus, UserId,
};
use crate::store::InMemoryDispatchStore;

/// A boardable stop.
pub fn stop(id: u64, name: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        id: LocationId(id),
        name: name.to_string(),
        code: name.to_uppercase().replace(' ', "_"),
        latitude,
        longitude,
        kind: LocationKind::Stop,
    }
}

/// A pure routing node.
pub fn waypoint(id: u64, name: &str, latitude: f64, longitude: f64) -> Location {
    Location {
        kind: LocationKind::Waypoint,
        ..stop(id, name, latitude, longitude)
    }
}

pub fn path(a: u64, b: u64) -> Path {
    Path {
        node_a: LocationId(a),
        node_b: LocationId(b),
    }
}

pub fn pending_ride(id: u64, source: u64, destination: u64) -> RideRequest {
    RideRequest {
        id: RideId(id),
        requested_by: UserId(id),
        source: LocationId(source),
        destination: LocationId(destination),
        status: RideStatus::Pending,
        assigned_shuttle: None,
    }
}

pub fn active_shuttle(id: u64, at: u64) -> Shuttle {
    Shuttle {
        id: ShuttleId(id),
        number: format!("SH-{id:02}"),
        current_location: LocationId(at),
        status: ShuttleStatus::Active,
        route: None,
    }
}

/// `stops` locations in a line along the equator, one degree of longitude
/// apart, consecutive stops connected. Ids are `1..=stops`.
pub fn line_network(stops: u64) -> (Vec<Location>, Vec<Path>) {
    let locations = (1..=stops)
        .map(|id| stop(id, &format!("Stop {id}"), 0.0, (id - 1) as f64))
        .collect();
    let paths = (1..stops).map(|id| path(id, id + 1)).collect();
    (locations, paths)
}

/// `width x height` grid with ~1.1 km spacing, 4-connected. Ids are
/// row-major starting at 1.
pub fn grid_network(width: u64, height: u64) -> (Vec<Location>, Vec<Path>) {
    let spacing = 0.01;
    let id_at = |row: u64, col: u64| row * width + col + 1;

    let mut locations = Vec::new();
    let mut paths = Vec::new();
    for row in 0..height {
        for col in 0..width {
            let id = id_at(row, col);
            locations.push(stop(
                id,
                &format!("Grid {row}-{col}"),
                row as f64 * spacing,
                col as f64 * spacing,
            ));
            if col + 1 < width {
                paths.push(path(id, id_at(row, col + 1)));
            }
            if row + 1 < height {
                paths.push(path(id, id_at(row + 1, col)));
            }
        }
    }
    (locations, paths)
}

/// An in-memory store seeded with the given network.
pub fn store_with_network(locations: Vec<Location>, paths: Vec<Path>) -> InMemoryDispatchStore {
    let store = InMemoryDispatchStore::new();
    for location in locations {
        store.add_location(location);
    }
    for p in paths {
        store.add_path(p);
    }
    store
}
