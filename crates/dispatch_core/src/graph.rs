//! Cycle-scoped adjacency graph over the location network.
//!
//! Locations get a dense `usize` index for the lifetime of the graph and the
//! adjacency lists are stored per index, with side tables mapping back and
//! forth to [`LocationId`]. This keeps the shortest-path engine free of
//! repeated id hashing and allocation.
//!
//! The graph is a value object: built once per matching cycle from the
//! current location/path snapshot, shared read-only by all shortest-path
//! queries of that cycle, then discarded.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::geo::haversine_km;
use crate::model::{Location, LocationId, Path};

/// Undirected location graph with haversine edge weights.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Dense index → external id.
    ids: Vec<LocationId>,
    /// External id → dense index.
    index: HashMap<LocationId, usize>,
    /// Adjacency lists: `(neighbor index, weight in km)`.
    adjacency: Vec<Vec<(usize, f64)>>,
    /// Paths dropped because an endpoint was missing from the snapshot.
    skipped_paths: usize,
}

impl Graph {
    /// Build the graph from a location and path snapshot.
    ///
    /// Every location is present, isolated ones with an empty neighbor
    /// list. Each valid path contributes one symmetric pair of adjacency
    /// entries. A path referencing a location absent from the snapshot is
    /// stale referential data outside the engine's control: it is skipped
    /// and counted instead of failing the cycle.
    pub fn build(locations: &[Location], paths: &[Path]) -> Self {
        let mut ids = Vec::with_capacity(locations.len());
        let mut index = HashMap::with_capacity(locations.len());
        let mut coordinates = Vec::with_capacity(locations.len());

        for location in locations {
            index.insert(location.id, ids.len());
            ids.push(location.id);
            coordinates.push((location.latitude, location.longitude));
        }

        let mut adjacency = vec![Vec::new(); ids.len()];
        let mut skipped_paths = 0;

        for path in paths {
            let (Some(&a), Some(&b)) = (index.get(&path.node_a), index.get(&path.node_b)) else {
                warn!(
                    node_a = %path.node_a,
                    node_b = %path.node_b,
                    "skipping path with unknown endpoint"
                );
                skipped_paths += 1;
                continue;
            };

            let (lat_a, lon_a) = coordinates[a];
            let (lat_b, lon_b) = coordinates[b];
            let weight = haversine_km(lat_a, lon_a, lat_b, lon_b);

            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }

        debug!(
            nodes = ids.len(),
            paths = paths.len() - skipped_paths,
            skipped_paths,
            "built location graph"
        );

        Self {
            ids,
            index,
            adjacency,
            skipped_paths,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Dense index of a location, if it is part of this snapshot.
    pub fn node(&self, id: LocationId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// External id of a dense node index.
    pub fn location_id(&self, node: usize) -> LocationId {
        self.ids[node]
    }

    /// Neighbors of a node as `(neighbor index, weight in km)`.
    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.adjacency[node]
    }

    /// How many paths were dropped for referencing unknown locations.
    pub fn skipped_paths(&self) -> usize {
        self.skipped_paths
    }
}
