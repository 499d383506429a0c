//! Single-source shortest path over the location graph.
//!
//! Classic binary-heap Dijkstra, O((V+E) log V). Edge weights are haversine
//! distances and therefore non-negative, so no re-weighting is needed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::Graph;
use crate::model::LocationId;

/// Result of a shortest-path query.
///
/// For unreachable targets (or endpoints missing from the graph) the
/// distance is `f64::INFINITY` and the path is empty. For `source ==
/// target` the distance is 0 and the path is the single node.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub distance_km: f64,
    /// Node sequence from source to target, inclusive.
    pub path: Vec<LocationId>,
}

impl ShortestPath {
    fn unreachable() -> Self {
        Self {
            distance_km: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance_km.is_finite()
    }
}

/// Heap entry ordered as a min-heap on distance.
///
/// Ties break on the smaller node index so that equal-distance candidates
/// settle in a reproducible order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance: f64,
    node: usize,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap. Distances are finite
        // non-negative by construction, so partial_cmp cannot fail.
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `source` to `target` over `graph`.
pub fn shortest_path(graph: &Graph, source: LocationId, target: LocationId) -> ShortestPath {
    let (Some(source_ix), Some(target_ix)) = (graph.node(source), graph.node(target)) else {
        return ShortestPath::unreachable();
    };

    if source_ix == target_ix {
        return ShortestPath {
            distance_km: 0.0,
            path: vec![source],
        };
    }

    let mut distances = vec![f64::INFINITY; graph.len()];
    let mut previous = vec![usize::MAX; graph.len()];
    let mut settled = vec![false; graph.len()];
    let mut heap = BinaryHeap::new();

    distances[source_ix] = 0.0;
    heap.push(Candidate {
        distance: 0.0,
        node: source_ix,
    });

    while let Some(Candidate { distance, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == target_ix {
            break;
        }

        for &(neighbor, weight) in graph.neighbors(node) {
            let next = distance + weight;
            if next < distances[neighbor] {
                distances[neighbor] = next;
                previous[neighbor] = node;
                heap.push(Candidate {
                    distance: next,
                    node: neighbor,
                });
            }
        }
    }

    if !distances[target_ix].is_finite() {
        return ShortestPath::unreachable();
    }

    let mut path = Vec::new();
    let mut node = target_ix;
    loop {
        path.push(graph.location_id(node));
        if node == source_ix {
            break;
        }
        node = previous[node];
    }
    path.reverse();

    ShortestPath {
        distance_km: distances[target_ix],
        path,
    }
}
