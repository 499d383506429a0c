//! Cost matrix construction for one matching cycle.
//!
//! For ride `i` and shuttle `j` the cost is the shortest-path distance from
//! the shuttle's current location to the ride's pickup, computed against the
//! single graph shared by the whole cycle. Unreachable pairs are replaced by
//! a large finite sentinel: the assignment solver's arithmetic (potentials,
//! reduced costs) is undefined over true infinities, so "unreachable" is
//! represented as cost-dominated-but-finite instead.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use tracing::debug;

use crate::error::DispatchError;
use crate::graph::Graph;
use crate::model::{LocationId, RideRequest, Shuttle};
use crate::shortest_path::shortest_path;

/// Sentinel cost for unreachable pairs and padding cells, in kilometers.
///
/// Must dominate any real achievable distance (Earth's circumference is
/// ~4e4 km) while staying small enough that sums of a full assignment stay
/// well inside f64 integer precision. Tunable via
/// [`crate::dispatch::DispatchConfig`].
pub const UNREACHABLE_COST_KM: f64 = 1.0e9;

/// Distance cache entries kept per matrix build.
const DISTANCE_CACHE_SIZE: usize = 10_000;

/// Rectangular, row-major cost table indexed by `(ride, shuttle)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl CostMatrix {
    /// Build a matrix from nested rows. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let row_count = rows.len();
        let col_count = rows.first().map_or(0, |r| r.len());
        let mut values = Vec::with_capacity(row_count * col_count);
        for row in rows {
            debug_assert_eq!(row.len(), col_count);
            values.extend(row);
        }
        Self {
            rows: row_count,
            cols: col_count,
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// The matrix as nested rows, for labeled reporting.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    /// Pad to `max(rows, cols) x max(rows, cols)` with `fill` cells.
    ///
    /// The assignment solver operates only on square matrices; dummy rows
    /// or columns simulate unmatched entities and are discarded after the
    /// solve. Already-square matrices are returned unchanged.
    pub fn pad_to_square(&self, fill: f64) -> CostMatrix {
        if self.is_square() {
            return self.clone();
        }
        let size = self.rows.max(self.cols);
        let mut values = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                if row < self.rows && col < self.cols {
                    values.push(self.at(row, col));
                } else {
                    values.push(fill);
                }
            }
        }
        CostMatrix {
            rows: size,
            cols: size,
            values,
        }
    }
}

/// Shortest-path distance cache for one matrix build.
///
/// The graph is undirected, so distances are symmetric and the cache is
/// keyed with the smaller id first to double the hit rate. Cycle-scoped:
/// distances are only valid against the graph they were computed on.
struct DistanceCache {
    cache: Mutex<LruCache<(LocationId, LocationId), f64>>,
}

impl DistanceCache {
    fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(DISTANCE_CACHE_SIZE).expect("cache size must be non-zero"),
            )),
        }
    }

    fn distance_km(&self, graph: &Graph, from: LocationId, to: LocationId) -> f64 {
        let key = if from < to { (from, to) } else { (to, from) };
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(_) => return shortest_path(graph, from, to).distance_km,
        };
        *cache.get_or_insert(key, || shortest_path(graph, from, to).distance_km)
    }
}

/// Build the `rides x shuttles` cost matrix for one cycle.
///
/// `cost[i][j]` is the distance shuttle `j` travels to reach ride `i`'s
/// pickup. Pairs with no route between them (or with a location missing
/// from the graph) get `unreachable_cost`. Fails if either dimension would
/// be zero.
///
/// The pairwise queries are mutually independent reads of the shared graph,
/// so rows are computed in parallel when the `parallel` feature is on.
pub fn build_cost_matrix(
    graph: &Graph,
    rides: &[RideRequest],
    shuttles: &[Shuttle],
    unreachable_cost: f64,
) -> Result<CostMatrix, DispatchError> {
    if rides.is_empty() || shuttles.is_empty() {
        return Err(DispatchError::EmptyMatchPool {
            rides: rides.len(),
            shuttles: shuttles.len(),
        });
    }

    let cache = DistanceCache::new();
    let cost_row = |ride: &RideRequest| -> Vec<f64> {
        shuttles
            .iter()
            .map(|shuttle| {
                let distance = cache.distance_km(graph, shuttle.current_location, ride.source);
                if distance.is_finite() {
                    distance
                } else {
                    unreachable_cost
                }
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<f64>> = {
        use rayon::prelude::*;
        rides.par_iter().map(cost_row).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<f64>> = rides.iter().map(cost_row).collect();

    debug!(
        rides = rides.len(),
        shuttles = shuttles.len(),
        "built cost matrix"
    );

    Ok(CostMatrix::from_rows(rows))
}
