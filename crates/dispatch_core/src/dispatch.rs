//! Matching-cycle orchestrator.
//!
//! One cycle: snapshot pending rides and active shuttles, build the graph
//! once, derive the cost matrix, pad it square, run the assignment solver,
//! drop padding artifacts, and commit the surviving pairs with a per-pair
//! optimistic re-check.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, MatchConflict};
use crate::graph::Graph;
use crate::hungarian::{self, AssignmentPair};
use crate::matrix::{build_cost_matrix, UNREACHABLE_COST_KM};
use crate::model::{LocationId, RideId, ShuttleId};
use crate::store::{FleetStore, NetworkSource};

/// Tunables for the dispatch engine.
#[derive(Debug, Clone, Copy)]
pub struct DispatchConfig {
    /// Finite stand-in cost for unreachable pairs and padding cells, in
    /// kilometers. Must dominate any real achievable distance.
    pub unreachable_cost: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            unreachable_cost: UNREACHABLE_COST_KM,
        }
    }
}

/// A committed ride↔shuttle pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedPair {
    pub ride_id: RideId,
    pub shuttle_id: ShuttleId,
    pub shuttle_number: String,
    /// Pickup distance for the shuttle, from the unpadded cost matrix.
    pub cost: f64,
}

/// A pairing the solver chose but the commit re-check rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPair {
    pub ride_id: RideId,
    pub shuttle_id: ShuttleId,
    pub conflict: MatchConflict,
}

/// Row label of the observability matrix: one pending ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideLabel {
    pub index: usize,
    pub ride_id: RideId,
    pub source: String,
    pub destination: String,
}

/// Column label of the observability matrix: one active shuttle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShuttleLabel {
    pub index: usize,
    pub shuttle_id: ShuttleId,
    pub shuttle_number: String,
    pub current_location: String,
}

/// The unpadded cost matrix with human-readable row/column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCostMatrix {
    pub values: Vec<Vec<f64>>,
    pub ride_labels: Vec<RideLabel>,
    pub shuttle_labels: Vec<ShuttleLabel>,
}

/// Everything one matching cycle produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchingReport {
    /// Successfully committed pairs.
    pub matches: Vec<MatchedPair>,
    /// Pairs dropped by the per-pair optimistic re-check.
    pub skipped: Vec<SkippedPair>,
    /// Index-level assignment on the unpadded dimensions.
    pub assignment: Vec<AssignmentPair>,
    pub cost_matrix: LabeledCostMatrix,
}

/// The dispatch engine. Matching cycles are single-flight: a cycle started
/// while another is in flight fails with [`DispatchError::CycleInFlight`]
/// instead of racing it over the same pending/active sets.
#[derive(Debug, Default)]
pub struct DispatchEngine {
    config: DispatchConfig,
    cycle_gate: Mutex<()>,
}

impl DispatchEngine {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            cycle_gate: Mutex::new(()),
        }
    }

    /// Run one matching cycle over the current snapshot.
    ///
    /// Commits are per-pair: a [`MatchConflict`] drops that pair into
    /// `skipped` and the rest of the batch still commits. Nothing already
    /// committed is rolled back.
    pub fn run_matching_cycle<N, S>(
        &self,
        network: &N,
        store: &S,
    ) -> Result<MatchingReport, DispatchError>
    where
        N: NetworkSource,
        S: FleetStore,
    {
        let Ok(_gate) = self.cycle_gate.try_lock() else {
            return Err(DispatchError::CycleInFlight);
        };

        let rides = store.pending_rides();
        let shuttles = store.active_shuttles();
        if rides.is_empty() || shuttles.is_empty() {
            return Err(DispatchError::NoWork);
        }
        debug!(
            rides = rides.len(),
            shuttles = shuttles.len(),
            "starting matching cycle"
        );

        // One graph per cycle, shared read-only by every shortest-path
        // query. All pairwise costs must see the same snapshot.
        let locations = network.locations();
        let graph = Graph::build(&locations, &network.paths());

        let cost_matrix =
            build_cost_matrix(&graph, &rides, &shuttles, self.config.unreachable_cost)?;
        let padded = cost_matrix.pad_to_square(self.config.unreachable_cost);
        let solved = hungarian::solve(&padded)?;

        // Pairs beyond the original dimensions pair a real entity with a
        // dummy counterpart; discard them.
        let assignment: Vec<AssignmentPair> = solved
            .pairs
            .into_iter()
            .filter(|pair| pair.row < rides.len() && pair.col < shuttles.len())
            .map(|pair| AssignmentPair {
                cost: cost_matrix.at(pair.row, pair.col),
                ..pair
            })
            .collect();

        let mut matches = Vec::new();
        let mut skipped = Vec::new();
        for pair in &assignment {
            let ride = &rides[pair.row];
            let shuttle = &shuttles[pair.col];
            match store.commit_match(ride.id, shuttle.id, (ride.source, ride.destination)) {
                Ok(()) => matches.push(MatchedPair {
                    ride_id: ride.id,
                    shuttle_id: shuttle.id,
                    shuttle_number: shuttle.number.clone(),
                    cost: pair.cost,
                }),
                Err(conflict) => {
                    warn!(
                        ride = %ride.id,
                        shuttle = %shuttle.id,
                        %conflict,
                        "assignment lost its optimistic re-check, skipping pair"
                    );
                    skipped.push(SkippedPair {
                        ride_id: ride.id,
                        shuttle_id: shuttle.id,
                        conflict,
                    });
                }
            }
        }

        let location_names: HashMap<LocationId, &str> = locations
            .iter()
            .map(|location| (location.id, location.name.as_str()))
            .collect();
        let name_of = |id: LocationId| -> String {
            location_names
                .get(&id)
                .map_or_else(|| id.to_string(), |name| (*name).to_string())
        };

        let cost_matrix = LabeledCostMatrix {
            values: cost_matrix.to_rows(),
            ride_labels: rides
                .iter()
                .enumerate()
                .map(|(index, ride)| RideLabel {
                    index,
                    ride_id: ride.id,
                    source: name_of(ride.source),
                    destination: name_of(ride.destination),
                })
                .collect(),
            shuttle_labels: shuttles
                .iter()
                .enumerate()
                .map(|(index, shuttle)| ShuttleLabel {
                    index,
                    shuttle_id: shuttle.id,
                    shuttle_number: shuttle.number.clone(),
                    current_location: name_of(shuttle.current_location),
                })
                .collect(),
        };

        info!(
            matched = matches.len(),
            skipped = skipped.len(),
            "matching cycle finished"
        );

        Ok(MatchingReport {
            matches,
            skipped,
            assignment,
            cost_matrix,
        })
    }
}
