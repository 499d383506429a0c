//! Collaborator contracts for the dispatch engine, plus an in-memory
//! implementation.
//!
//! The engine never talks to a database: it consumes snapshots through
//! [`NetworkSource`] and [`FleetStore`] and hands state changes back through
//! [`FleetStore::commit_match`]. The in-memory store is the reference
//! implementation used by the demo, the tests, and any embedding that keeps
//! its fleet in process.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::error::MatchConflict;
use crate::model::{
    Location, LocationId, Path, RideId, RideRequest, RideStatus, Shuttle, ShuttleId, ShuttleStatus,
};

/// Provider of the location/path snapshot for one cycle.
pub trait NetworkSource {
    fn locations(&self) -> Vec<Location>;
    fn paths(&self) -> Vec<Path>;
}

/// Store of rides and shuttles, with the per-pair optimistic commit.
pub trait FleetStore {
    /// All rides currently in `Pending` state.
    fn pending_rides(&self) -> Vec<RideRequest>;

    /// All shuttles currently in `Active` state.
    fn active_shuttles(&self) -> Vec<Shuttle>;

    /// Commit one assignment: ride → `Matched` with the shuttle attached,
    /// shuttle → `Assigned` with `route` (pickup → dropoff).
    ///
    /// Re-validates immediately before mutating that the ride is still
    /// `Pending` and the shuttle still `Active`; a conflict fails this pair
    /// only, never the batch. Committing is idempotent per pair: a second
    /// identical commit conflicts on the already-changed states.
    fn commit_match(
        &self,
        ride_id: RideId,
        shuttle_id: ShuttleId,
        route: (LocationId, LocationId),
    ) -> Result<(), MatchConflict>;
}

/// A ride lifecycle transition the store refuses to make.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("ride {0} does not exist")]
    UnknownRide(RideId),

    #[error("ride {ride} is {status:?}; transition not allowed")]
    InvalidTransition { ride: RideId, status: RideStatus },
}

#[derive(Debug, Default)]
struct StoreInner {
    locations: BTreeMap<LocationId, Location>,
    paths: Vec<Path>,
    rides: BTreeMap<RideId, RideRequest>,
    shuttles: BTreeMap<ShuttleId, Shuttle>,
}

/// Thread-safe in-memory implementation of both collaborator contracts.
///
/// Snapshot getters return id-ordered clones, so cost matrices built from
/// them are deterministic.
#[derive(Debug, Default)]
pub struct InMemoryDispatchStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryDispatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned lock only means another thread panicked mid-update;
        // the map structure itself is still valid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_location(&self, location: Location) {
        self.lock().locations.insert(location.id, location);
    }

    /// Register a path. Endpoints are not validated here; the graph builder
    /// skips paths whose endpoints are missing from the snapshot.
    pub fn add_path(&self, path: Path) {
        self.lock().paths.push(path);
    }

    pub fn add_ride(&self, ride: RideRequest) {
        self.lock().rides.insert(ride.id, ride);
    }

    pub fn add_shuttle(&self, shuttle: Shuttle) {
        self.lock().shuttles.insert(shuttle.id, shuttle);
    }

    pub fn ride(&self, id: RideId) -> Option<RideRequest> {
        self.lock().rides.get(&id).cloned()
    }

    pub fn shuttle(&self, id: ShuttleId) -> Option<Shuttle> {
        self.lock().shuttles.get(&id).cloned()
    }

    /// Cancel a pending ride.
    pub fn cancel_ride(&self, id: RideId) -> Result<(), LifecycleError> {
        let mut inner = self.lock();
        let ride = inner
            .rides
            .get_mut(&id)
            .ok_or(LifecycleError::UnknownRide(id))?;
        if ride.status != RideStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                ride: id,
                status: ride.status,
            });
        }
        ride.status = RideStatus::Cancelled;
        Ok(())
    }

    /// Complete a matched ride and release its shuttle back to `Active`.
    pub fn complete_ride(&self, id: RideId) -> Result<(), LifecycleError> {
        let mut inner = self.lock();
        let ride = inner
            .rides
            .get_mut(&id)
            .ok_or(LifecycleError::UnknownRide(id))?;
        if ride.status != RideStatus::Matched {
            return Err(LifecycleError::InvalidTransition {
                ride: id,
                status: ride.status,
            });
        }
        ride.status = RideStatus::Completed;
        let shuttle_id = ride.assigned_shuttle.take();

        if let Some(shuttle_id) = shuttle_id {
            if let Some(shuttle) = inner.shuttles.get_mut(&shuttle_id) {
                shuttle.status = ShuttleStatus::Active;
                shuttle.route = None;
            }
        }
        Ok(())
    }
}

impl NetworkSource for InMemoryDispatchStore {
    fn locations(&self) -> Vec<Location> {
        self.lock().locations.values().cloned().collect()
    }

    fn paths(&self) -> Vec<Path> {
        self.lock().paths.clone()
    }
}

impl FleetStore for InMemoryDispatchStore {
    fn pending_rides(&self) -> Vec<RideRequest> {
        self.lock()
            .rides
            .values()
            .filter(|ride| ride.is_pending())
            .cloned()
            .collect()
    }

    fn active_shuttles(&self) -> Vec<Shuttle> {
        self.lock()
            .shuttles
            .values()
            .filter(|shuttle| shuttle.is_active())
            .cloned()
            .collect()
    }

    fn commit_match(
        &self,
        ride_id: RideId,
        shuttle_id: ShuttleId,
        route: (LocationId, LocationId),
    ) -> Result<(), MatchConflict> {
        let mut inner = self.lock();

        let ride = inner
            .rides
            .get(&ride_id)
            .ok_or(MatchConflict::UnknownRide(ride_id))?;
        if ride.status != RideStatus::Pending {
            return Err(MatchConflict::RideNotPending {
                ride: ride_id,
                status: ride.status,
            });
        }

        let shuttle = inner
            .shuttles
            .get(&shuttle_id)
            .ok_or(MatchConflict::UnknownShuttle(shuttle_id))?;
        if shuttle.status != ShuttleStatus::Active {
            return Err(MatchConflict::ShuttleNotActive {
                shuttle: shuttle_id,
                status: shuttle.status,
            });
        }

        // Both checks passed under the same lock; apply the pair.
        if let Some(ride) = inner.rides.get_mut(&ride_id) {
            ride.status = RideStatus::Matched;
            ride.assigned_shuttle = Some(shuttle_id);
        }
        if let Some(shuttle) = inner.shuttles.get_mut(&shuttle_id) {
            shuttle.status = ShuttleStatus::Assigned;
            shuttle.route = Some(route);
        }
        Ok(())
    }
}
