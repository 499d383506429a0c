//! Single-flight discipline and optimistic per-pair commits.

use std::sync::{Arc, Barrier};
use std::thread;

use dispatch_core::dispatch::DispatchEngine;
use dispatch_core::error::{DispatchError, MatchConflict};
use dispatch_core::model::{
    Location, LocationId, Path, RideId, RideRequest, RideStatus, Shuttle, ShuttleId, ShuttleStatus,
};
use dispatch_core::store::{FleetStore, InMemoryDispatchStore, NetworkSource};
use dispatch_core::test_helpers::{active_shuttle, line_network, pending_ride, store_with_network};

/// A store that serves a snapshot frozen at construction time but commits
/// against the live backing store — the other half of a race.
struct StaleSnapshotStore {
    rides: Vec<RideRequest>,
    shuttles: Vec<Shuttle>,
    backing: Arc<InMemoryDispatchStore>,
}

impl StaleSnapshotStore {
    fn freeze(backing: Arc<InMemoryDispatchStore>) -> Self {
        Self {
            rides: backing.pending_rides(),
            shuttles: backing.active_shuttles(),
            backing,
        }
    }
}

impl FleetStore for StaleSnapshotStore {
    fn pending_rides(&self) -> Vec<RideRequest> {
        self.rides.clone()
    }

    fn active_shuttles(&self) -> Vec<Shuttle> {
        self.shuttles.clone()
    }

    fn commit_match(
        &self,
        ride_id: RideId,
        shuttle_id: ShuttleId,
        route: (LocationId, LocationId),
    ) -> Result<(), MatchConflict> {
        self.backing.commit_match(ride_id, shuttle_id, route)
    }
}

fn seeded_backing() -> Arc<InMemoryDispatchStore> {
    let (locations, paths) = line_network(3);
    let store = store_with_network(locations, paths);
    store.add_ride(pending_ride(1, 1, 3));
    store.add_shuttle(active_shuttle(1, 2));
    Arc::new(store)
}

#[test]
fn losing_cycle_reports_the_conflict_and_mutates_nothing() {
    let backing = seeded_backing();
    let stale = StaleSnapshotStore::freeze(Arc::clone(&backing));

    // The winning cycle commits ride 1 to shuttle 1.
    let engine = DispatchEngine::default();
    let winner = engine.run_matching_cycle(&*backing, &*backing).unwrap();
    assert_eq!(winner.matches.len(), 1);

    // The losing cycle ran against the frozen snapshot and tries to commit
    // the same pair.
    let report = engine.run_matching_cycle(&*backing, &stale).unwrap();
    assert!(report.matches.is_empty());
    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.ride_id, RideId(1));
    assert_eq!(skipped.shuttle_id, ShuttleId(1));
    assert_eq!(
        skipped.conflict,
        MatchConflict::RideNotPending {
            ride: RideId(1),
            status: RideStatus::Matched,
        }
    );

    // Exactly one assignment exists; the loser changed nothing.
    let ride = backing.ride(RideId(1)).unwrap();
    assert_eq!(ride.status, RideStatus::Matched);
    assert_eq!(ride.assigned_shuttle, Some(ShuttleId(1)));
}

#[test]
fn shuttle_withdrawn_after_snapshot_leaves_the_ride_pending() {
    let backing = seeded_backing();
    let stale = StaleSnapshotStore::freeze(Arc::clone(&backing));

    // Fleet ops pull the shuttle into maintenance between snapshot and
    // commit.
    backing.add_shuttle(Shuttle {
        status: ShuttleStatus::Maintenance,
        ..backing.shuttle(ShuttleId(1)).unwrap()
    });

    let engine = DispatchEngine::default();
    let report = engine.run_matching_cycle(&*backing, &stale).unwrap();

    assert!(report.matches.is_empty());
    assert_eq!(
        report.skipped[0].conflict,
        MatchConflict::ShuttleNotActive {
            shuttle: ShuttleId(1),
            status: ShuttleStatus::Maintenance,
        }
    );
    assert_eq!(backing.ride(RideId(1)).unwrap().status, RideStatus::Pending);
}

#[test]
fn one_conflicting_pair_does_not_sink_the_batch() {
    let (locations, paths) = line_network(4);
    let store = store_with_network(locations, paths);
    store.add_ride(pending_ride(1, 1, 4));
    store.add_ride(pending_ride(2, 4, 1));
    store.add_shuttle(active_shuttle(1, 1));
    store.add_shuttle(active_shuttle(2, 4));
    let backing = Arc::new(store);
    let stale = StaleSnapshotStore::freeze(Arc::clone(&backing));

    // Ride 1 is cancelled after the snapshot was taken.
    backing.cancel_ride(RideId(1)).unwrap();

    let engine = DispatchEngine::default();
    let report = engine.run_matching_cycle(&*backing, &stale).unwrap();

    assert_eq!(report.assignment.len(), 2);
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].ride_id, RideId(2));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].ride_id, RideId(1));

    assert_eq!(backing.ride(RideId(2)).unwrap().status, RideStatus::Matched);
}

/// Blocks inside the snapshot read so a second cycle can be attempted while
/// the first is provably in flight.
struct BlockingStore {
    inner: Arc<InMemoryDispatchStore>,
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl NetworkSource for BlockingStore {
    fn locations(&self) -> Vec<Location> {
        self.inner.locations()
    }

    fn paths(&self) -> Vec<Path> {
        self.inner.paths()
    }
}

impl FleetStore for BlockingStore {
    fn pending_rides(&self) -> Vec<RideRequest> {
        self.entered.wait();
        self.release.wait();
        self.inner.pending_rides()
    }

    fn active_shuttles(&self) -> Vec<Shuttle> {
        self.inner.active_shuttles()
    }

    fn commit_match(
        &self,
        ride_id: RideId,
        shuttle_id: ShuttleId,
        route: (LocationId, LocationId),
    ) -> Result<(), MatchConflict> {
        self.inner.commit_match(ride_id, shuttle_id, route)
    }
}

#[test]
fn cycles_are_single_flight() {
    let backing = seeded_backing();
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let blocking = Arc::new(BlockingStore {
        inner: Arc::clone(&backing),
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    });

    let engine = Arc::new(DispatchEngine::default());
    let background = {
        let engine = Arc::clone(&engine);
        let blocking = Arc::clone(&blocking);
        thread::spawn(move || engine.run_matching_cycle(&*blocking, &*blocking))
    };

    // The background cycle holds the gate and is parked in pending_rides.
    entered.wait();
    assert_eq!(
        engine.run_matching_cycle(&*backing, &*backing),
        Err(DispatchError::CycleInFlight)
    );
    release.wait();

    let report = background.join().expect("cycle thread").unwrap();
    assert_eq!(report.matches.len(), 1);
}
