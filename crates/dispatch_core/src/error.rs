//! Error taxonomy for the dispatch engine.

use serde::Serialize;
use thiserror::Error;

use crate::model::{RideId, RideStatus, ShuttleId, ShuttleStatus};

/// Failures that abort a matching cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No pending rides or no active shuttles; there is nothing to match.
    #[error("no pending rides or active shuttles to match")]
    NoWork,

    /// The cost matrix would have zero rows or columns.
    #[error("cost matrix would be degenerate ({rides} rides x {shuttles} shuttles)")]
    EmptyMatchPool { rides: usize, shuttles: usize },

    /// A non-square matrix reached the assignment solver.
    #[error("assignment solver requires a square matrix, got {rows}x{cols}")]
    InvalidCostMatrix { rows: usize, cols: usize },

    /// A non-finite value reached the assignment solver. Unreachable pairs
    /// must have been replaced by the finite sentinel before solving, so
    /// this is a builder defect, not caller input.
    #[error("cost matrix contains a non-finite value at ({row}, {col})")]
    NonFiniteCost { row: usize, col: usize },

    /// A matching cycle is already in flight; cycles are single-flight.
    #[error("a matching cycle is already in flight")]
    CycleInFlight,
}

/// Per-pair optimistic-check failure during commit.
///
/// The entity changed state between the snapshot and the commit. The
/// orchestrator drops the pair and keeps committing the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum MatchConflict {
    #[error("ride {0} no longer exists")]
    UnknownRide(RideId),

    #[error("shuttle {0} no longer exists")]
    UnknownShuttle(ShuttleId),

    #[error("ride {ride} is {status:?}, expected Pending")]
    RideNotPending { ride: RideId, status: RideStatus },

    #[error("shuttle {shuttle} is {status:?}, expected Active")]
    ShuttleNotActive {
        shuttle: ShuttleId,
        status: ShuttleStatus,
    },
}
