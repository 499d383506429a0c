pub mod dispatch;
pub mod error;
pub mod geo;
pub mod graph;
pub mod hungarian;
pub mod matrix;
pub mod model;
pub mod shortest_path;
pub mod store;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use dispatch::{DispatchConfig, DispatchEngine, MatchingReport};
pub use error::{DispatchError, MatchConflict};
pub use graph::Graph;
pub use hungarian::{Assignment, AssignmentPair};
pub use matrix::{build_cost_matrix, CostMatrix, UNREACHABLE_COST_KM};
pub use model::{
    Location, LocationId, LocationKind, Path, RideId, RideRequest, RideStatus, Shuttle, ShuttleId,
    ShuttleStatus, UserId,
};
pub use shortest_path::{shortest_path, ShortestPath};
pub use store::{FleetStore, InMemoryDispatchStore, NetworkSource};
