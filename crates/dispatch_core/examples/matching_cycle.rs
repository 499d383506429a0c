//! Run one matching cycle over a small campus network and print the result.
//!
//! Run with: cargo run -p dispatch_core --example matching_cycle

use dispatch_core::dispatch::DispatchEngine;
use dispatch_core::test_helpers::{
    active_shuttle, path, pending_ride, stop, store_with_network, waypoint,
};

fn main() {
    // A toy campus: four stops around a central junction.
    let locations = vec![
        stop(1, "Main Gate", 26.512, 80.233),
        stop(2, "Library", 26.515, 80.235),
        stop(3, "Hostel Block", 26.519, 80.231),
        stop(4, "Lecture Halls", 26.517, 80.239),
        waypoint(5, "Central Junction", 26.516, 80.234),
    ];
    let paths = vec![
        path(1, 5),
        path(2, 5),
        path(3, 5),
        path(4, 5),
        path(1, 2),
        path(3, 4),
    ];

    let store = store_with_network(locations, paths);
    store.add_ride(pending_ride(1, 1, 3)); // Main Gate -> Hostel Block
    store.add_ride(pending_ride(2, 4, 1)); // Lecture Halls -> Main Gate
    store.add_ride(pending_ride(3, 2, 4)); // Library -> Lecture Halls
    store.add_shuttle(active_shuttle(1, 2));
    store.add_shuttle(active_shuttle(2, 3));

    let engine = DispatchEngine::default();
    let report = match engine.run_matching_cycle(&store, &store) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("matching cycle failed: {err}");
            return;
        }
    };

    println!(
        "--- Matching cycle: {} matches, {} skipped ---",
        report.matches.len(),
        report.skipped.len()
    );
    for m in &report.matches {
        println!(
            "  ride {} <- shuttle {} ({}) at {:.3} km",
            m.ride_id, m.shuttle_id, m.shuttle_number, m.cost
        );
    }

    println!("\nCost matrix:");
    match serde_json::to_string_pretty(&report.cost_matrix) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize cost matrix: {err}"),
    }
}
