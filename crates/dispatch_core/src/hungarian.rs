//! Kuhn–Munkres (Hungarian) minimum-cost assignment solver.
//!
//! O(n³) primal–dual formulation: row potentials `u`, column potentials `v`,
//! a column→row assignment `p`, and one shortest-augmenting-path search per
//! row over the reduced costs `cost[i][j] - u[i] - v[j]`. Each search grows
//! an alternating tree, lowers potentials by the minimal slack among
//! unvisited columns, and augments once it reaches a free column.
//!
//! The solver requires every entry to be finite: unreachable pairs and
//! padding cells must already carry the finite sentinel
//! ([`crate::matrix::UNREACHABLE_COST_KM`]).

use serde::Serialize;

use crate::error::DispatchError;
use crate::matrix::CostMatrix;

/// One row↔column pairing of the solved matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AssignmentPair {
    pub row: usize,
    pub col: usize,
    pub cost: f64,
}

/// A minimum-total-cost perfect matching on a square matrix.
///
/// Contains all `n` pairs, including any that involve padding rows or
/// columns; filtering those out is the orchestrator's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// All pairs, sorted by row.
    pub pairs: Vec<AssignmentPair>,
    pub total_cost: f64,
}

/// Solve the assignment problem for a square, fully finite cost matrix.
///
/// Returns a perfect matching of minimum total cost — optimal, not merely
/// feasible. Rejects non-square input and non-finite entries (the latter
/// always indicates a matrix-builder defect, not caller input).
pub fn solve(matrix: &CostMatrix) -> Result<Assignment, DispatchError> {
    if !matrix.is_square() {
        return Err(DispatchError::InvalidCostMatrix {
            rows: matrix.rows(),
            cols: matrix.cols(),
        });
    }
    let n = matrix.rows();

    for row in 0..n {
        for col in 0..n {
            if !matrix.at(row, col).is_finite() {
                return Err(DispatchError::NonFiniteCost { row, col });
            }
        }
    }

    if n == 0 {
        return Ok(Assignment {
            pairs: Vec::new(),
            total_cost: 0.0,
        });
    }

    // 1-based arrays; index 0 is the virtual root of the alternating tree.
    // p[j] is the row currently assigned to column j, 0 = free.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        // Shortest augmenting path from row i: stops at the first free
        // column. A free column always exists, and every entry is finite,
        // so delta is always found.
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = matrix.at(i0 - 1, j - 1) - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Augment along the discovered path back to the root.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut pairs: Vec<AssignmentPair> = (1..=n)
        .map(|j| AssignmentPair {
            row: p[j] - 1,
            col: j - 1,
            cost: matrix.at(p[j] - 1, j - 1),
        })
        .collect();
    pairs.sort_by_key(|pair| pair.row);
    let total_cost = pairs.iter().map(|pair| pair.cost).sum();

    Ok(Assignment { pairs, total_cost })
}
