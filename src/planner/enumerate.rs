// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! DPsub plan enumeration.
//!
//! Dynamic programming over connected subsets of the query graph:
//! subsets are enumerated as ascending integers, so every proper subset
//! is priced before any superset that contains it. For each connected
//! subset the enumerator tries every connected bipartition `(L, R)` and
//! lets the plan table keep the cheapest.
//!
//! ## Algorithm
//!
//! ```text
//! for plan_size in 2..=n:
//!     for S ⊆ sources, |S| >= plan_size, S connected (ascending):
//!         seen := ∅
//!         for L ⊊ S, L non-empty, L connected, L ∉ seen (ascending):
//!             R := S \ L
//!             if R connected:
//!                 seen := seen ∪ {R}        // (R, L) mirrors (L, R)
//!                 table.update(L, R)
//! ```
//!
//! ## Complexity
//!
//! Worst case `O(3^n)` subset pairs (a clique); chains and stars visit
//! far fewer because disconnected candidates are dropped early.

use std::collections::HashSet;

use crate::planner::cardinality::CardinalityEstimator;
use crate::planner::cost::CostFunction;
use crate::planner::graph::{AdjacencyMatrix, QueryGraph};
use crate::planner::subproblem::Subproblem;
use crate::planner::table::PlanTable;

/// Fills a plan table with the cheapest join order for every connected
/// subset of a query graph.
pub trait PlanEnumerator {
    /// Enumerate join orders for `graph` into `table`.
    ///
    /// `table` must hold a seeded scan entry for every singleton.
    fn enumerate(
        &self,
        table: &mut PlanTable,
        graph: &QueryGraph,
        estimator: &dyn CardinalityEstimator,
        cost_function: &dyn CostFunction,
    );
}

/// The DPsub enumerator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DpSubEnumerator;

/// All connected subsets of at least `min_size` sources, ascending by
/// bitset value.
fn connected_subsets(
    n: usize,
    min_size: usize,
    matrix: &AdjacencyMatrix,
) -> Vec<Subproblem> {
    assert!(n < 64, "subset enumeration is limited to 63 sources");
    let mut subsets = Vec::new();
    for bits in 1..(1u64 << n) {
        let s = Subproblem::from_bits(bits);
        if s.size() >= min_size && matrix.is_connected(s) {
            subsets.push(s);
        }
    }
    subsets
}

/// All connected non-empty proper subsets of `s`, ascending by bitset
/// value.
fn connected_proper_subsets(s: Subproblem, matrix: &AdjacencyMatrix) -> Vec<Subproblem> {
    let mut subsets = Vec::new();
    for bits in 1..s.bits() {
        let candidate = Subproblem::from_bits(bits);
        if candidate.is_subset(s) && matrix.is_connected(candidate) {
            subsets.push(candidate);
        }
    }
    subsets
}

impl PlanEnumerator for DpSubEnumerator {
    fn enumerate(
        &self,
        table: &mut PlanTable,
        graph: &QueryGraph,
        estimator: &dyn CardinalityEstimator,
        cost_function: &dyn CostFunction,
    ) {
        let n = graph.num_sources();
        if n < 2 {
            // Nothing to join; seeded singletons stay untouched.
            return;
        }
        let matrix = graph.adjacency_matrix();

        for plan_size in 2..=n {
            for s in connected_subsets(n, plan_size, matrix) {
                // Complements already joined from the other side.
                let mut seen: HashSet<Subproblem> = HashSet::new();
                for left in connected_proper_subsets(s, matrix) {
                    if seen.contains(&left) {
                        continue;
                    }
                    let right = s.minus(left);
                    if matrix.is_connected(right) {
                        seen.insert(right);
                        table.update(graph, estimator, cost_function, left, right);
                    }
                }
            }
        }
    }
}
