// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Cost-based join-order optimization.
//!
//! Enumerates join orders for a query graph bottom up: singleton scans
//! are seeded into a plan table, then every connected subset of the
//! graph is split into connected bipartitions and the cheapest split is
//! kept.
//!
//! ## Architecture
//!
//! ```text
//! QueryGraph ──► AdjacencyMatrix ──► DpSubEnumerator
//!                                         │ every connected (L, R)
//!                                         ▼
//!                                    PlanTable::update
//!                                     │           │
//!                     CardinalityEstimator   CostFunction (C_out)
//! ```
//!
//! Cardinalities are injected from the outside (a JSON file mapping
//! relation sets to sizes), so plan quality is exactly reproducible.
//! The enumerator is a didactic DPsub: correct for every graph shape,
//! `O(3^n)` in the worst case, intended for the small `n` of hand-written
//! queries.

pub mod cardinality;
pub mod cost;
pub mod enumerate;
pub mod graph;
pub mod optimizer;
pub mod subproblem;
pub mod table;

#[cfg(test)]
mod cardinality_test;
#[cfg(test)]
mod subproblem_test;

// Re-export commonly used types
pub use cardinality::{CardinalityEstimator, DataModel, InjectionCardinalityEstimator};
pub use cost::{CostFunction, CoutCostFunction};
pub use enumerate::{DpSubEnumerator, PlanEnumerator};
pub use graph::{AdjacencyMatrix, QueryGraph};
pub use optimizer::Optimizer;
pub use subproblem::Subproblem;
pub use table::{PlanEntry, PlanTable};
