// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! ReedCore - storage layout, index, and join-order planning core.
//!
//! The engine-side building blocks of a relational database, as three
//! independent, purely in-memory subsystems:
//!
//! - **Layout synthesis**: translate a typed schema into a bit-precise
//!   physical layout tree (naive row, optimized row, and PAX)
//! - **B+-tree index**: a bulk-loaded, node-size-parameterised tree with
//!   ordered iteration, point lookup, range lookup, and duplicate-aware
//!   equal-range lookup
//! - **Plan enumeration**: a DPsub join-order enumerator driving a
//!   cost-based optimizer over injected cardinalities
//!
//! ## Quick Start
//!
//! ```rust
//! use reedcore::btree::BTree;
//!
//! let tree: BTree<i64, i64> = BTree::bulkload((0..1000).map(|k| (k, 2 * k + 13)));
//!
//! assert_eq!(tree.len(), 1000);
//! assert_eq!(tree.find(&42), Some((&42, &97)));
//! assert_eq!(tree.range(&10, &13).count(), 3);
//! ```
//!
//! ## Architecture
//!
//! ReedCore is organized into modules:
//!
//! - **schema**: physical type descriptors and table definitions
//! - **layout**: the layout tree and the three layout factories
//! - **btree**: the bulk-loaded B+-tree index
//! - **planner**: query graphs, plan table, and the DPsub enumerator
//! - **error**: structured error types for the crate's edges

pub mod btree;
pub mod error;
pub mod layout;
pub mod planner;
pub mod schema;


// Re-export commonly used types
pub use btree::BTree;
pub use error::{ReedError, ReedResult};
pub use layout::{
    DataLayout, LayoutFactory, NaiveRowLayoutFactory, OptimizedRowLayoutFactory, PaxLayoutFactory,
};
pub use planner::{
    CardinalityEstimator, CostFunction, CoutCostFunction, DpSubEnumerator,
    InjectionCardinalityEstimator, Optimizer, PlanEnumerator, PlanTable, QueryGraph, Subproblem,
};
pub use schema::{DataType, TableDef};
