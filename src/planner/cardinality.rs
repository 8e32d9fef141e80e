// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Cardinality estimation with injected sizes.
//!
//! The optimizer never looks at data; it asks a [`CardinalityEstimator`]
//! for the size of every scan and join result. The shipped estimator
//! reads those sizes from a JSON file keyed by relation sets:
//!
//! ```json
//! {
//!   "test": [
//!     { "relations": ["T0"], "size": 5 },
//!     { "relations": ["T0", "T1"], "size": 90 }
//!   ]
//! }
//! ```
//!
//! Injected sizes make planner behaviour exactly reproducible, which is
//! what both the tests and the CLI rely on.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::{ReedError, ReedResult};
use crate::planner::graph::QueryGraph;
use crate::planner::subproblem::Subproblem;

/// Opaque data model threaded through the plan table: which sources a
/// plan covers and the estimated cardinality of its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModel {
    /// The sources covered by the plan.
    pub subproblem: Subproblem,

    /// Estimated number of result tuples.
    pub cardinality: u64,
}

/// Estimates result sizes for scans and joins.
pub trait CardinalityEstimator {
    /// Model for scanning the sources in `s`.
    fn estimate_scan(&self, graph: &QueryGraph, s: Subproblem) -> DataModel;

    /// Model for joining two plans.
    fn estimate_join(&self, graph: &QueryGraph, left: &DataModel, right: &DataModel)
        -> DataModel;

    /// Cardinality predicted by a model.
    fn predict_cardinality(&self, model: &DataModel) -> u64 {
        model.cardinality
    }
}

/// Estimator answering from an injected table of relation-set sizes.
///
/// Lookups miss when the injection file has no entry for a relation
/// set; a missing scan falls back to 1 tuple and a missing join to the
/// Cartesian product of its operands.
#[derive(Debug, Clone)]
pub struct InjectionCardinalityEstimator {
    sizes: HashMap<BTreeSet<String>, u64>,
}

#[derive(Debug, Deserialize)]
struct InjectedCardinality {
    relations: Vec<String>,
    size: u64,
}

impl InjectionCardinalityEstimator {
    /// Parse the injection table for database `db_name` from JSON text.
    pub fn from_json(db_name: &str, json: &str) -> ReedResult<Self> {
        let mut databases: HashMap<String, Vec<InjectedCardinality>> =
            serde_json::from_str(json).map_err(|e| ReedError::DeserializationError {
                reason: e.to_string(),
            })?;
        let entries = databases
            .remove(db_name)
            .ok_or_else(|| ReedError::DeserializationError {
                reason: format!("no cardinalities for database '{}'", db_name),
            })?;

        let mut sizes = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key: BTreeSet<String> = entry.relations.into_iter().collect();
            sizes.insert(key, entry.size);
        }
        Ok(InjectionCardinalityEstimator { sizes })
    }

    /// Load the injection table for database `db_name` from a file.
    pub fn from_file<P: AsRef<Path>>(db_name: &str, path: P) -> ReedResult<Self> {
        let json = std::fs::read_to_string(&path).map_err(|e| ReedError::IoError {
            operation: "load_cardinalities".to_string(),
            reason: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_json(db_name, &json)
    }

    fn lookup(&self, names: &BTreeSet<String>) -> Option<u64> {
        self.sizes.get(names).copied()
    }
}

impl CardinalityEstimator for InjectionCardinalityEstimator {
    fn estimate_scan(&self, graph: &QueryGraph, s: Subproblem) -> DataModel {
        let cardinality = self.lookup(&graph.relation_names(s)).unwrap_or(1);
        DataModel {
            subproblem: s,
            cardinality,
        }
    }

    fn estimate_join(
        &self,
        graph: &QueryGraph,
        left: &DataModel,
        right: &DataModel,
    ) -> DataModel {
        let subproblem = left.subproblem | right.subproblem;
        let cardinality = self
            .lookup(&graph.relation_names(subproblem))
            .unwrap_or_else(|| left.cardinality.saturating_mul(right.cardinality));
        DataModel {
            subproblem,
            cardinality,
        }
    }
}
