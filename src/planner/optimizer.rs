// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Optimization driver: seed base cases, enumerate, return the table.

use crate::planner::cardinality::CardinalityEstimator;
use crate::planner::cost::CostFunction;
use crate::planner::enumerate::PlanEnumerator;
use crate::planner::graph::QueryGraph;
use crate::planner::subproblem::Subproblem;
use crate::planner::table::PlanTable;

/// Runs a plan enumerator against a cost function.
///
/// ## Example Usage
///
/// ```rust
/// use reedcore::planner::{
///     CoutCostFunction, DpSubEnumerator, InjectionCardinalityEstimator, Optimizer, QueryGraph,
/// };
///
/// let mut graph = QueryGraph::new(vec!["T0".into(), "T1".into()])?;
/// graph.add_join(0, 1)?;
///
/// let estimator = InjectionCardinalityEstimator::from_json(
///     "test",
///     r#"{ "test": [
///         { "relations": ["T0"], "size": 10 },
///         { "relations": ["T1"], "size": 5 },
///         { "relations": ["T0", "T1"], "size": 20 }
///     ] }"#,
/// )?;
///
/// let optimizer = Optimizer::new(DpSubEnumerator, CoutCostFunction);
/// let table = optimizer.optimize(&graph, &estimator);
/// assert_eq!(table.final_entry().unwrap().cost, 20);
/// # Ok::<(), reedcore::ReedError>(())
/// ```
pub struct Optimizer<E, C> {
    enumerator: E,
    cost_function: C,
}

impl<E: PlanEnumerator, C: CostFunction> Optimizer<E, C> {
    /// Pair an enumerator with a cost function.
    pub fn new(enumerator: E, cost_function: C) -> Self {
        Optimizer {
            enumerator,
            cost_function,
        }
    }

    /// Optimize `graph`: seed a scan for every singleton, then fill the
    /// plan table with the cheapest join order of every connected
    /// subset. An empty graph yields an empty table.
    pub fn optimize(
        &self,
        graph: &QueryGraph,
        estimator: &dyn CardinalityEstimator,
    ) -> PlanTable {
        let mut table = PlanTable::new(graph.num_sources());
        for id in 0..graph.num_sources() {
            let s = Subproblem::singleton(id);
            table.seed_scan(s, estimator.estimate_scan(graph, s));
        }
        self.enumerator
            .enumerate(&mut table, graph, estimator, &self.cost_function);
        table
    }
}
