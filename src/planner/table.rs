// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Plan table: the cheapest plan found for each subset of sources.
//!
//! Sparse storage: only subsets actually reached by the enumerator hold
//! an entry, so the table size follows the number of connected subsets
//! rather than `2^n`.

use std::collections::HashMap;

use crate::planner::cardinality::{CardinalityEstimator, DataModel};
use crate::planner::cost::CostFunction;
use crate::planner::graph::QueryGraph;
use crate::planner::subproblem::Subproblem;

/// The best plan known for one subset of sources.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    /// Left operand of the cheapest join; empty for scans.
    pub left: Subproblem,

    /// Right operand of the cheapest join; empty for scans.
    pub right: Subproblem,

    /// Model of the plan's result.
    pub model: DataModel,

    /// Accumulated cost of the plan.
    pub cost: u64,
}

impl PlanEntry {
    /// Check if this entry is a base-case scan.
    pub fn is_scan(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// Maps each non-empty subset of sources to its cheapest known plan.
#[derive(Debug, Clone)]
pub struct PlanTable {
    entries: HashMap<Subproblem, PlanEntry>,
    num_sources: usize,
}

impl PlanTable {
    /// Empty table for a graph of `num_sources` sources.
    pub fn new(num_sources: usize) -> Self {
        PlanTable {
            entries: HashMap::new(),
            num_sources,
        }
    }

    /// Number of sources the table was sized for.
    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    /// Number of subsets holding an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table holds no entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the subset `s` holds an entry.
    pub fn contains(&self, s: Subproblem) -> bool {
        self.entries.contains_key(&s)
    }

    /// The entry for the subset `s`, if any.
    pub fn entry(&self, s: Subproblem) -> Option<&PlanEntry> {
        self.entries.get(&s)
    }

    /// Seed the base case for a singleton: a scan of cost 0.
    pub fn seed_scan(&mut self, s: Subproblem, model: DataModel) {
        assert!(s.size() == 1, "only singletons are seeded as scans");
        self.entries.insert(
            s,
            PlanEntry {
                left: Subproblem::EMPTY,
                right: Subproblem::EMPTY,
                model,
                cost: 0,
            },
        );
    }

    /// Price the join of `left` and `right` and keep it if it beats the
    /// current entry for their union.
    ///
    /// Both operands must already hold entries; the enumerator
    /// guarantees that by visiting subsets in ascending size order.
    pub fn update(
        &mut self,
        graph: &QueryGraph,
        estimator: &dyn CardinalityEstimator,
        cost_function: &dyn CostFunction,
        left: Subproblem,
        right: Subproblem,
    ) {
        assert!(!left.is_empty() && !right.is_empty(), "operands must be non-empty");
        assert!((left & right).is_empty(), "operands must be disjoint");

        let left_entry = self.entries.get(&left).expect("left operand has no plan");
        let right_entry = self.entries.get(&right).expect("right operand has no plan");

        let model = estimator.estimate_join(graph, &left_entry.model, &right_entry.model);
        let cost = cost_function.join_cost(
            estimator.predict_cardinality(&model),
            left_entry.cost,
            right_entry.cost,
        );

        let union = left | right;
        let improves = match self.entries.get(&union) {
            Some(existing) => cost < existing.cost,
            None => true,
        };
        if improves {
            self.entries.insert(
                union,
                PlanEntry {
                    left,
                    right,
                    model,
                    cost,
                },
            );
        }
    }

    /// Iterate over all subsets holding an entry, in no fixed order.
    pub fn subproblems(&self) -> impl Iterator<Item = Subproblem> + '_ {
        self.entries.keys().copied()
    }

    /// The entry covering every source, if the enumeration reached it.
    pub fn final_entry(&self) -> Option<&PlanEntry> {
        if self.num_sources == 0 {
            return None;
        }
        self.entry(Subproblem::all(self.num_sources))
    }

    /// Parenthesised join expression of the plan for `s`,
    /// e.g. `((T0 ⨝ T1) ⨝ T2)`.
    pub fn plan_expression(&self, graph: &QueryGraph, s: Subproblem) -> Option<String> {
        let entry = self.entry(s)?;
        if entry.is_scan() {
            let id = s.iter().next()?;
            return Some(graph.source_name(id).to_string());
        }
        let left = self.plan_expression(graph, entry.left)?;
        let right = self.plan_expression(graph, entry.right)?;
        Some(format!("({} ⨝ {})", left, right))
    }
}
