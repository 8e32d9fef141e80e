// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Query graphs and their adjacency matrices.
//!
//! A query graph holds one data source per relation of a query and one
//! undirected edge per equi-join between two relations. The adjacency
//! matrix answers connectivity questions over [`Subproblem`] bitsets:
//! a subset is connected when its sources reach each other using only
//! edges inside the subset.

use std::collections::BTreeSet;

use crate::error::{ReedError, ReedResult};
use crate::planner::subproblem::Subproblem;

/// Symmetric adjacency matrix over at most 64 data sources.
///
/// Each source's neighbours are a single bitset row, so expanding the
/// reachable set of a subproblem is a handful of word operations per
/// member.
#[derive(Debug, Clone)]
pub struct AdjacencyMatrix {
    rows: Vec<u64>,
}

impl AdjacencyMatrix {
    /// Matrix for `n` sources with no edges yet.
    pub fn new(n: usize) -> Self {
        assert!(n <= 64, "{} sources exceed the 64 source limit", n);
        AdjacencyMatrix { rows: vec![0; n] }
    }

    /// Number of sources.
    pub fn num_sources(&self) -> usize {
        self.rows.len()
    }

    /// Add an undirected edge between sources `a` and `b`.
    pub fn connect(&mut self, a: usize, b: usize) {
        assert!(a != b, "a source cannot join itself");
        assert!(a < self.rows.len() && b < self.rows.len(), "source id out of range");
        self.rows[a] |= 1 << b;
        self.rows[b] |= 1 << a;
    }

    /// All sources adjacent to some member of `s`, excluding `s` itself.
    pub fn neighbors(&self, s: Subproblem) -> Subproblem {
        let mut acc = 0u64;
        for id in s.iter() {
            acc |= self.rows[id];
        }
        Subproblem::from_bits(acc).minus(s)
    }

    /// Check if the subset `s` induces a connected subgraph.
    ///
    /// The empty set is not connected; singletons are. Runs in
    /// O(|s|) bitset steps: grow the reachable set from the lowest
    /// member until it stops changing, then compare against `s`.
    pub fn is_connected(&self, s: Subproblem) -> bool {
        if s.is_empty() {
            return false;
        }
        let first = s.bits().trailing_zeros() as usize;
        if first >= self.rows.len() {
            return false;
        }
        let mut reachable = Subproblem::singleton(first);
        loop {
            let mut frontier = 0u64;
            for id in reachable.iter() {
                frontier |= self.rows[id];
            }
            let grown = (reachable | Subproblem::from_bits(frontier)) & s;
            if grown == reachable {
                break;
            }
            reachable = grown;
        }
        reachable == s
    }
}

/// A query graph: named data sources plus undirected join edges.
#[derive(Debug, Clone)]
pub struct QueryGraph {
    sources: Vec<String>,
    joins: Vec<(usize, usize)>,
    matrix: AdjacencyMatrix,
}

impl QueryGraph {
    /// Graph over the given relation names, without edges yet.
    ///
    /// ## Error Conditions
    /// - More than 64 sources
    /// - Duplicate or empty relation names
    pub fn new(sources: Vec<String>) -> ReedResult<Self> {
        if sources.len() > 64 {
            return Err(ReedError::InvalidQueryGraph {
                reason: format!("{} sources exceed the 64 source limit", sources.len()),
            });
        }
        for (i, name) in sources.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ReedError::InvalidQueryGraph {
                    reason: format!("source {} has an empty name", i),
                });
            }
            if sources[..i].contains(name) {
                return Err(ReedError::InvalidQueryGraph {
                    reason: format!("duplicate source name '{}'", name),
                });
            }
        }
        let matrix = AdjacencyMatrix::new(sources.len());
        Ok(QueryGraph {
            sources,
            joins: Vec::new(),
            matrix,
        })
    }

    /// Add an equi-join edge between two sources by id.
    pub fn add_join(&mut self, a: usize, b: usize) -> ReedResult<()> {
        if a >= self.sources.len() || b >= self.sources.len() {
            return Err(ReedError::InvalidQueryGraph {
                reason: format!("join ({}, {}) references an unknown source", a, b),
            });
        }
        if a == b {
            return Err(ReedError::InvalidQueryGraph {
                reason: format!("source {} cannot join itself", a),
            });
        }
        self.joins.push((a, b));
        self.matrix.connect(a, b);
        Ok(())
    }

    /// Number of data sources.
    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// Name of the source `id`.
    ///
    /// Panics if `id` is out of range.
    pub fn source_name(&self, id: usize) -> &str {
        &self.sources[id]
    }

    /// Id of the source named `name`, if any.
    pub fn source_id(&self, name: &str) -> Option<usize> {
        self.sources.iter().position(|s| s == name)
    }

    /// The join edges in insertion order.
    pub fn joins(&self) -> &[(usize, usize)] {
        &self.joins
    }

    /// The adjacency matrix over the sources.
    pub fn adjacency_matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    /// The subproblem naming every source.
    pub fn all_sources(&self) -> Subproblem {
        Subproblem::all(self.sources.len())
    }

    /// The sorted relation names of a subproblem.
    pub fn relation_names(&self, s: Subproblem) -> BTreeSet<String> {
        s.iter().map(|id| self.sources[id].clone()).collect()
    }
}
