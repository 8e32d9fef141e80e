// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Cache-friendly B+-tree index with bulkload construction.
//!
//! The tree is built exactly once from sorted input, never mutated
//! afterwards, and dropped as a whole. Every node, leaf or inner, is a
//! single raw allocation of exactly `NODE_SIZE` bytes, aligned to
//! `NODE_SIZE`, so a node never straddles more cache lines (or pages)
//! than it has to.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ BTree<K, V, NODE_SIZE>                          │
//! ├─────────────────────────────────────────────────┤
//! │ - root: inner node or leaf                      │
//! │ - height: number of inner levels                │
//! │ - len: total number of key-value pairs          │
//! │ - first_leaf / last_leaf                        │
//! └──────────┬──────────────────────────────────────┘
//!            │
//!            ▼
//!     ┌────────────┐   separator = max key of left subtree
//!     │   INode    │
//!     │ K₁ … K_n-1 │
//!     └─┬───┬────┬─┘
//!       ▼   ▼    ▼
//!     ┌────┐┌────┐┌────┐
//!     │Leaf│→│Leaf│→│Leaf│→ ∅      singly linked for ordered scans
//!     └────┘└────┘└────┘
//! ```
//!
//! ## Operations
//!
//! - **Bulkload**: O(n) bottom-up construction from sorted input,
//!   fully packed leaves
//! - **Point lookup**: `find` descends to the leftmost occurrence
//! - **Range scan**: `range(lo, hi)` walks the leaf chain for
//!   `lo <= key < hi`
//! - **Duplicate scan**: `equal_range` yields the maximal run of equal
//!   keys in bulkload order
//!
//! Node capacities are computed at compile time from `NODE_SIZE` and
//! the key and value types; a node size too small to hold two entries
//! per node fails translation, not execution.

pub mod iter;
pub mod node;
pub mod tree;


// Re-export commonly used types
pub use iter::{Iter, IterMut, Range, RangeMut};
pub use tree::BTree;
