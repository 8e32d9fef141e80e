// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Physical data layout synthesis.
//!
//! Translates an ordered list of typed attributes into a bit-precise
//! layout tree. Three factories are provided:
//!
//! - **Naive row**: attributes in declaration order, padded to alignment
//! - **Optimized row**: attributes reordered by descending alignment to
//!   minimise padding
//! - **PAX**: rows grouped into fixed-size blocks, columns contiguous
//!   within a block
//!
//! ## Layout Tree
//!
//! ```text
//! DataLayout (root, stride = row or block stride)
//! └── INode (num_tuples = 1 for rows, N for PAX blocks)
//!     ├── Leaf (attribute 0 @ offset, stride)
//!     ├── Leaf (attribute 1 @ offset, stride)
//!     ├── ...
//!     └── Leaf (NULL bitmap @ offset, stride)
//! ```
//!
//! Every attribute plus a synthetic NULL bitmap (one bit per attribute,
//! source index = attribute count) occurs exactly once as a leaf, every
//! leaf offset is a multiple of its type's alignment, and no leaf extent
//! exceeds its parent's stride. [`DataLayout::validate`] checks these
//! invariants.

pub mod pax;
pub mod row;
pub mod tree;

#[cfg(test)]
mod tree_test;

// Re-export commonly used types
pub use pax::PaxLayoutFactory;
pub use row::{NaiveRowLayoutFactory, OptimizedRowLayoutFactory};
pub use tree::{DataLayout, INode, LayoutChild, LayoutFactory, LayoutLeaf, LayoutNode};
