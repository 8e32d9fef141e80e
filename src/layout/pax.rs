// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! PAX layout factory.
//!
//! Partition Attributes Across: tuples are grouped into fixed-size
//! blocks, and within a block each attribute forms a contiguous column
//! stripe. The number of tuples per block is
//! `floor(block_bits / bits_per_tuple)` with no further rounding, where
//! `bits_per_tuple` sums the attribute sizes plus one NULL-bitmap bit
//! per attribute.
//!
//! Column stripes are placed by descending alignment, so every stripe
//! base (a running sum of `size × N` of wider-aligned columns) is a
//! multiple of its column's alignment. The stride within a stripe equals
//! the column type's size.

use crate::layout::row::{order_by_descending_alignment, with_null_bitmap};
use crate::layout::tree::{DataLayout, LayoutFactory};
use crate::schema::types::DataType;

/// Default PAX block size: 4 KiB.
pub const DEFAULT_BLOCK_SIZE_IN_BYTES: usize = 4096;

/// PAX layout with a fixed block size.
#[derive(Debug, Clone, Copy)]
pub struct PaxLayoutFactory {
    block_size_in_bytes: usize,
}

impl Default for PaxLayoutFactory {
    fn default() -> Self {
        PaxLayoutFactory {
            block_size_in_bytes: DEFAULT_BLOCK_SIZE_IN_BYTES,
        }
    }
}

impl PaxLayoutFactory {
    /// PAX layout with 4 KiB blocks.
    pub fn new() -> Self {
        Self::default()
    }

    /// PAX layout with a custom block size.
    pub fn with_block_size(block_size_in_bytes: usize) -> Self {
        assert!(block_size_in_bytes >= 1, "block size must be non-zero");
        PaxLayoutFactory { block_size_in_bytes }
    }

    /// The configured block size in bits.
    pub fn block_size_in_bits(&self) -> u64 {
        8 * self.block_size_in_bytes as u64
    }
}

impl LayoutFactory for PaxLayoutFactory {
    fn name(&self) -> &'static str {
        "pax4k"
    }

    fn make(&self, types: &[DataType], _num_tuples: usize) -> DataLayout {
        assert!(!types.is_empty(), "PAX layout requires at least one attribute");

        let all = with_null_bitmap(types);
        let block_bits = self.block_size_in_bits();

        let bits_per_tuple: u64 = all.iter().map(|ty| ty.size_in_bits()).sum();
        let tuples_per_block = block_bits / bits_per_tuple;
        assert!(
            tuples_per_block >= 1,
            "tuple of {} bits does not fit a {} bit block",
            bits_per_tuple,
            block_bits
        );

        // Column stripe bases, in descending-alignment placement order.
        let mut bases = vec![0u64; all.len()];
        let mut base = 0u64;
        for &i in &order_by_descending_alignment(&all) {
            bases[i] = base;
            base += all[i].size_in_bits() * tuples_per_block;
        }

        let mut layout = DataLayout::new();
        let block = layout.add_inode(tuples_per_block, block_bits);
        for (idx, ty) in all.iter().enumerate() {
            block.add_leaf(*ty, idx, bases[idx], ty.size_in_bits());
        }
        layout
    }
}
