// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Row layout factories.
//!
//! Both factories emit one row per root stride: a single inner node with
//! `num_tuples = 1` whose leaves are the attributes plus the NULL bitmap,
//! each at a fixed offset with stride 0. The naive factory keeps the
//! declaration order; the optimized factory places attributes by
//! descending alignment first, which never pads more than the naive
//! order does.

use crate::layout::tree::{DataLayout, LayoutFactory};
use crate::schema::types::DataType;

/// Round `offset` up to the next multiple of `align` (in bits).
pub(crate) fn round_up_bits(offset: u64, align: u64) -> u64 {
    debug_assert!(align >= 1, "alignment must be non-zero");
    offset + (align - offset % align) % align
}

/// The attribute list with the synthetic NULL bitmap appended. The
/// bitmap carries one bit per attribute and the source index after the
/// last attribute.
pub(crate) fn with_null_bitmap(types: &[DataType]) -> Vec<DataType> {
    let mut all = types.to_vec();
    all.push(DataType::bitmap(types.len() as u64));
    all
}

/// Attribute indices sorted by descending alignment; ties keep the
/// declaration order (stable sort).
pub(crate) fn order_by_descending_alignment(types: &[DataType]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..types.len()).collect();
    order.sort_by(|&a, &b| types[b].alignment_in_bits().cmp(&types[a].alignment_in_bits()));
    order
}

/// Walk `types` in the order given by `emission`, rounding the running
/// offset up to each type's alignment. Returns the per-type offsets
/// (indexed like `types`) and the row stride: the final offset rounded
/// up to `max(max_alignment, 8)` bits, never below 8 bits.
fn aligned_offsets(types: &[DataType], emission: &[usize]) -> (Vec<u64>, u64) {
    let mut offsets = vec![0u64; types.len()];
    let mut offset = 0u64;
    let mut max_align = 0u64;

    for &i in emission {
        let ty = &types[i];
        let align = ty.alignment_in_bits();
        offset = round_up_bits(offset, align);
        offsets[i] = offset;
        offset += ty.size_in_bits();
        max_align = max_align.max(align);
    }

    let stride = round_up_bits(offset, max_align.max(8)).max(8);
    (offsets, stride)
}

fn make_row_layout(types: &[DataType], emission: &[usize]) -> DataLayout {
    let all = with_null_bitmap(types);
    let (offsets, stride) = aligned_offsets(&all, emission);

    let mut layout = DataLayout::new();
    let row = layout.add_inode(1, stride);
    for (idx, ty) in all.iter().enumerate() {
        row.add_leaf(*ty, idx, offsets[idx], 0);
    }
    layout
}

/// Row layout in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveRowLayoutFactory;

impl LayoutFactory for NaiveRowLayoutFactory {
    fn name(&self) -> &'static str {
        "row_naive"
    }

    fn make(&self, types: &[DataType], _num_tuples: usize) -> DataLayout {
        assert!(!types.is_empty(), "row layout requires at least one attribute");
        let all = with_null_bitmap(types);
        let emission: Vec<usize> = (0..all.len()).collect();
        make_row_layout(types, &emission)
    }
}

/// Row layout reordered by descending alignment.
///
/// The emitted leaves keep their original source indices and child
/// order; only the computed offsets reflect the reordered emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizedRowLayoutFactory;

impl LayoutFactory for OptimizedRowLayoutFactory {
    fn name(&self) -> &'static str {
        "row_optimized"
    }

    fn make(&self, types: &[DataType], _num_tuples: usize) -> DataLayout {
        assert!(!types.is_empty(), "row layout requires at least one attribute");
        let all = with_null_bitmap(types);
        let emission = order_by_descending_alignment(&all);
        make_row_layout(types, &emission)
    }
}
