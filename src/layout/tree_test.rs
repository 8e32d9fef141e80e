// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the layout tree builder and validation.

#[cfg(test)]
mod tests {
    use crate::error::ReedError;
    use crate::layout::tree::DataLayout;
    use crate::schema::types::DataType;

    fn int4_layout() -> (DataLayout, Vec<DataType>) {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 64);
        row.add_leaf(DataType::integer(4), 0, 0, 0);
        row.add_leaf(DataType::bitmap(1), 1, 32, 0);
        (layout, types)
    }

    #[test]
    fn test_builder_shape() {
        let (layout, _) = int4_layout();
        assert_eq!(layout.stride_in_bits(), 64);
        assert_eq!(layout.child().num_tuples(), 1);
        assert_eq!(layout.child().num_children(), 2);
        assert!(layout.child().at(0).as_leaf().is_some());
        assert!(layout.child().at(0).as_inode().is_none());
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let (layout, types) = int4_layout();
        layout.validate(&types).unwrap();
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let layout = DataLayout::new();
        let result = layout.validate(&[DataType::integer(4)]);
        assert!(matches!(result, Err(ReedError::InvalidLayout { .. })));
    }

    #[test]
    fn test_validate_rejects_missing_attribute() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 64);
        row.add_leaf(DataType::integer(4), 0, 0, 0);
        // No bitmap leaf.
        let result = layout.validate(&types);
        match result {
            Err(ReedError::InvalidLayout { reason }) => {
                assert!(reason.contains("attribute 1"));
            }
            other => panic!("expected InvalidLayout, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_leaf() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 96);
        row.add_leaf(DataType::integer(4), 0, 0, 0);
        row.add_leaf(DataType::integer(4), 0, 32, 0);
        row.add_leaf(DataType::bitmap(1), 1, 64, 0);
        let result = layout.validate(&types);
        assert!(matches!(result, Err(ReedError::InvalidLayout { .. })));
    }

    #[test]
    fn test_validate_rejects_misaligned_leaf() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 96);
        // 8 is not a multiple of the 32-bit integer alignment.
        row.add_leaf(DataType::integer(4), 0, 8, 0);
        row.add_leaf(DataType::bitmap(1), 1, 40, 0);
        let result = layout.validate(&types);
        match result {
            Err(ReedError::InvalidLayout { reason }) => {
                assert!(reason.contains("alignment"));
            }
            other => panic!("expected InvalidLayout, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_leaf() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 33);
        row.add_leaf(DataType::integer(4), 0, 0, 0);
        // Bitmap at bit 32 with stride 0 overruns the 33-bit row.
        row.add_leaf(DataType::bitmap(1), 1, 32, 0);
        layout.validate(&types).unwrap();

        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 32);
        row.add_leaf(DataType::integer(4), 0, 0, 0);
        row.add_leaf(DataType::bitmap(1), 1, 32, 0);
        let result = layout.validate(&types);
        assert!(matches!(result, Err(ReedError::InvalidLayout { .. })));
    }

    #[test]
    fn test_validate_repeated_leaf_extent() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        // 10 tuples of 32-bit ints plus 10 bitmap bits in 330 bits.
        let block = layout.add_inode(10, 330);
        block.add_leaf(DataType::integer(4), 0, 0, 32);
        block.add_leaf(DataType::bitmap(1), 1, 320, 1);
        layout.validate(&types).unwrap();

        // The same stripes in 329 bits overflow.
        let mut layout = DataLayout::new();
        let block = layout.add_inode(10, 329);
        block.add_leaf(DataType::integer(4), 0, 0, 32);
        block.add_leaf(DataType::bitmap(1), 1, 320, 1);
        assert!(layout.validate(&types).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let row = layout.add_inode(1, 96);
        row.add_leaf(DataType::integer(8), 0, 0, 0);
        row.add_leaf(DataType::bitmap(1), 1, 64, 0);
        let result = layout.validate(&types);
        assert!(matches!(result, Err(ReedError::InvalidLayout { .. })));
    }

    #[test]
    #[should_panic]
    fn test_builder_rejects_second_root() {
        let mut layout = DataLayout::new();
        layout.add_inode(1, 64);
        layout.add_inode(1, 64);
    }

    #[test]
    fn test_nested_inode() {
        let types = vec![DataType::integer(4)];
        let mut layout = DataLayout::new();
        let outer = layout.add_inode(1, 128);
        let inner = outer.add_inode(1, 0, 0);
        inner.add_leaf(DataType::integer(4), 0, 0, 0);
        inner.add_leaf(DataType::bitmap(1), 1, 32, 0);

        assert_eq!(layout.child().num_children(), 1);
        assert!(layout.child().at(0).as_inode().is_some());
        layout.validate(&types).unwrap();
    }
}
