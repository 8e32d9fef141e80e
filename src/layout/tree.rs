// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Layout tree structure and builder.
//!
//! A [`DataLayout`] is an ordered tree: the root carries a stride in bits
//! and a single inner node; an inner node carries a tuple count and an
//! ordered sequence of children, each placed at a fixed bit offset and
//! tiled with a per-child stride (0 means the child is not repeated
//! inside the node); a leaf names one typed attribute by its source
//! index. The NULL bitmap is assigned the index following the last
//! attribute.
//!
//! Builder misuse (a second root, a zero stride) is a programming error
//! and is asserted. Structural invariants over a finished layout are
//! checked by [`DataLayout::validate`], which reports violations as
//! [`ReedError::InvalidLayout`].

use crate::error::{ReedError, ReedResult};
use crate::schema::types::DataType;

/// Factory for physical data layouts.
///
/// Implementations are stateless: `make` is a pure function from an
/// attribute list to a fresh layout tree. The `num_tuples` argument is a
/// hint for layouts of finite relations; the factories shipped here
/// describe indefinite sequences and ignore it.
pub trait LayoutFactory {
    /// Registry name of this factory, e.g. `"row_naive"`.
    fn name(&self) -> &'static str;

    /// Build the layout tree for the given attribute types.
    fn make(&self, types: &[DataType], num_tuples: usize) -> DataLayout;
}

/// A leaf of the layout tree: one typed attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLeaf {
    data_type: DataType,
    index: usize,
}

impl LayoutLeaf {
    /// The physical type of the attribute.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Ordinal of the attribute in the original attribute list. The NULL
    /// bitmap carries the index after the last attribute.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A child of an inner node, placed at a fixed offset and tiled with a
/// per-child stride (0 = not repeated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChild {
    /// Offset of the child relative to its parent, in bits.
    pub offset_in_bits: u64,

    /// Distance between repetitions of the child, in bits (0 = single).
    pub stride_in_bits: u64,

    /// The child node itself.
    pub node: LayoutNode,
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNode {
    /// A typed attribute.
    Leaf(LayoutLeaf),

    /// A nested inner node.
    INode(INode),
}

impl LayoutChild {
    /// The child as a leaf, if it is one.
    pub fn as_leaf(&self) -> Option<&LayoutLeaf> {
        match &self.node {
            LayoutNode::Leaf(leaf) => Some(leaf),
            LayoutNode::INode(_) => None,
        }
    }

    /// The child as an inner node, if it is one.
    pub fn as_inode(&self) -> Option<&INode> {
        match &self.node {
            LayoutNode::Leaf(_) => None,
            LayoutNode::INode(inode) => Some(inode),
        }
    }
}

/// An inner node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct INode {
    num_tuples: u64,
    children: Vec<LayoutChild>,
}

impl INode {
    /// Number of tuples modelled by one repetition of this node.
    pub fn num_tuples(&self) -> u64 {
        self.num_tuples
    }

    /// Number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// The child at position `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn at(&self, i: usize) -> &LayoutChild {
        &self.children[i]
    }

    /// Iterate over the children in order.
    pub fn children(&self) -> impl Iterator<Item = &LayoutChild> {
        self.children.iter()
    }

    /// Append a leaf child.
    pub fn add_leaf(
        &mut self,
        data_type: DataType,
        index: usize,
        offset_in_bits: u64,
        stride_in_bits: u64,
    ) {
        self.children.push(LayoutChild {
            offset_in_bits,
            stride_in_bits,
            node: LayoutNode::Leaf(LayoutLeaf { data_type, index }),
        });
    }

    /// Append a nested inner node and return a handle to it.
    pub fn add_inode(
        &mut self,
        num_tuples: u64,
        offset_in_bits: u64,
        stride_in_bits: u64,
    ) -> &mut INode {
        assert!(num_tuples >= 1, "inner node must model at least one tuple");
        self.children.push(LayoutChild {
            offset_in_bits,
            stride_in_bits,
            node: LayoutNode::INode(INode {
                num_tuples,
                children: Vec::new(),
            }),
        });
        match &mut self.children.last_mut().expect("just pushed").node {
            LayoutNode::INode(inode) => inode,
            LayoutNode::Leaf(_) => unreachable!(),
        }
    }
}

/// The root of a layout tree: an indefinite sequence of repetitions of a
/// single inner node, tiled with the root stride.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataLayout {
    root: Option<(u64, INode)>,
}

impl DataLayout {
    /// Create an empty layout with no root node yet.
    pub fn new() -> Self {
        DataLayout { root: None }
    }

    /// Set the root inner node and return a handle to it.
    ///
    /// Panics if the layout already has a root or the stride is zero.
    pub fn add_inode(&mut self, num_tuples: u64, stride_in_bits: u64) -> &mut INode {
        assert!(self.root.is_none(), "layout already has a root node");
        assert!(num_tuples >= 1, "root node must model at least one tuple");
        assert!(stride_in_bits >= 1, "root stride must be non-zero");
        self.root = Some((
            stride_in_bits,
            INode {
                num_tuples,
                children: Vec::new(),
            },
        ));
        &mut self.root.as_mut().expect("just set").1
    }

    /// Stride between repetitions of the root's child, in bits.
    ///
    /// Panics if no root has been added.
    pub fn stride_in_bits(&self) -> u64 {
        self.root.as_ref().expect("layout has no root node").0
    }

    /// The single child of the root.
    ///
    /// Panics if no root has been added.
    pub fn child(&self) -> &INode {
        &self.root.as_ref().expect("layout has no root node").1
    }

    /// Validate this layout against the attribute list it was built for.
    ///
    /// Checks that every attribute plus the NULL bitmap occurs exactly
    /// once as a leaf with the correct type, that the bitmap has one bit
    /// per attribute, that every leaf offset honours its type's
    /// alignment, and that no leaf extent exceeds the stride of the node
    /// containing it.
    pub fn validate(&self, types: &[DataType]) -> ReedResult<()> {
        let (stride, inode) = self.root.as_ref().ok_or_else(|| ReedError::InvalidLayout {
            reason: "layout has no root node".to_string(),
        })?;

        let mut seen = vec![false; types.len() + 1];
        Self::validate_inode(inode, *stride, types, &mut seen)?;

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(ReedError::InvalidLayout {
                reason: format!("attribute {} has no leaf", missing),
            });
        }
        Ok(())
    }

    fn validate_inode(
        inode: &INode,
        bound: u64,
        types: &[DataType],
        seen: &mut [bool],
    ) -> ReedResult<()> {
        for child in inode.children() {
            match &child.node {
                LayoutNode::Leaf(leaf) => {
                    Self::validate_leaf(leaf, child, inode.num_tuples(), bound, types, seen)?;
                }
                LayoutNode::INode(nested) => {
                    // Nested nodes are bounded by the remainder of their
                    // parent's stride past their own offset.
                    let remaining =
                        bound
                            .checked_sub(child.offset_in_bits)
                            .ok_or_else(|| ReedError::InvalidLayout {
                                reason: "nested node offset exceeds parent stride".to_string(),
                            })?;
                    Self::validate_inode(nested, remaining, types, seen)?;
                }
            }
        }
        Ok(())
    }

    fn validate_leaf(
        leaf: &LayoutLeaf,
        child: &LayoutChild,
        num_tuples: u64,
        bound: u64,
        types: &[DataType],
        seen: &mut [bool],
    ) -> ReedResult<()> {
        let idx = leaf.index();
        if idx > types.len() {
            return Err(ReedError::InvalidLayout {
                reason: format!("leaf index {} out of range", idx),
            });
        }
        if seen[idx] {
            return Err(ReedError::InvalidLayout {
                reason: format!("attribute {} has more than one leaf", idx),
            });
        }
        seen[idx] = true;

        let expected = if idx == types.len() {
            DataType::bitmap(types.len() as u64)
        } else {
            types[idx]
        };
        if leaf.data_type() != expected {
            return Err(ReedError::InvalidLayout {
                reason: format!(
                    "leaf {} has type {}, expected {}",
                    idx,
                    leaf.data_type(),
                    expected
                ),
            });
        }

        let ty = leaf.data_type();
        let align = ty.alignment_in_bits();
        if child.offset_in_bits % align != 0 {
            return Err(ReedError::InvalidLayout {
                reason: format!(
                    "leaf {} at offset {} violates alignment {}",
                    idx, child.offset_in_bits, align
                ),
            });
        }

        // A repeated leaf occupies num_tuples tiles of its stride; a
        // single leaf occupies just its own size.
        let extent = if child.stride_in_bits == 0 {
            child.offset_in_bits + ty.size_in_bits()
        } else {
            child.offset_in_bits + (num_tuples - 1) * child.stride_in_bits + ty.size_in_bits()
        };
        if extent > bound {
            return Err(ReedError::InvalidLayout {
                reason: format!(
                    "leaf {} extends to bit {} beyond stride {}",
                    idx, extent, bound
                ),
            });
        }
        Ok(())
    }
}
