// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Node geometry and raw block allocation.
//!
//! A node block starts with a [`NodeHdr`] (tag + entry count). Leaf
//! blocks continue with the forward leaf pointer, the key array, and
//! the value array; inner blocks continue with the separator key array
//! and the child pointer array. All offsets are computed by `const fn`,
//! so every instantiation's capacities are compile-time constants and a
//! geometry that cannot hold two entries per node is a translation
//! failure.
//!
//! Capacity computation starts from the padding-free upper bound and
//! backs off until the carved arrays fit the block, which accounts for
//! inter-array alignment padding exactly.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::mem::{align_of, size_of};
use std::ptr::{self, NonNull};

/// Round `x` up to the next multiple of `a` (a power of two).
pub(crate) const fn align_up(x: usize, a: usize) -> usize {
    (x + (a - 1)) & !(a - 1)
}

/// Discriminates leaf and inner blocks.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeTag {
    Inner = 0,
    Leaf = 1,
}

/// Common header at offset 0 of every node block.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub(crate) struct NodeHdr {
    /// Leaf or inner.
    pub tag: NodeTag,

    /// Keys stored in this node. An inner node has `len + 1` children.
    pub len: u32,
}

/// Carved offsets of a leaf block.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LeafLayout {
    /// Key-value pairs per leaf.
    pub cap: usize,

    /// Offset of the forward leaf pointer (`*mut u8`).
    pub next_off: usize,

    /// Offset of the key array (`[K; cap]`).
    pub keys_off: usize,

    /// Offset of the value array (`[V; cap]`).
    pub vals_off: usize,
}

/// Carved offsets of an inner block.
#[derive(Copy, Clone, Debug)]
pub(crate) struct InnerLayout {
    /// Separator keys per inner node; child pointers are `cap + 1`.
    pub cap: usize,

    /// Offset of the separator key array (`[K; cap]`).
    pub keys_off: usize,

    /// Offset of the child pointer array (`[*mut u8; cap + 1]`).
    pub children_off: usize,
}

/// Compute the leaf geometry for `K`, `V`, and a node size in bytes.
pub(crate) const fn leaf_layout<K, V>(node_size: usize) -> LeafLayout {
    let s_ptr = size_of::<*mut u8>();
    let a_ptr = align_of::<*mut u8>();
    let s_k = size_of::<K>();
    let a_k = align_of::<K>();
    let s_v = size_of::<V>();
    let a_v = align_of::<V>();

    let next_off = align_up(size_of::<NodeHdr>(), a_ptr);
    let after_next = next_off + s_ptr;

    let pair = s_k + s_v;
    let mut cap = if pair == 0 {
        0
    } else {
        node_size.saturating_sub(after_next) / pair
    };

    while cap > 0 {
        let keys_off = align_up(after_next, a_k);
        let vals_off = align_up(keys_off + cap * s_k, a_v);
        let end = vals_off + cap * s_v;
        if end <= node_size {
            return LeafLayout {
                cap,
                next_off,
                keys_off,
                vals_off,
            };
        }
        cap -= 1;
    }

    LeafLayout {
        cap: 0,
        next_off,
        keys_off: after_next,
        vals_off: after_next,
    }
}

/// Compute the inner-node geometry for `K` and a node size in bytes.
pub(crate) const fn inner_layout<K>(node_size: usize) -> InnerLayout {
    let s_ptr = size_of::<*mut u8>();
    let a_ptr = align_of::<*mut u8>();
    let s_k = size_of::<K>();
    let a_k = align_of::<K>();

    let after_hdr = size_of::<NodeHdr>();

    // cap keys and cap + 1 children must fit past the header.
    let per_entry = s_k + s_ptr;
    let mut cap = if per_entry == 0 {
        0
    } else {
        node_size
            .saturating_sub(after_hdr)
            .saturating_sub(s_ptr)
            / per_entry
    };

    while cap > 0 {
        let keys_off = align_up(after_hdr, a_k);
        let children_off = align_up(keys_off + cap * s_k, a_ptr);
        let end = children_off + (cap + 1) * s_ptr;
        if end <= node_size {
            return InnerLayout {
                cap,
                keys_off,
                children_off,
            };
        }
        cap -= 1;
    }

    InnerLayout {
        cap: 0,
        keys_off: after_hdr,
        children_off: after_hdr,
    }
}

#[inline]
fn node_alloc_layout(node_size: usize) -> Layout {
    // Node blocks are sized and aligned to NODE_SIZE; the power-of-two
    // check happens in the tree's geometry assertion.
    Layout::from_size_align(node_size, node_size).expect("invalid node block layout")
}

/// Allocate one node block and write its header; the payload stays
/// uninitialised.
pub(crate) fn alloc_node_block(node_size: usize, tag: NodeTag) -> NonNull<u8> {
    let layout = node_alloc_layout(node_size);
    // SAFETY: layout has non-zero size (node_size >= size_of::<NodeHdr>()
    // is guaranteed by the geometry assertion before any allocation).
    let p = unsafe { alloc(layout) };
    let Some(block) = NonNull::new(p) else {
        handle_alloc_error(layout);
    };
    // SAFETY: block is freshly allocated with at least header size.
    unsafe {
        ptr::write(block.as_ptr() as *mut NodeHdr, NodeHdr { tag, len: 0 });
    }
    block
}

/// Free a node block previously returned by [`alloc_node_block`].
///
/// # Safety
/// `block` must come from `alloc_node_block` with the same `node_size`,
/// and all keys and values stored in it must have been dropped already.
pub(crate) unsafe fn dealloc_node_block(block: NonNull<u8>, node_size: usize) {
    dealloc(block.as_ptr(), node_alloc_layout(node_size));
}
