// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! B+-tree construction and lookup.
//!
//! [`BTree`] is generic over the key type, the value type, and the node
//! size in bytes (a const parameter, 4096 by default). Keys must be
//! ordered and cheap to clone; separator keys are clones of the maximum
//! key of the left subtree, so a lookup descends into the leftmost
//! subtree that can still contain the key. Equal keys are allowed and
//! keep their bulkload order.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedcore::btree::BTree;
//!
//! let tree: BTree<i32, i32> = BTree::bulkload(vec![(7, 137), (42, 13)]);
//!
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.find(&7), Some((&7, &137)));
//! assert_eq!(tree.find(&13), None);
//!
//! let pairs: Vec<(i32, i32)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
//! assert_eq!(pairs, vec![(7, 137), (42, 13)]);
//! ```

use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::btree::iter::{Iter, IterMut, Range, RangeLimit, RangeMut};
use crate::btree::node::{
    alloc_node_block, dealloc_node_block, inner_layout, leaf_layout, InnerLayout, LeafLayout,
    NodeHdr, NodeTag,
};

/// B+-tree of key-value pairs with `NODE_SIZE`-byte nodes.
///
/// Constructed exactly once by [`BTree::bulkload`] from input sorted by
/// key, immutable afterwards (values can be updated in place through
/// the mutable iterators, the tree shape cannot). The tree owns its
/// node storage exclusively; dropping it frees every node.
///
/// ## Thread Safety
/// Shared references may be used from multiple threads (`Sync` when the
/// key and value types are); the tree itself is not internally
/// synchronised.
pub struct BTree<K, V, const NODE_SIZE: usize = 4096> {
    /// Root block: an inner node, or a leaf while `height == 0`.
    root: NonNull<u8>,

    /// Number of inner levels above the leaves.
    height: usize,

    /// Total number of key-value pairs.
    len: usize,

    /// Head of the leaf chain.
    first_leaf: NonNull<u8>,

    /// Tail of the leaf chain.
    last_leaf: NonNull<u8>,

    _marker: PhantomData<(K, V)>,
}

// The tree exclusively owns the pointed-to node blocks.
unsafe impl<K: Send, V: Send, const NODE_SIZE: usize> Send for BTree<K, V, NODE_SIZE> {}
unsafe impl<K: Sync, V: Sync, const NODE_SIZE: usize> Sync for BTree<K, V, NODE_SIZE> {}

/// Raw block accessors shared by construction, lookup, and iteration.
impl<K, V, const NODE_SIZE: usize> BTree<K, V, NODE_SIZE> {
    /// Node size in bytes, for both leaves and inner nodes.
    pub const NODE_SIZE_IN_BYTES: usize = NODE_SIZE;

    pub(crate) const LEAF: LeafLayout = leaf_layout::<K, V>(NODE_SIZE);
    pub(crate) const INNER: InnerLayout = inner_layout::<K>(NODE_SIZE);

    /// Key-value pairs per leaf.
    pub const LEAF_FANOUT: usize = Self::LEAF.cap;

    /// Separator keys per inner node (one less than its child count).
    pub const INODE_FANOUT: usize = Self::INNER.cap;

    /// Geometry is checked once per instantiation, at compile time.
    const GEOMETRY: () = {
        assert!(NODE_SIZE.is_power_of_two(), "node size must be a power of two");
        assert!(
            leaf_layout::<K, V>(NODE_SIZE).cap >= 2,
            "node size too small: a leaf must hold at least two key-value pairs"
        );
        assert!(
            inner_layout::<K>(NODE_SIZE).cap >= 2,
            "node size too small: an inner node must hold at least two keys"
        );
    };

    #[inline]
    pub(crate) unsafe fn node_len(node: NonNull<u8>) -> usize {
        (*(node.as_ptr() as *const NodeHdr)).len as usize
    }

    #[inline]
    unsafe fn node_tag(node: NonNull<u8>) -> NodeTag {
        (*(node.as_ptr() as *const NodeHdr)).tag
    }

    #[inline]
    unsafe fn set_node_len(node: NonNull<u8>, len: usize) {
        (*(node.as_ptr() as *mut NodeHdr)).len = len as u32;
    }

    #[inline]
    pub(crate) unsafe fn leaf_next(leaf: NonNull<u8>) -> Option<NonNull<u8>> {
        NonNull::new(*(leaf.as_ptr().add(Self::LEAF.next_off) as *const *mut u8))
    }

    #[inline]
    unsafe fn set_leaf_next(leaf: NonNull<u8>, next: *mut u8) {
        *(leaf.as_ptr().add(Self::LEAF.next_off) as *mut *mut u8) = next;
    }

    #[inline]
    pub(crate) unsafe fn leaf_key(leaf: NonNull<u8>, i: usize) -> *mut K {
        (leaf.as_ptr().add(Self::LEAF.keys_off) as *mut K).add(i)
    }

    #[inline]
    pub(crate) unsafe fn leaf_val(leaf: NonNull<u8>, i: usize) -> *mut V {
        (leaf.as_ptr().add(Self::LEAF.vals_off) as *mut V).add(i)
    }

    #[inline]
    unsafe fn inner_key(node: NonNull<u8>, j: usize) -> *mut K {
        (node.as_ptr().add(Self::INNER.keys_off) as *mut K).add(j)
    }

    #[inline]
    unsafe fn inner_child(node: NonNull<u8>, j: usize) -> NonNull<u8> {
        let slot = (node.as_ptr().add(Self::INNER.children_off) as *const *mut u8).add(j);
        NonNull::new_unchecked(*slot)
    }

    #[inline]
    unsafe fn set_inner_child(node: NonNull<u8>, j: usize, child: NonNull<u8>) {
        let slot = (node.as_ptr().add(Self::INNER.children_off) as *mut *mut u8).add(j);
        *slot = child.as_ptr();
    }

    fn new_leaf() -> NonNull<u8> {
        let leaf = alloc_node_block(NODE_SIZE, NodeTag::Leaf);
        // SAFETY: freshly allocated block of NODE_SIZE bytes.
        unsafe { Self::set_leaf_next(leaf, ptr::null_mut()) };
        leaf
    }

    /// Recursively drop a node's entries and free its block.
    unsafe fn drop_node(node: NonNull<u8>, height: usize) {
        debug_assert_eq!(
            Self::node_tag(node),
            if height == 0 { NodeTag::Leaf } else { NodeTag::Inner }
        );
        let len = Self::node_len(node);
        if height == 0 {
            for i in 0..len {
                ptr::drop_in_place(Self::leaf_key(node, i));
                ptr::drop_in_place(Self::leaf_val(node, i));
            }
        } else {
            for j in 0..=len {
                Self::drop_node(Self::inner_child(node, j), height - 1);
            }
            for j in 0..len {
                ptr::drop_in_place(Self::inner_key(node, j));
            }
        }
        dealloc_node_block(node, NODE_SIZE);
    }
}

impl<K, V, const NODE_SIZE: usize> Drop for BTree<K, V, NODE_SIZE> {
    fn drop(&mut self) {
        // SAFETY: the tree exclusively owns all node blocks and every
        // entry was written exactly once during bulkload.
        unsafe { Self::drop_node(self.root, self.height) }
    }
}

impl<K: Ord + Clone, V, const NODE_SIZE: usize> BTree<K, V, NODE_SIZE> {
    /// Bulkload a fresh tree from input sorted by key (non-decreasing).
    ///
    /// Streams the input into fully packed chained leaves, then builds
    /// the inner levels bottom up, O(n) time overall. Equal keys keep
    /// their input order. Unsorted input is a precondition violation
    /// and is rejected by a debug assertion.
    ///
    /// ## Input
    /// - `items`: `(key, value)` pairs, non-decreasing by key
    ///
    /// ## Output
    /// - A fully packed tree; empty input yields an empty tree of
    ///   height 0 whose root is a single empty leaf.
    pub fn bulkload<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let () = Self::GEOMETRY;

        let mut leaves: Vec<NonNull<u8>> = Vec::new();
        let mut current = Self::new_leaf();
        let first_leaf = current;
        let mut fill = 0usize;
        let mut len = 0usize;

        #[cfg(debug_assertions)]
        let mut prev_key: Option<K> = None;

        for (key, value) in items {
            #[cfg(debug_assertions)]
            {
                if let Some(prev) = &prev_key {
                    debug_assert!(
                        !(key < *prev),
                        "bulkload input must be sorted by key (non-decreasing)"
                    );
                }
                prev_key = Some(key.clone());
            }

            if fill == Self::LEAF_FANOUT {
                let next = Self::new_leaf();
                // SAFETY: `current` is a live leaf block; fill == cap.
                unsafe {
                    Self::set_node_len(current, fill);
                    Self::set_leaf_next(current, next.as_ptr());
                }
                leaves.push(current);
                current = next;
                fill = 0;
            }
            // SAFETY: fill < LEAF_FANOUT slots are in bounds and
            // uninitialised.
            unsafe {
                ptr::write(Self::leaf_key(current, fill), key);
                ptr::write(Self::leaf_val(current, fill), value);
            }
            fill += 1;
            len += 1;
        }
        // SAFETY: `current` is live; fill <= cap.
        unsafe { Self::set_node_len(current, fill) };
        leaves.push(current);
        let last_leaf = current;

        if leaves.len() == 1 {
            // Single leaf (possibly empty) is the root.
            return BTree {
                root: first_leaf,
                height: 0,
                len,
                first_leaf,
                last_leaf,
                _marker: PhantomData,
            };
        }

        // Group each level into inner nodes of up to INODE_FANOUT + 1
        // children until a single root remains. A trailing group of one
        // child borrows from its (necessarily full) left neighbour so
        // every inner node keeps at least two children.
        let group = Self::INODE_FANOUT + 1;
        let mut level = leaves;
        let mut child_height = 0usize;
        while level.len() > 1 {
            let n = level.len();
            let mut parents = Vec::with_capacity(n / 2 + 1);
            let mut i = 0;
            while i < n {
                let remaining = n - i;
                let take = if remaining > group {
                    if remaining - group == 1 {
                        group - 1
                    } else {
                        group
                    }
                } else {
                    remaining
                };
                // SAFETY: all nodes in `level` are live and fully
                // initialised at `child_height`.
                let parent = unsafe { Self::new_inner(&level[i..i + take], child_height) };
                parents.push(parent);
                i += take;
            }
            level = parents;
            child_height += 1;
        }

        BTree {
            root: level[0],
            height: child_height,
            len,
            first_leaf,
            last_leaf,
            _marker: PhantomData,
        }
    }

    /// Build one inner node over `children` living at `child_height`.
    ///
    /// # Safety
    /// `children` must hold at least two initialised node blocks.
    unsafe fn new_inner(children: &[NonNull<u8>], child_height: usize) -> NonNull<u8> {
        debug_assert!(children.len() >= 2);
        debug_assert!(children.len() <= Self::INODE_FANOUT + 1);

        let node = alloc_node_block(NODE_SIZE, NodeTag::Inner);
        for (j, &child) in children.iter().enumerate() {
            Self::set_inner_child(node, j, child);
            if j + 1 < children.len() {
                let separator = Self::max_key(child, child_height);
                ptr::write(Self::inner_key(node, j), separator);
            }
        }
        Self::set_node_len(node, children.len() - 1);
        node
    }

    /// Maximum key stored under `node`: descend along the rightmost
    /// children to the rightmost leaf.
    unsafe fn max_key(node: NonNull<u8>, height: usize) -> K {
        let mut node = node;
        let mut h = height;
        while h > 0 {
            node = Self::inner_child(node, Self::node_len(node));
            h -= 1;
        }
        let len = Self::node_len(node);
        debug_assert!(len > 0, "bulkload never links empty leaves");
        (*Self::leaf_key(node, len - 1)).clone()
    }

    /// Number of key-value pairs in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of inner levels; 0 when the root is a leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Position of the first entry whose key is `>= key`, if any.
    ///
    /// At every inner node the descent picks the leftmost subtree whose
    /// separator (the subtree's maximum key) is `>= key`, so equal keys
    /// are found at their leftmost occurrence.
    fn lower_bound(&self, key: &K) -> Option<(NonNull<u8>, usize)> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: root/height describe a fully initialised tree.
        unsafe {
            let mut node = self.root;
            let mut h = self.height;
            while h > 0 {
                let n_keys = Self::node_len(node);
                let mut j = 0;
                while j < n_keys && *Self::inner_key(node, j) < *key {
                    j += 1;
                }
                node = Self::inner_child(node, j);
                h -= 1;
            }
            debug_assert_eq!(Self::node_tag(node), NodeTag::Leaf);

            let len = Self::node_len(node);
            let mut i = 0;
            while i < len && *Self::leaf_key(node, i) < *key {
                i += 1;
            }
            if i < len {
                return Some((node, i));
            }
            // All keys in this leaf are smaller; the successor, if any,
            // starts the next leaf.
            Self::leaf_next(node).map(|next| (next, 0))
        }
    }

    /// Look up the first (leftmost) entry with the given key.
    ///
    /// ## Output
    /// - `Some((key, value))`: the first occurrence, in bulkload order
    /// - `None`: the key is not in the tree
    pub fn find(&self, key: &K) -> Option<(&K, &V)> {
        let (leaf, i) = self.lower_bound(key)?;
        // SAFETY: lower_bound returns in-bounds positions of live leaves.
        unsafe {
            let k = &*Self::leaf_key(leaf, i);
            if k == key {
                Some((k, &*Self::leaf_val(leaf, i)))
            } else {
                None
            }
        }
    }

    /// Like [`BTree::find`], with a mutable value reference.
    pub fn find_mut(&mut self, key: &K) -> Option<(&K, &mut V)> {
        let (leaf, i) = self.lower_bound(key)?;
        // SAFETY: as in `find`; &mut self guarantees exclusive access.
        unsafe {
            let k = &*Self::leaf_key(leaf, i);
            if k == key {
                Some((k, &mut *Self::leaf_val(leaf, i)))
            } else {
                None
            }
        }
    }

    /// Iterate over all pairs in non-decreasing key order; equal keys
    /// appear in bulkload order.
    pub fn iter(&self) -> Iter<'_, K, V, NODE_SIZE> {
        Iter::new(Some(self.first_leaf), 0, self.len)
    }

    /// Like [`BTree::iter`], with mutable value references.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, NODE_SIZE> {
        IterMut::new(Some(self.first_leaf), 0, self.len)
    }

    /// Iterate over all pairs with `lo <= key < hi`.
    pub fn range(&self, lo: &K, hi: &K) -> Range<'_, K, V, NODE_SIZE> {
        match self.lower_bound(lo) {
            Some((leaf, i)) => Range::new(Some(leaf), i, RangeLimit::Below(hi.clone())),
            None => Range::new(None, 0, RangeLimit::Below(hi.clone())),
        }
    }

    /// Like [`BTree::range`], with mutable value references.
    pub fn range_mut(&mut self, lo: &K, hi: &K) -> RangeMut<'_, K, V, NODE_SIZE> {
        match self.lower_bound(lo) {
            Some((leaf, i)) => RangeMut::new(Some(leaf), i, RangeLimit::Below(hi.clone())),
            None => RangeMut::new(None, 0, RangeLimit::Below(hi.clone())),
        }
    }

    /// Iterate over the maximal run of pairs whose key equals `key`, in
    /// bulkload order. Bounded by key equality, so keys without a
    /// meaningful successor value work too.
    pub fn equal_range(&self, key: &K) -> Range<'_, K, V, NODE_SIZE> {
        match self.lower_bound(key) {
            Some((leaf, i)) => Range::new(Some(leaf), i, RangeLimit::Equal(key.clone())),
            None => Range::new(None, 0, RangeLimit::Equal(key.clone())),
        }
    }

    /// Like [`BTree::equal_range`], with mutable value references.
    pub fn equal_range_mut(&mut self, key: &K) -> RangeMut<'_, K, V, NODE_SIZE> {
        match self.lower_bound(key) {
            Some((leaf, i)) => RangeMut::new(Some(leaf), i, RangeLimit::Equal(key.clone())),
            None => RangeMut::new(None, 0, RangeLimit::Equal(key.clone())),
        }
    }
}

impl<'a, K: Ord + Clone, V, const NODE_SIZE: usize> IntoIterator for &'a BTree<K, V, NODE_SIZE> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, NODE_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, const NODE_SIZE: usize> std::fmt::Debug for BTree<K, V, NODE_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BTree")
            .field("node_size", &NODE_SIZE)
            .field("len", &self.len)
            .field("height", &self.height)
            .field("leaf_fanout", &Self::LEAF.cap)
            .field("inode_fanout", &Self::INNER.cap)
            .finish()
    }
}
