//! # Implicit Tree Layout
//!
//! The index stores its nodes in one flat array, level by level, with no child
//! pointers. Node ids are 1-based and every node has `block_size + 1` child
//! slots:
//!
//! ```text
//! block_size = 3, key_num = 7, block_count = 3
//!
//!                 node 1: [ 4 | 6 | 7 ]
//!                /        |       \      \
//!   node 2: [1|2|3]  node 3: [5]  (4)   (5)      <- ids 4 and 5 do not exist
//!
//! flat key array: [ 4 6 7 | 1 2 3 | 5 ]
//!                   node 1  node 2  node 3
//! ```
//!
//! ## Addressing
//!
//! - keys of node `i` start at flat offset `(i - 1) * block_size`
//! - child `c` (0..=block_size) of node `i` is
//!   `i * (block_size + 1) + 1 - (block_size - c)`
//! - `block_count = ceil(key_num / block_size)`; only the last node may be
//!   partially filled, and it is always a leaf because its first child id is
//!   larger than `block_count`
//!
//! ## Placement
//!
//! Building uses two passes:
//!
//! 1. **Pre-order fill pass** ([`TreeShape::node_fill`]): walks the tree from
//!    the root and records how many keys each node receives.
//! 2. **In-order placement pass** ([`TreeShape::slot_ranks`]): walks the tree
//!    in key order and hands out sorted ranks, so that for every flat slot we
//!    know which sorted key lands there.
//!
//! Because placement follows the in-order walk, every key in child `c` of a
//! node lies between that node's keys `c - 1` and `c`, which is exactly what
//! the lower-bound descent in `search` relies on.

use smallvec::SmallVec;

/// Typical trees are shallow; 16 levels of u16 keys with block size 1 is
/// already 65535 keys.
const INLINE_DEPTH: usize = 16;

/// Shape of an implicit tree with `key_num` keys in blocks of `block_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeShape {
    key_num: usize,
    block_size: usize,
    block_count: usize,
}

impl TreeShape {
    /// `block_size` must be non-zero whenever `key_num` is.
    pub fn new(key_num: usize, block_size: usize) -> Self {
        debug_assert!(key_num == 0 || block_size > 0);
        let block_count = if key_num == 0 {
            0
        } else {
            key_num.div_ceil(block_size)
        };
        Self {
            key_num,
            block_size,
            block_count,
        }
    }

    #[inline]
    pub fn key_num(&self) -> usize {
        self.key_num
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key_num == 0
    }

    /// Flat offset of the first key of `node`.
    #[inline(always)]
    pub fn node_offset(&self, node: usize) -> usize {
        debug_assert!(node >= 1);
        (node - 1) * self.block_size
    }

    /// Id of child `idx` (0..=block_size) of `node`.
    #[inline(always)]
    pub fn child(&self, node: usize, idx: usize) -> usize {
        debug_assert!(idx <= self.block_size);
        node * (self.block_size + 1) + 1 - (self.block_size - idx)
    }

    #[inline]
    pub fn contains_node(&self, node: usize) -> bool {
        node >= 1 && node <= self.block_count
    }

    #[inline]
    pub fn is_last(&self, node: usize) -> bool {
        node == self.block_count
    }

    /// Number of keys stored in `node`.
    #[inline]
    pub fn node_len(&self, node: usize) -> usize {
        if !self.contains_node(node) {
            return 0;
        }
        let offset = self.node_offset(node);
        self.block_size.min(self.key_num - offset)
    }

    /// Number of levels in the tree.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut level_start = 1;
        while level_start <= self.block_count {
            depth += 1;
            level_start = self.child(level_start, 0);
        }
        depth
    }

    /// Pre-order pass: keys per node, indexed by node id (slot 0 is unused).
    pub fn node_fill(&self) -> Vec<usize> {
        let mut fill = vec![0usize; self.block_count + 1];
        if self.is_empty() {
            return fill;
        }

        let mut stack: SmallVec<[usize; INLINE_DEPTH]> = SmallVec::new();
        stack.push(1);
        while let Some(node) = stack.pop() {
            fill[node] = self.node_len(node);

            // reversed so the leftmost child is visited first
            for idx in (0..=self.block_size).rev() {
                let child = self.child(node, idx);
                if self.contains_node(child) {
                    stack.push(child);
                }
            }
        }

        debug_assert_eq!(fill.iter().sum::<usize>(), self.key_num);
        fill
    }

    /// In-order pass: for every flat slot, the rank of the sorted key stored
    /// there.
    pub fn slot_ranks(&self) -> Vec<usize> {
        let fill = self.node_fill();
        let mut ranks = vec![0usize; self.key_num];
        let mut next_rank = 0usize;
        if !self.is_empty() {
            self.place(1, &fill, &mut ranks, &mut next_rank);
        }
        debug_assert_eq!(next_rank, self.key_num);
        ranks
    }

    fn place(&self, node: usize, fill: &[usize], ranks: &mut [usize], next_rank: &mut usize) {
        if !self.contains_node(node) {
            return;
        }
        let offset = self.node_offset(node);
        let len = fill[node];
        for i in 0..len {
            self.place(self.child(node, i), fill, ranks, next_rank);
            ranks[offset + i] = *next_rank;
            *next_rank += 1;
        }
        self.place(self.child(node, len), fill, ranks, next_rank);
    }

    /// Lazily yields flat slots in ascending key order.
    pub fn in_order(&self) -> InOrderSlots {
        let mut slots = InOrderSlots {
            shape: *self,
            stack: SmallVec::new(),
        };
        slots.descend_left(1);
        slots
    }
}

/// Iterator over flat slot indices in in-order (ascending key) order.
#[derive(Debug, Clone)]
pub struct InOrderSlots {
    shape: TreeShape,
    /// (node, number of keys of this node already yielded)
    stack: SmallVec<[(usize, usize); INLINE_DEPTH]>,
}

impl InOrderSlots {
    fn descend_left(&mut self, mut node: usize) {
        while self.shape.contains_node(node) {
            self.stack.push((node, 0));
            node = self.shape.child(node, 0);
        }
    }
}

impl Iterator for InOrderSlots {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let (node, yielded) = *self.stack.last()?;
            if yielded < self.shape.node_len(node) {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                self.descend_left(self.shape.child(node, yielded + 1));
                return Some(self.shape.node_offset(node) + yielded);
            }
            self.stack.pop();
        }
    }
}
