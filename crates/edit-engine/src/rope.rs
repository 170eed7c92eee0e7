//! Weighted binary rope over codepoints.
//!
//! Text is stored as a binary tree whose leaves hold contiguous `char` slices. Every internal node
//! records the codepoint length of its left subtree (its *weight*), which lets positional lookups,
//! splits and concatenations descend in `O(depth)`.
//!
//! # Shape invariants
//!
//! - A branch's `weight` is the exact length of its left subtree.
//! - Branches never hold an empty child; the only empty leaf is the root of an empty rope.
//! - No leaf is longer than the merge threshold.
//! - Adjacent small leaves are fused whenever a concatenation brings them together, so repeated
//!   small edits do not accumulate thin nodes.
//! - When the depth outgrows `~2·log2(leaves)` the tree is rebuilt balanced from its leaves.
//!
//! Nodes are exclusively owned (`Box`); nothing is shared between ropes.

use std::fmt;
use std::mem;

use crate::config::{BufferConfig, MIN_MERGE_THRESHOLD};

#[derive(Debug, Clone)]
enum Node {
    Leaf(Vec<char>),
    Branch {
        weight: usize,
        depth: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf(Vec::new())
    }
}

impl Node {
    /// Build a (balanced) subtree from `data`, halving until every leaf fits the threshold.
    fn from_chars(mut data: Vec<char>, threshold: usize) -> Node {
        if data.len() > threshold {
            let tail = data.split_off(data.len() / 2);
            Node::branch(
                Node::from_chars(data, threshold),
                Node::from_chars(tail, threshold),
            )
        } else {
            Node::Leaf(data)
        }
    }

    fn branch(left: Node, right: Node) -> Node {
        Node::Branch {
            weight: left.len(),
            depth: 1 + left.depth().max(right.depth()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf(data) => data.len(),
            Node::Branch { weight, right, .. } => weight + right.len(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Branch { depth, .. } => *depth,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Node::Leaf(data) if data.is_empty())
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        let mut node = self;
        let mut pos = pos;
        loop {
            match node {
                Node::Leaf(data) => return data.get(pos).copied(),
                Node::Branch {
                    weight,
                    left,
                    right,
                    ..
                } => {
                    if pos < *weight {
                        node = left;
                    } else {
                        pos -= weight;
                        node = right;
                    }
                }
            }
        }
    }

    /// Append the codepoints in `[start, end)` (relative to this node) to `out`.
    fn collect(&self, start: usize, end: usize, out: &mut String) {
        if start >= end {
            return;
        }
        match self {
            Node::Leaf(data) => out.extend(&data[start..end]),
            Node::Branch {
                weight,
                left,
                right,
                ..
            } => {
                if start < *weight {
                    left.collect(start, end.min(*weight), out);
                }
                if end > *weight {
                    right.collect(start.saturating_sub(*weight), end - weight, out);
                }
            }
        }
    }

    /// Split into `[0, pos)` and `[pos, len)`.
    ///
    /// Panics when `pos` lies beyond the node: callers clamp external input first.
    fn split(self, pos: usize, threshold: usize) -> (Node, Node) {
        match self {
            Node::Leaf(mut data) => {
                assert!(
                    pos <= data.len(),
                    "rope split at {pos} past leaf of length {}",
                    data.len()
                );
                let tail = data.split_off(pos);
                (Node::Leaf(data), Node::Leaf(tail))
            }
            Node::Branch {
                weight,
                left,
                right,
                ..
            } => {
                if pos == weight {
                    (*left, *right)
                } else if pos < weight {
                    let (head, rest) = left.split(pos, threshold);
                    (head, concat(rest, *right, threshold))
                } else {
                    let (rest, tail) = right.split(pos - weight, threshold);
                    (concat(*left, rest, threshold), tail)
                }
            }
        }
    }

    /// Rebuild a balanced tree from the leaves of `root`, fusing neighbours that fit together.
    fn rebuild_balanced(root: Node, threshold: usize) -> Node {
        let mut leaves: Vec<Vec<char>> = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf(data) => {
                    if data.is_empty() {
                        continue;
                    }
                    match leaves.last_mut() {
                        Some(last) if last.len() + data.len() <= threshold => last.extend(data),
                        _ => leaves.push(data),
                    }
                }
                Node::Branch { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        let mut level: Vec<Node> = leaves.into_iter().map(Node::Leaf).collect();
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => next.push(Node::branch(left, right)),
                    None => next.push(left),
                }
            }
            level = next;
        }
        level.pop().unwrap_or_default()
    }

    /// Returns `(leaf_count, len)` after asserting every shape invariant below this node.
    fn check(&self, threshold: usize, is_root: bool) -> (usize, usize) {
        match self {
            Node::Leaf(data) => {
                assert!(
                    is_root || !data.is_empty(),
                    "empty leaf below a branch"
                );
                assert!(
                    data.len() <= threshold,
                    "leaf of length {} exceeds merge threshold {threshold}",
                    data.len()
                );
                (1, data.len())
            }
            Node::Branch {
                weight,
                depth,
                left,
                right,
            } => {
                let (left_leaves, left_len) = left.check(threshold, false);
                let (right_leaves, right_len) = right.check(threshold, false);
                assert_eq!(*weight, left_len, "branch weight out of sync");
                assert_eq!(
                    *depth,
                    1 + left.depth().max(right.depth()),
                    "branch depth out of sync"
                );
                (left_leaves + right_leaves, left_len + right_len)
            }
        }
    }
}

/// Join two subtrees, fusing small leaves at the seam.
fn concat(left: Node, right: Node, threshold: usize) -> Node {
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }

    match (left, right) {
        (Node::Leaf(mut head), Node::Leaf(tail)) if head.len() + tail.len() <= threshold => {
            head.extend(tail);
            Node::Leaf(head)
        }
        // The left side ends in a short leaf: fold the new leaf into it instead of growing a
        // chain of tiny right children.
        (
            Node::Branch {
                left: inner,
                right: last,
                ..
            },
            Node::Leaf(tail),
        ) => match *last {
            Node::Leaf(mut seam) if seam.len() + tail.len() <= threshold => {
                seam.extend(tail);
                Node::branch(*inner, Node::Leaf(seam))
            }
            last => Node::branch(Node::branch(*inner, last), Node::Leaf(tail)),
        },
        // Mirror image for prepends.
        (
            Node::Leaf(mut head),
            Node::Branch {
                left: first,
                right: inner,
                ..
            },
        ) => match *first {
            Node::Leaf(seam) if head.len() + seam.len() <= threshold => {
                head.extend(seam);
                Node::branch(Node::Leaf(head), *inner)
            }
            first => Node::branch(Node::Leaf(head), Node::branch(first, *inner)),
        },
        (left, right) => Node::branch(left, right),
    }
}

/// Depth past which the tree is considered degenerate for `len` codepoints.
fn depth_limit(len: usize, threshold: usize) -> usize {
    let leaves = len / threshold + 1;
    2 * (usize::BITS - leaves.leading_zeros()) as usize + 4
}

/// A rope of codepoints with an explicit merge threshold.
#[derive(Debug, Clone)]
pub struct Rope {
    root: Node,
    len: usize,
    merge_threshold: usize,
}

impl Default for Rope {
    fn default() -> Self {
        Self::with_config(&BufferConfig::default())
    }
}

impl Rope {
    /// Create an empty rope.
    ///
    /// # Panics
    ///
    /// Panics if `merge_threshold` is below [`MIN_MERGE_THRESHOLD`]; use
    /// [`BufferConfig::validate`] to check untrusted values first.
    pub fn new(merge_threshold: usize) -> Self {
        assert!(
            merge_threshold >= MIN_MERGE_THRESHOLD,
            "merge threshold must be at least {MIN_MERGE_THRESHOLD}, got {merge_threshold}"
        );
        Self {
            root: Node::default(),
            len: 0,
            merge_threshold,
        }
    }

    /// Create an empty rope tuned by `config`.
    pub fn with_config(config: &BufferConfig) -> Self {
        Self::new(config.merge_threshold)
    }

    /// Create a rope holding `text`.
    pub fn from_text(text: &str, merge_threshold: usize) -> Self {
        let mut rope = Self::new(merge_threshold);
        rope.insert(0, text);
        rope
    }

    /// Length in codepoints.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the rope holds no text.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The merge threshold this rope was built with.
    pub fn merge_threshold(&self) -> usize {
        self.merge_threshold
    }

    /// Height of the tree (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Codepoint at `pos`, or `None` past the end.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        if pos >= self.len {
            return None;
        }
        self.root.char_at(pos)
    }

    /// Text in `[start, end)`, clipped to the rope.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len);
        let start = start.min(end);
        let mut out = String::with_capacity(end - start);
        self.root.collect(start, end, &mut out);
        out
    }

    /// Insert `text` at `pos` (clamped to the end). Returns the number of codepoints inserted.
    pub fn insert(&mut self, pos: usize, text: &str) -> usize {
        let data: Vec<char> = text.chars().collect();
        if data.is_empty() {
            return 0;
        }
        let count = data.len();
        let pos = pos.min(self.len);
        let threshold = self.merge_threshold;

        let inserted = Node::from_chars(data, threshold);
        let root = mem::take(&mut self.root);
        self.root = if pos == self.len {
            concat(root, inserted, threshold)
        } else {
            let (head, tail) = root.split(pos, threshold);
            concat(concat(head, inserted, threshold), tail, threshold)
        };
        self.len += count;
        self.rebalance_if_degenerate();
        count
    }

    /// Remove up to `len` codepoints starting at `pos`. Returns the number actually removed.
    pub fn erase(&mut self, pos: usize, len: usize) -> usize {
        let start = pos.min(self.len);
        let end = start.saturating_add(len).min(self.len);
        if start == end {
            return 0;
        }
        let threshold = self.merge_threshold;

        let root = mem::take(&mut self.root);
        let (head, tail) = root.split(end, threshold);
        let (head, _removed) = head.split(start, threshold);
        self.root = concat(head, tail, threshold);
        self.len -= end - start;
        self.rebalance_if_degenerate();
        end - start
    }

    /// Iterate over the leaf slices in order.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            stack: vec![&self.root],
        }
    }

    /// Iterate over every codepoint in order.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.chunks().flat_map(|chunk| chunk.iter().copied())
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.chunks().count().max(1)
    }

    /// Assert every structural invariant of the tree.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    pub fn check_invariants(&self) {
        let (_, len) = self.root.check(self.merge_threshold, true);
        assert_eq!(len, self.len, "cached rope length out of sync");
    }

    fn rebalance_if_degenerate(&mut self) {
        let depth = self.root.depth();
        let limit = depth_limit(self.len, self.merge_threshold);
        if depth > limit {
            let root = mem::take(&mut self.root);
            self.root = Node::rebuild_balanced(root, self.merge_threshold);
            tracing::trace!(
                len = self.len,
                old_depth = depth,
                new_depth = self.root.depth(),
                "rebalanced rope"
            );
        }
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            for ch in chunk {
                fmt::Write::write_char(f, *ch)?;
            }
        }
        Ok(())
    }
}

/// Iterator over the leaf slices of a [`Rope`].
pub struct Chunks<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [char];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(data) if data.is_empty() => continue,
                Node::Leaf(data) => return Some(data.as_slice()),
                Node::Branch { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }
        None
    }
}
