use core::fmt;
use std::collections::VecDeque;

use crate::{algorithms::frequency::FrequencyEntry, compressor::CodingError};

if_tracing! {
    use tracing::{debug, warn};
}

/// A node of a huffman tree. Every node owns its children.
#[derive(Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf { weight: u64, symbol: u8 },
    Internal { weight: u64, left: Box<HuffmanNode>, right: Box<HuffmanNode> },
}

impl HuffmanNode {
    pub const fn leaf(symbol: u8, weight: u64) -> Self {
        HuffmanNode::Leaf { weight, symbol }
    }

    /// `a` ends up on the `0` side, `b` on the `1` side.
    pub fn merge(a: Self, b: Self) -> Self {
        HuffmanNode::Internal {
            weight: a.weight() + b.weight(),
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    pub const fn weight(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => *weight,
        }
    }

    fn count_nodes(&self, leaves: &mut usize, internal: &mut usize) {
        match self {
            HuffmanNode::Leaf { .. } => *leaves += 1,
            HuffmanNode::Internal { left, right, .. } => {
                *internal += 1;
                left.count_nodes(leaves, internal);
                right.count_nodes(leaves, internal);
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffmanNode::Leaf { .. } => 0,
            HuffmanNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize, label: &str) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            HuffmanNode::Leaf { weight, symbol } => {
                writeln!(f, "{}{} -> leaf 0x{:02x} [weight: {}]", indent, label, symbol, weight)
            }
            HuffmanNode::Internal { weight, left, right } => {
                writeln!(f, "{}{} -> internal [weight: {}]", indent, label, weight)?;
                left.fmt_indented(f, depth + 1, "0")?;
                right.fmt_indented(f, depth + 1, "1")
            }
        }
    }
}

impl fmt::Debug for HuffmanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0, "root")
    }
}

/// A huffman tree built from an ascending frequency list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffmanNode,
}

impl HuffmanTree {
    /// Builds the tree by repeatedly merging the two lightest nodes of an ordered active list.
    ///
    /// `entries` must already be sorted ascending by count, as produced by
    /// [`count_frequencies`](crate::algorithms::frequency::count_frequencies).
    /// A merged node is inserted in front of the first node that is strictly heavier than it,
    /// which places it after every node of equal weight. This ordering decides which symbols
    /// receive the shorter codes when counts tie, so it must not be replaced by a heap.
    ///
    /// # Errors
    ///
    /// Returns [`CodingError::InvalidInput`] if `entries` is empty.
    pub fn build(entries: &[FrequencyEntry]) -> Result<Self, CodingError> {
        if_tracing! {
            debug!(target = "tree", leaves = entries.len(), "tree build start");
        }
        if entries.is_empty() {
            if_tracing! {
                warn!(target = "tree", "tree build error: frequency list empty");
            }
            return Err(CodingError::InvalidInput("cannot build a huffman tree from an empty frequency list"));
        }

        let mut active: VecDeque<HuffmanNode> = entries.iter().map(|e| HuffmanNode::leaf(e.symbol, e.count)).collect();

        let root = loop {
            let x = active
                .pop_front()
                .ok_or(CodingError::InvalidInput("huffman tree construction lost its root"))?;
            let Some(y) = active.pop_front() else {
                break x;
            };
            let z = HuffmanNode::merge(x, y);

            let position = active
                .iter()
                .position(|node| node.weight() > z.weight())
                .unwrap_or(active.len());
            active.insert(position, z);
        };

        if_tracing! {
            debug!(target = "tree", weight = root.weight(), depth = root.depth(), "tree build complete");
        }

        Ok(HuffmanTree { root })
    }

    pub const fn root(&self) -> &HuffmanNode {
        &self.root
    }

    /// The summed count of every symbol in the tree.
    pub const fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn leaf_count(&self) -> usize {
        let (mut leaves, mut internal) = (0, 0);
        self.root.count_nodes(&mut leaves, &mut internal);
        leaves
    }

    pub fn internal_count(&self) -> usize {
        let (mut leaves, mut internal) = (0, 0);
        self.root.count_nodes(&mut leaves, &mut internal);
        internal
    }

    /// Length of the longest root-to-leaf path, which is also the longest code.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
