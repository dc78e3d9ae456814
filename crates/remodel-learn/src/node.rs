//! Tree node storage: arena indices and the node enum.

/// Index of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Index of a node within the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Impurity of a node under some split criterion. Always finite and
/// non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    pub(crate) fn value(self) -> f64 {
        self.0
    }
}

/// A node in the arena-backed decision tree.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Internal decision node: left when `sample[feature] <= threshold`.
    Split {
        feature: FeatureIndex,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
    },
    /// Terminal node holding the majority prediction and the fraction of
    /// positive training samples that reached it.
    Leaf {
        prediction: usize,
        positive_fraction: f64,
    },
}

impl Node {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
