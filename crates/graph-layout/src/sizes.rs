use crate::Vec2;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Trait for providing node sizes during layout computation
pub trait NodeSizes<N> {
    /// Get the size of a node
    fn size(&self, node: N) -> Vec2;
}

// Blanket implementation for closures
impl<N, F> NodeSizes<N> for F
where
    F: Fn(N) -> Vec2,
{
    fn size(&self, node: N) -> Vec2 {
        self(node)
    }
}

// Missing nodes are treated as points
impl<N: Eq + Hash + Copy> NodeSizes<N> for HashMap<N, Vec2> {
    fn size(&self, node: N) -> Vec2 {
        self.get(&node).copied().unwrap_or(Vec2::zero())
    }
}

impl<N: Ord + Copy> NodeSizes<N> for BTreeMap<N, Vec2> {
    fn size(&self, node: N) -> Vec2 {
        self.get(&node).copied().unwrap_or(Vec2::zero())
    }
}

/// Adapter swapping width and height, used to run the left-to-right
/// algorithm on a top-to-bottom layout
pub(crate) struct Transposed<'a, S>(pub &'a S);

impl<N, S: NodeSizes<N>> NodeSizes<N> for Transposed<'_, S> {
    fn size(&self, node: N) -> Vec2 {
        self.0.size(node).transposed()
    }
}
