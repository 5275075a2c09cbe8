use crate::{NodeSizes, Point};
use std::collections::HashMap;
use std::hash::Hash;

/// A layout engine that can compute positions for graph nodes
///
/// This trait is generic over the graph type `G`, so an engine only states
/// the graph capabilities it actually needs. The layered engine implements
/// it for any graph exposing node identifiers and directed neighbors.
pub trait LayoutEngine<G> {
    /// The type used to identify nodes in the graph
    type NodeId: Copy + Ord + Hash;

    /// The error returned when the graph cannot be laid out
    type Error: std::error::Error;

    /// Compute node positions for the given graph
    ///
    /// # Errors
    /// Returns an error if the layout computation fails (e.g. a cycle when
    /// cycle breaking is disabled, or a node with an unusable size)
    fn layout<S>(&self, graph: G, sizes: &S) -> Result<HashMap<Self::NodeId, Point>, Self::Error>
    where
        S: NodeSizes<Self::NodeId>;
}
