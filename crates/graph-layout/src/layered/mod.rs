mod acyclic;
mod crossings;
mod layers;
mod ordering;
mod positions;

use crate::sizes::Transposed;
use crate::{LayoutEngine, NodeSizes, Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{IntoNeighborsDirected, IntoNodeIdentifiers};
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, trace};

use acyclic::break_cycles;
use crossings::minimize_crossings;
use layers::assign_layers;
use ordering::order_layers;
use positions::assign_coordinates;

/// Errors that can occur during layered layout computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayeredLayoutError<N>
where
    N: fmt::Debug,
{
    /// The graph contains a cycle at the given node and cycle breaking is disabled
    #[error("graph contains a cycle at node {0:?}")]
    GraphHasCycle(N),

    /// The node reported a negative or non-finite size
    #[error("node {0:?} has an invalid size")]
    InvalidNodeSize(N),
}

/// Orientation of the rank axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RankDir {
    /// Ranks advance along x, siblings are stacked along y
    #[default]
    LeftToRight,
    /// Ranks advance along y, siblings are stacked along x
    TopToBottom,
}

/// Configuration for the layered (Sugiyama-style) layout
#[derive(Debug, Clone)]
pub struct LayeredLayout {
    /// Gap between consecutive ranks (x) and between nodes sharing a rank (y),
    /// expressed in the left-to-right frame
    pub spacing: Vec2,

    /// Orientation of the rank axis
    pub direction: RankDir,

    /// Maximum sweeps for median ordering and crossing minimization
    pub max_crossing_iterations: usize,

    /// Maximum iterations for cross-axis position optimization
    pub max_position_iterations: usize,

    /// Reverse back edges instead of failing on cycles
    pub break_cycles: bool,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            spacing: Vec2::new(20.0, 20.0),
            direction: RankDir::LeftToRight,
            max_crossing_iterations: 10,
            max_position_iterations: 50,
            break_cycles: true,
        }
    }
}

impl LayeredLayout {
    /// Create a new layered layout with the given spacing
    pub fn new(spacing: Vec2) -> Self {
        Self {
            spacing,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: RankDir) -> Self {
        self.direction = direction;
        self
    }
}

/// Layer structure that can be cached and reused
#[derive(Debug, Clone)]
pub struct Layers<N>
where
    N: Copy + Ord + Hash + fmt::Debug,
{
    /// Acyclic copy of the input graph, with back edges reversed
    pub(crate) graph: DiGraphMap<N, ()>,

    /// Nodes organized into ranks, each rank in its final order
    pub nodes: Vec<Vec<N>>,

    /// Edges that were reversed to break cycles, in their original orientation
    pub reversed: Vec<(N, N)>,

    /// Number of edge crossings between adjacent ranks (quality metric)
    pub crossings: usize,
}

impl<N> Layers<N>
where
    N: Copy + Ord + Hash + fmt::Debug,
{
    /// Rank of the given node, if it is part of the layout
    pub fn rank_of(&self, node: N) -> Option<usize> {
        self.nodes.iter().position(|layer| layer.contains(&node))
    }
}

impl LayeredLayout {
    /// Compute layer structure (expensive, cache this)
    ///
    /// This phase breaks cycles, assigns nodes to ranks and orders each rank
    /// to reduce edge crossings. It only depends on the graph structure, not
    /// on node sizes.
    ///
    /// # Errors
    /// Returns an error if the graph contains cycles and cycle breaking is
    /// disabled
    pub fn compute_layers<G>(&self, graph: G) -> Result<Layers<G::NodeId>, LayeredLayoutError<G::NodeId>>
    where
        G: IntoNodeIdentifiers + IntoNeighborsDirected,
        G::NodeId: Copy + Ord + Hash + fmt::Debug,
    {
        let mut internal_graph = canonical_graph(graph);

        let reversed = if self.break_cycles {
            break_cycles(&mut internal_graph)
        } else {
            Vec::new()
        };
        if !reversed.is_empty() {
            debug!("Reversed {} edge(s) to break cycles: {reversed:?}", reversed.len());
        }

        let layers = assign_layers(&internal_graph)?;
        let layers = order_layers(&internal_graph, layers, self.max_crossing_iterations);
        let (layers, crossings) =
            minimize_crossings(&internal_graph, layers, self.max_crossing_iterations);

        debug!(
            "Computed {} rank(s) for {} node(s), {crossings} crossing(s)",
            layers.len(),
            internal_graph.node_count()
        );

        Ok(Layers {
            graph: internal_graph,
            nodes: layers,
            reversed,
            crossings,
        })
    }

    /// Compute positions from cached layers (cheap, rerun when sizes change)
    ///
    /// Positions are the top-left corner of each node, with the smallest
    /// coordinate on each axis normalized to 0.
    ///
    /// # Errors
    /// Returns an error if a node has a negative or non-finite size
    pub fn compute_positions<N, S>(
        &self,
        layers: &Layers<N>,
        sizes: &S,
    ) -> Result<HashMap<N, Point>, LayeredLayoutError<N>>
    where
        N: Copy + Ord + Hash + fmt::Debug,
        S: NodeSizes<N>,
    {
        if let Some(&node) = layers
            .nodes
            .iter()
            .flatten()
            .find(|&&node| !sizes.size(node).is_valid_size())
        {
            return Err(LayeredLayoutError::InvalidNodeSize(node));
        }

        let positions = match self.direction {
            RankDir::LeftToRight => assign_coordinates(
                &layers.nodes,
                &layers.graph,
                sizes,
                self.spacing,
                self.max_position_iterations,
            ),
            RankDir::TopToBottom => assign_coordinates(
                &layers.nodes,
                &layers.graph,
                &Transposed(sizes),
                self.spacing,
                self.max_position_iterations,
            )
            .into_iter()
            .map(|(node, pos)| (node, pos.transposed()))
            .collect(),
        };

        trace!("Positions: {positions:?}");
        Ok(positions)
    }
}

// Implement LayoutEngine for any graph with the required capabilities
impl<G> LayoutEngine<G> for LayeredLayout
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash + fmt::Debug,
{
    type NodeId = G::NodeId;
    type Error = LayeredLayoutError<G::NodeId>;

    fn layout<S>(&self, graph: G, sizes: &S) -> Result<HashMap<Self::NodeId, Point>, Self::Error>
    where
        S: NodeSizes<Self::NodeId>,
    {
        let layers = self.compute_layers(graph)?;
        self.compute_positions(&layers, sizes)
    }
}

/// Copy the graph into a DiGraphMap with nodes and edges inserted in
/// ascending order, so every later phase iterates deterministically.
/// Self loops carry no ranking information and are dropped.
fn canonical_graph<G>(graph: G) -> DiGraphMap<G::NodeId, ()>
where
    G: IntoNodeIdentifiers + IntoNeighborsDirected,
    G::NodeId: Copy + Ord + Hash,
{
    let mut nodes: Vec<_> = graph.node_identifiers().collect();
    nodes.sort();
    nodes.dedup();

    let mut internal_graph = DiGraphMap::with_capacity(nodes.len(), 0);
    for &node in &nodes {
        internal_graph.add_node(node);
    }
    for &node in &nodes {
        let mut successors: Vec<_> = graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|&succ| succ != node)
            .collect();
        successors.sort();
        for succ in successors {
            internal_graph.add_edge(node, succ, ());
        }
    }
    internal_graph
}
