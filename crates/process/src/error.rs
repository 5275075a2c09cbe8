use graph_layout::LayeredLayoutError;
use thiserror::Error;

use crate::model::ProcessGraph;

/// Failure of the layered solver on a process graph
///
/// Malformed process data never ends up here: it is normalized before the
/// solver runs. These errors only come from the solver itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("process graph has a cycle through node {node_id:?}")]
    Cycle { node_id: String },

    #[error("node {node_id:?} has an invalid size")]
    InvalidNodeSize { node_id: String },
}

impl LayoutError {
    /// Translate a solver error on node indices into process node ids
    pub(crate) fn from_solver(err: LayeredLayoutError<usize>, graph: &ProcessGraph) -> Self {
        let node_id = |index: usize| {
            graph
                .nodes
                .get(index)
                .map(|node| node.id.clone())
                .unwrap_or_else(|| format!("#{index}"))
        };

        match err {
            LayeredLayoutError::GraphHasCycle(index) => LayoutError::Cycle {
                node_id: node_id(index),
            },
            LayeredLayoutError::InvalidNodeSize(index) => LayoutError::InvalidNodeSize {
                node_id: node_id(index),
            },
        }
    }
}
