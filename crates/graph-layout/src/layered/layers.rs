use super::LayeredLayoutError;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Assign layers to nodes based on topological order
///
/// Uses a two-pass approach to minimize edge lengths:
/// - First pass: assign each node to the layer after its predecessors
/// - Second pass: move nodes closer to their successors when possible
///
/// Nodes inside each layer keep the graph's node order, which is ascending
/// by id for graphs built by `canonical_graph`.
pub(crate) fn assign_layers<N>(graph: &DiGraphMap<N, ()>) -> Result<Vec<Vec<N>>, LayeredLayoutError<N>>
where
    N: Copy + Ord + Hash + fmt::Debug,
{
    let topo_order = toposort(graph, None)
        .map_err(|cycle| LayeredLayoutError::GraphHasCycle(cycle.node_id()))?;
    let mut layer_map: HashMap<N, usize> = HashMap::with_capacity(topo_order.len());

    // First pass: forward, assign each node to layer after its predecessors
    for &node in &topo_order {
        let max_pred_layer = graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|pred| layer_map.get(&pred).map_or(0, |layer| layer + 1))
            .max()
            .unwrap_or(0);
        layer_map.insert(node, max_pred_layer);
    }

    // Second pass: backward, move nodes closer to their successors
    for &node in topo_order.iter().rev() {
        let layer = layer_map.get(&node).copied().unwrap_or(0);
        let Some(min_succ_layer) = graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter_map(|succ| layer_map.get(&succ).copied())
            .min()
        else {
            continue;
        };

        if min_succ_layer > layer + 1 {
            layer_map.insert(node, min_succ_layer - 1);
        }
    }

    // Group nodes by layer
    let layer_count = layer_map.values().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); layer_count];
    for node in graph.nodes() {
        if let Some(&layer) = layer_map.get(&node) {
            layers[layer].push(node);
        }
    }

    Ok(layers)
}
