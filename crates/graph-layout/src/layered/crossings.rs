use petgraph::visit::IntoNeighborsDirected;
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;

/// Minimize edge crossings by swapping adjacent nodes in layers
///
/// Greedy local search: a swap is kept only when it strictly lowers the
/// number of crossings around the touched layer, so the outcome only depends
/// on the input order.
pub(crate) fn minimize_crossings<G>(
    graph: G,
    mut layers: Vec<Vec<G::NodeId>>,
    max_iterations: usize,
) -> (Vec<Vec<G::NodeId>>, usize)
where
    G: IntoNeighborsDirected + Copy,
    G::NodeId: Copy + Ord + Hash,
{
    for _ in 0..max_iterations {
        let mut improved = false;

        for layer_index in 0..layers.len() {
            let layer_len = layers[layer_index].len();
            for i in 0..layer_len.saturating_sub(1) {
                let crossings_before = crossings_around(graph, &layers, layer_index);
                layers[layer_index].swap(i, i + 1);
                let crossings_after = crossings_around(graph, &layers, layer_index);

                if crossings_after < crossings_before {
                    improved = true;
                } else {
                    // Swap back if no improvement
                    layers[layer_index].swap(i, i + 1);
                }
            }
        }

        if !improved {
            break;
        }
    }

    let crossings = count_crossings(graph, &layers);
    (layers, crossings)
}

/// Count the number of edge crossings between all adjacent layers
pub(crate) fn count_crossings<G>(graph: G, layers: &[Vec<G::NodeId>]) -> usize
where
    G: IntoNeighborsDirected + Copy,
    G::NodeId: Copy + Ord + Hash,
{
    layers
        .windows(2)
        .map(|pair| count_between(graph, &pair[0], &pair[1]))
        .sum()
}

/// Crossings on both sides of the given layer
fn crossings_around<G>(graph: G, layers: &[Vec<G::NodeId>], layer_index: usize) -> usize
where
    G: IntoNeighborsDirected + Copy,
    G::NodeId: Copy + Ord + Hash,
{
    let mut crossings = 0;
    if layer_index > 0 {
        crossings += count_between(graph, &layers[layer_index - 1], &layers[layer_index]);
    }
    if let Some(lower) = layers.get(layer_index + 1) {
        crossings += count_between(graph, &layers[layer_index], lower);
    }
    crossings
}

/// Count crossings among edges going from `upper` to `lower`
fn count_between<G>(graph: G, upper: &[G::NodeId], lower: &[G::NodeId]) -> usize
where
    G: IntoNeighborsDirected + Copy,
    G::NodeId: Copy + Ord + Hash,
{
    let lower_index: HashMap<G::NodeId, usize> =
        lower.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    // (upper position, lower position) for every edge between the two layers
    let segments: Vec<(usize, usize)> = upper
        .iter()
        .enumerate()
        .flat_map(|(i, &node)| {
            graph
                .neighbors_directed(node, Direction::Outgoing)
                .filter_map(|target| lower_index.get(&target).map(|&j| (i, j)))
                .collect::<Vec<_>>()
        })
        .collect();

    let mut crossings = 0;
    for (idx, &(u1, l1)) in segments.iter().enumerate() {
        for &(u2, l2) in &segments[idx + 1..] {
            if (u1 < u2 && l1 > l2) || (u1 > u2 && l1 < l2) {
                crossings += 1;
            }
        }
    }
    crossings
}
