use super::crossings::count_crossings;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

/// Reorder every layer with alternating median sweeps
///
/// Even sweeps go down, ordering each layer by the median position of its
/// predecessors in the layer above; odd sweeps go up using successors in the
/// layer below. The best ordering seen so far (by crossing count) is kept.
pub(crate) fn order_layers<N>(
    graph: &DiGraphMap<N, ()>,
    layers: Vec<Vec<N>>,
    max_sweeps: usize,
) -> Vec<Vec<N>>
where
    N: Copy + Ord + Hash,
{
    let mut best_crossings = count_crossings(graph, &layers);
    let mut best = layers.clone();
    let mut current = layers;

    for sweep in 0..max_sweeps {
        if best_crossings == 0 {
            break;
        }

        if sweep % 2 == 0 {
            for i in 1..current.len() {
                current[i] = reorder(&current[i], &current[i - 1], graph, Direction::Incoming);
            }
        } else {
            for i in (0..current.len().saturating_sub(1)).rev() {
                current[i] = reorder(&current[i], &current[i + 1], graph, Direction::Outgoing);
            }
        }

        let crossings = count_crossings(graph, &current);
        trace!("Median sweep {sweep}: {crossings} crossing(s)");
        if crossings < best_crossings {
            best_crossings = crossings;
            best = current.clone();
        }
    }

    best
}

/// Sort `layer` by the median position of each node's neighbors in `fixed`.
/// Nodes without a neighbor in `fixed` stay in their current slot.
fn reorder<N>(layer: &[N], fixed: &[N], graph: &DiGraphMap<N, ()>, dir: Direction) -> Vec<N>
where
    N: Copy + Ord + Hash,
{
    let fixed_index: HashMap<N, usize> = fixed.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut sortable = Vec::new();
    let mut pinned = Vec::new();
    for (slot, &node) in layer.iter().enumerate() {
        let mut neighbor_positions: Vec<usize> = graph
            .neighbors_directed(node, dir)
            .filter_map(|neighbor| fixed_index.get(&neighbor).copied())
            .collect();

        match median(&mut neighbor_positions) {
            Some(value) => sortable.push((value, slot, node)),
            None => pinned.push((slot, node)),
        }
    }

    sortable.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));

    let mut pinned = pinned.into_iter().peekable();
    let mut sortable = sortable.into_iter();
    let mut ordered = Vec::with_capacity(layer.len());
    for slot in 0..layer.len() {
        let next = match pinned.peek() {
            Some(&(pinned_slot, node)) if pinned_slot == slot => {
                pinned.next();
                Some(node)
            }
            _ => sortable.next().map(|(_, _, node)| node),
        };
        ordered.extend(next);
    }
    ordered
}

fn median(positions: &mut [usize]) -> Option<f32> {
    if positions.is_empty() {
        return None;
    }
    positions.sort_unstable();
    let mid = positions.len() / 2;
    if positions.len() % 2 == 1 {
        Some(positions[mid] as f32)
    } else {
        Some((positions[mid - 1] + positions[mid]) as f32 / 2.0)
    }
}
