use crate::{NodeSizes, Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;
use std::hash::Hash;

/// Assign coordinates to nodes based on their layer structure and sizes
///
/// Works in the left-to-right frame: layers advance along x and nodes of a
/// layer are stacked along y. Callers transpose for other directions.
pub(crate) fn assign_coordinates<N, S>(
    layers: &[Vec<N>],
    graph: &DiGraphMap<N, ()>,
    sizes: &S,
    spacing: Vec2,
    max_position_iterations: usize,
) -> HashMap<N, Point>
where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    let mut positions = HashMap::new();

    // First pass: Horizontal positioning
    assign_horizontal_positions(layers, sizes, &mut positions, spacing);

    // Second pass: Vertical positioning
    assign_vertical_positions(
        layers,
        graph,
        &mut positions,
        sizes,
        spacing,
        max_position_iterations,
    );

    positions
}

/// Assign horizontal positions based on layers
fn assign_horizontal_positions<N, S>(
    layers: &[Vec<N>],
    sizes: &S,
    positions: &mut HashMap<N, Point>,
    spacing: Vec2,
) where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    let mut x = 0.0;
    for layer in layers {
        // Thickest node of the layer sets its width
        let layer_width = layer
            .iter()
            .map(|&node| sizes.size(node).x)
            .fold(0.0, f32::max);

        for &node in layer {
            let node_size = sizes.size(node);
            positions.insert(node, Point::new(x + (layer_width - node_size.x) / 2.0, 0.0));
        }
        x += layer_width + spacing.x;
    }
}

/// Assign vertical positions with barycenter optimization
fn assign_vertical_positions<N, S>(
    layers: &[Vec<N>],
    graph: &DiGraphMap<N, ()>,
    positions: &mut HashMap<N, Point>,
    sizes: &S,
    spacing: Vec2,
    max_iterations: usize,
) where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    // Initial positioning
    initial_vertical_positioning(layers, positions, sizes, spacing);

    // Iterative optimization, pulling each layer toward its successors
    for _ in 0..max_iterations {
        let mut changed = false;

        for layer_idx in (0..layers.len().saturating_sub(1)).rev() {
            let layer = &layers[layer_idx];
            let before: Vec<f32> = layer.iter().map(|node| positions[node].y).collect();

            for &node in layer {
                let Some(new_y) = barycenter(
                    node,
                    &layers[layer_idx + 1],
                    graph,
                    Direction::Outgoing,
                    positions,
                    sizes,
                ) else {
                    continue;
                };

                if let Some(pos) = positions.get_mut(&node) {
                    pos.y = new_y;
                }
            }

            // Enforce minimum vertical distance, keeping the layer order
            separate(layer, positions, sizes, spacing.y);

            changed |= layer
                .iter()
                .zip(&before)
                .any(|(node, old_y)| (positions[node].y - old_y).abs() > 0.1);
        }

        if !changed {
            break;
        }
    }

    // Nodes with nothing to follow downstream line up with their predecessors
    align_sinks(layers, graph, positions, sizes, spacing.y);

    // Final adjustments
    normalize_vertical_positions(positions);
}

/// Single forward pass moving nodes that have no successor in the next layer
/// toward their predecessors, without crossing their layer neighbors
fn align_sinks<N, S>(
    layers: &[Vec<N>],
    graph: &DiGraphMap<N, ()>,
    positions: &mut HashMap<N, Point>,
    sizes: &S,
    gap: f32,
) where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    for layer_idx in 1..layers.len() {
        let layer = &layers[layer_idx];
        let next_layer = layers.get(layer_idx + 1);

        for (i, &node) in layer.iter().enumerate() {
            let has_successor = next_layer.is_some_and(|next| {
                next.iter().any(|&succ| graph.contains_edge(node, succ))
            });
            if has_successor {
                continue;
            }
            let Some(target) = barycenter(
                node,
                &layers[layer_idx - 1],
                graph,
                Direction::Incoming,
                positions,
                sizes,
            ) else {
                continue;
            };

            let height = sizes.size(node).y;
            let lower = i
                .checked_sub(1)
                .map(|j| positions[&layer[j]].y + sizes.size(layer[j]).y + gap)
                .unwrap_or(f32::NEG_INFINITY);
            let upper = layer
                .get(i + 1)
                .map(|next| positions[next].y - gap - height)
                .unwrap_or(f32::INFINITY);

            if let Some(pos) = positions.get_mut(&node) {
                pos.y = target.min(upper).max(lower);
            }
        }
    }
}

/// Push nodes down so consecutive nodes of a layer never overlap
fn separate<N, S>(layer: &[N], positions: &mut HashMap<N, Point>, sizes: &S, gap: f32)
where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    for pair in layer.windows(2) {
        let (prev_node, curr_node) = (pair[0], pair[1]);
        let Some(prev_top) = positions.get(&prev_node).map(|p| p.y) else {
            continue;
        };
        let prev_bottom = prev_top + sizes.size(prev_node).y;
        let Some(curr) = positions.get_mut(&curr_node) else {
            continue;
        };

        if curr.y < prev_bottom + gap {
            curr.y = prev_bottom + gap;
        }
    }
}

/// Calculate the barycenter (average center) of the node's neighbors in
/// `other_layer`, returned as the top coordinate that centers the node on it
fn barycenter<N, S>(
    node: N,
    other_layer: &[N],
    graph: &DiGraphMap<N, ()>,
    dir: Direction,
    positions: &HashMap<N, Point>,
    sizes: &S,
) -> Option<f32>
where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    let mut sum_y = 0.0;
    let mut count = 0;

    for &other in other_layer {
        let connected = match dir {
            Direction::Outgoing => graph.contains_edge(node, other),
            Direction::Incoming => graph.contains_edge(other, node),
        };
        if !connected {
            continue;
        }
        if let Some(pos) = positions.get(&other) {
            sum_y += pos.y + sizes.size(other).y / 2.0;
            count += 1;
        }
    }

    if count > 0 {
        Some((sum_y / count as f32) - sizes.size(node).y / 2.0)
    } else {
        None
    }
}

/// Initial vertical positioning with uniform spacing
fn initial_vertical_positioning<N, S>(
    layers: &[Vec<N>],
    positions: &mut HashMap<N, Point>,
    sizes: &S,
    spacing: Vec2,
) where
    N: Copy + Ord + Hash,
    S: NodeSizes<N>,
{
    for layer in layers {
        let mut y = 0.0;
        for &node in layer {
            if let Some(pos) = positions.get_mut(&node) {
                pos.y = y;
                y += spacing.y + sizes.size(node).y;
            }
        }
    }
}

/// Normalize vertical positions to start from y=0
fn normalize_vertical_positions<N>(positions: &mut HashMap<N, Point>)
where
    N: Copy + Ord + Hash,
{
    let min_y = positions.values().map(|pos| pos.y).fold(f32::INFINITY, f32::min);
    if !min_y.is_finite() {
        return;
    }

    for pos in positions.values_mut() {
        pos.y -= min_y;
    }
}
