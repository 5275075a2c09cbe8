use tracing::trace;

use crate::config::LayoutConfig;
use crate::model::{Direction, NodeKind, Position, ProcessGraph, Rect};
use crate::sizes::node_size;

/// Place start and end markers outside the lanes
///
/// Start goes before the first lane and end after the last one along the
/// flow axis, both centered on the cross axis of `extent`. Several markers
/// of the same kind are stacked across the flow and centered as a group.
///
/// Returns positions indexed like `graph.nodes`, `None` for other nodes.
pub fn place_terminals(
    graph: &ProcessGraph,
    extent: Rect,
    direction: Direction,
    config: &LayoutConfig,
) -> Vec<Option<Position>> {
    let mut positions = vec![None; graph.nodes.len()];
    let center = extent.center();
    let margin = config.terminal_margin;
    let gap = config.node_spacing;

    for kind in [NodeKind::Start, NodeKind::End] {
        let members: Vec<usize> = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == kind)
            .map(|(index, _)| index)
            .collect();
        if members.is_empty() {
            continue;
        }

        let size = node_size(kind);
        let count = members.len() as f32;
        for (i, &index) in members.iter().enumerate() {
            let step = i as f32;
            let position = match direction {
                Direction::LeftToRight => {
                    let x = match kind {
                        NodeKind::Start => extent.x - margin - size.x,
                        _ => extent.right() + margin,
                    };
                    let stack = count * size.y + (count - 1.0) * gap;
                    Position::new(x, center.y - stack / 2.0 + step * (size.y + gap))
                }
                Direction::TopToBottom => {
                    let y = match kind {
                        NodeKind::Start => extent.y - margin - size.y,
                        _ => extent.bottom() + margin,
                    };
                    let stack = count * size.x + (count - 1.0) * gap;
                    Position::new(center.x - stack / 2.0 + step * (size.x + gap), y)
                }
            };
            trace!("Placed {:?} at {position:?}", graph.nodes[index].id);
            positions[index] = Some(position);
        }
    }

    positions
}
