use graph_layout::{Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::model::{Direction, ProcessGraph};
use crate::sizes::node_size;

/// Relative positions computed by the layered solver
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedLayout {
    /// Top-left corner of every activity node, indexed like `graph.nodes`.
    /// `None` for structural nodes.
    pub positions: Vec<Option<Point>>,

    /// Edges reversed to break cycles, as (source id, target id)
    pub reversed: Vec<(String, String)>,

    /// Remaining crossings between adjacent ranks
    pub crossings: usize,
}

impl SolvedLayout {
    pub fn position(&self, index: usize) -> Option<Point> {
        self.positions.get(index).copied().flatten()
    }
}

/// Run the layered solver on the activity subgraph
///
/// Start, end and swimlane nodes never reach the solver, nor do edges
/// touching them, edges to unknown nodes or self loops.
pub fn solve(
    graph: &ProcessGraph,
    direction: Direction,
    config: &LayoutConfig,
) -> Result<SolvedLayout, LayoutError> {
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    let mut solver_graph = DiGraphMap::<usize, ()>::new();
    for (index, node) in graph.nodes.iter().enumerate() {
        if node.kind.is_activity() && !index_of.contains_key(node.id.as_str()) {
            index_of.insert(node.id.as_str(), index);
            solver_graph.add_node(index);
        }
    }

    for edge in &graph.edges {
        let (Some(&source), Some(&target)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) else {
            if graph.node(&edge.source).is_none() || graph.node(&edge.target).is_none() {
                warn!("Edge {:?} points to an unknown node", edge.id);
            } else {
                trace!("Edge {:?} left out of the solver", edge.id);
            }
            continue;
        };
        if source != target {
            solver_graph.add_edge(source, target, ());
        }
    }

    debug!(
        "Solving {} activity node(s) and {} edge(s) {direction}",
        solver_graph.node_count(),
        solver_graph.edge_count()
    );

    let engine = config.engine(direction);
    let layers = engine
        .compute_layers(&solver_graph)
        .map_err(|err| LayoutError::from_solver(err, graph))?;
    let sizes = |index: usize| {
        graph
            .nodes
            .get(index)
            .map_or(Vec2::zero(), |node| node_size(node.kind))
    };
    let solved = engine
        .compute_positions(&layers, &sizes)
        .map_err(|err| LayoutError::from_solver(err, graph))?;

    let mut positions = vec![None; graph.nodes.len()];
    for (index, point) in solved {
        positions[index] = Some(point);
    }

    let reversed = layers
        .reversed
        .iter()
        .map(|&(from, to)| (graph.nodes[from].id.clone(), graph.nodes[to].id.clone()))
        .collect();

    Ok(SolvedLayout {
        positions,
        reversed,
        crossings: layers.crossings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Lane, Node, NodeKind};
    use test_log::test;

    fn process() -> ProcessGraph {
        ProcessGraph::new(
            vec![
                Node::new("start", NodeKind::Start),
                Node::new("a", NodeKind::UserTask).in_lane("L1"),
                Node::new("b", NodeKind::ServiceTask).in_lane("L1"),
                Node::new("c", NodeKind::Gateway).in_lane("L2"),
                Node::new("end", NodeKind::End),
            ],
            vec![
                Edge::new("start", "a"),
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "end"),
            ],
            vec![Lane::new("L1", "Clerk"), Lane::new("L2", "Manager")],
        )
    }

    #[test]
    fn test_structural_nodes_are_skipped() {
        let solved = solve(&process(), Direction::LeftToRight, &LayoutConfig::default()).unwrap();
        assert_eq!(solved.position(0), None);
        assert_eq!(solved.position(4), None);
        assert!(solved.position(1).is_some());
        assert!(solved.position(3).is_some());
    }

    #[test]
    fn test_flow_axis_follows_direction() {
        let graph = process();
        let config = LayoutConfig::default();

        let lr = solve(&graph, Direction::LeftToRight, &config).unwrap();
        let (a, b) = (lr.position(1).unwrap(), lr.position(2).unwrap());
        assert!(a.x < b.x);
        assert_eq!(a.y, b.y);

        let tb = solve(&graph, Direction::TopToBottom, &config).unwrap();
        let (a, b) = (tb.position(1).unwrap(), tb.position(2).unwrap());
        assert!(a.y < b.y);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_cycles_are_reported_by_id() {
        let mut graph = process();
        graph.edges.push(Edge::new("c", "a").with_label("rejected"));
        graph.refresh_structural_edges();

        let solved = solve(&graph, Direction::LeftToRight, &LayoutConfig::default()).unwrap();
        assert_eq!(solved.reversed, vec![("c".to_string(), "a".to_string())]);

        let strict = LayoutConfig {
            break_cycles: false,
            ..Default::default()
        };
        assert!(matches!(
            solve(&graph, Direction::LeftToRight, &strict),
            Err(LayoutError::Cycle { .. })
        ));
    }

    #[test]
    fn test_edges_to_unknown_nodes_are_ignored() {
        let mut graph = process();
        graph.edges.push(Edge::new("a", "ghost"));
        graph.edges.push(Edge::new("b", "b"));
        let solved = solve(&graph, Direction::LeftToRight, &LayoutConfig::default()).unwrap();
        assert_eq!(solved.positions.iter().flatten().count(), 3);
    }
}
