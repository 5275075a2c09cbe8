use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::adapter::{normalize, ProcessSnapshot};
use crate::compositor::compose;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::model::{Direction, Edge, Lane, LaneFrame, Node, NodeKind, ProcessGraph};
use crate::orphans::resolve_orphans;
use crate::solver::solve;
use crate::terminals::place_terminals;

/// Laid-out process, ready for the canvas renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub direction: Direction,

    /// Lane background nodes first, in lane order, then the process nodes in
    /// input order
    pub nodes: Vec<Node>,

    /// Passed through unchanged
    pub edges: Vec<Edge>,

    /// Input lanes, plus the unassigned lane when it was needed
    pub lanes: Vec<Lane>,

    /// Set when the solver failed and the input was returned as-is
    #[serde(skip)]
    pub fallback: Option<LayoutError>,
}

impl LayoutResult {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.id == id && node.kind != NodeKind::Swimlane)
    }

    /// Background node of the given lane
    pub fn lane_node(&self, lane_id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.id == lane_id && node.kind == NodeKind::Swimlane)
    }

    /// Input graph returned untouched after a solver failure
    fn unlaid(graph: &ProcessGraph, direction: Direction, err: LayoutError) -> Self {
        Self {
            direction,
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            lanes: graph.lanes.clone(),
            fallback: Some(err),
        }
    }
}

/// Lay out a process graph, propagating solver failures
///
/// The input is never modified. Swimlane nodes in the input are regenerated
/// from the lane list; one whose id matches a lane keeps its label and
/// configuration.
pub fn try_layout(
    graph: &ProcessGraph,
    direction: Direction,
    config: &LayoutConfig,
) -> Result<LayoutResult, LayoutError> {
    let config = config.sanitized();

    let mut working = graph.clone();
    let mut previous_lane_nodes: HashMap<String, Node> = HashMap::new();
    working.nodes.retain(|node| {
        if node.kind == NodeKind::Swimlane {
            previous_lane_nodes
                .entry(node.id.clone())
                .or_insert_with(|| node.clone());
            false
        } else {
            true
        }
    });

    resolve_orphans(&mut working);

    let solved = solve(&working, direction, &config)?;
    let composition = compose(&working, &solved, direction, &config);
    let terminals = place_terminals(&working, composition.extent, direction, &config);

    let mut nodes = Vec::with_capacity(working.lanes.len() + working.nodes.len());
    for (lane, rect) in working.lanes.iter().zip(&composition.lanes) {
        let mut node = previous_lane_nodes
            .remove(&lane.id)
            .unwrap_or_else(|| Node::new(lane.id.clone(), NodeKind::Swimlane).with_label(&lane.name));
        node.lane_id = None;
        node.handles = None;
        node.position = rect.origin();
        node.frame = Some(LaneFrame {
            width: rect.width,
            height: rect.height,
            style: lane.style(),
        });
        nodes.push(node);
    }
    if !previous_lane_nodes.is_empty() {
        debug!("Dropped {} stale lane node(s)", previous_lane_nodes.len());
    }

    for (index, mut node) in working.nodes.into_iter().enumerate() {
        let position = composition.positions[index].or(terminals[index]);
        if let Some(position) = position {
            node.position = position;
            node.handles = Some(direction.handles());
        }
        nodes.push(node);
    }

    info!(
        "Laid out {} node(s) in {} lane(s) {direction}",
        nodes.len(),
        working.lanes.len()
    );

    Ok(LayoutResult {
        direction,
        nodes,
        edges: working.edges,
        lanes: working.lanes,
        fallback: None,
    })
}

/// Lay out a process graph, falling back to the unlaid-out input when the
/// solver fails
pub fn layout(graph: &ProcessGraph, direction: Direction, config: &LayoutConfig) -> LayoutResult {
    match try_layout(graph, direction, config) {
        Ok(result) => result,
        Err(err) => {
            warn!("Layout failed, keeping original positions: {err}");
            LayoutResult::unlaid(graph, direction, err)
        }
    }
}

/// Normalize a raw snapshot and lay it out
pub fn layout_snapshot(
    snapshot: &ProcessSnapshot,
    direction: Direction,
    config: &LayoutConfig,
) -> LayoutResult {
    layout(&normalize(snapshot), direction, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Position, Rect};
    use crate::orphans::UNASSIGNED_LANE_ID;
    use serde_json::json;
    use test_log::test;

    fn lane_rect(result: &LayoutResult, lane_id: &str) -> Rect {
        let node = result.lane_node(lane_id).unwrap();
        let frame = node.frame.unwrap();
        Rect::new(node.position.x, node.position.y, frame.width, frame.height)
    }

    fn position(result: &LayoutResult, id: &str) -> Position {
        result.node(id).unwrap().position
    }

    /// A (L1) -> B (L1) -> C (L2)
    fn three_step_process() -> ProcessGraph {
        ProcessGraph::new(
            vec![
                Node::new("A", NodeKind::UserTask).in_lane("L1"),
                Node::new("B", NodeKind::ServiceTask).in_lane("L1"),
                Node::new("C", NodeKind::Gateway).in_lane("L2"),
            ],
            vec![Edge::new("A", "B"), Edge::new("B", "C")],
            vec![Lane::new("L1", "Clerk"), Lane::new("L2", "Manager")],
        )
    }

    fn approval_process() -> ProcessGraph {
        ProcessGraph::new(
            vec![
                Node::new("start", NodeKind::Start),
                Node::new("submit", NodeKind::UserTask).in_lane("requester"),
                Node::new("check", NodeKind::Gateway).in_lane("manager"),
                Node::new("approve", NodeKind::UserTask).in_lane("manager"),
                Node::new("notify", NodeKind::ServiceTask).in_lane("system"),
                Node::new("archive", NodeKind::ServiceTask),
                Node::new("end", NodeKind::End),
            ],
            vec![
                Edge::new("start", "submit"),
                Edge::new("submit", "check"),
                Edge::new("check", "approve").with_label("amount > 1000"),
                Edge::new("check", "notify").with_label("otherwise"),
                Edge::new("approve", "notify"),
                Edge::new("notify", "archive"),
                Edge::new("approve", "submit").with_label("rework"),
                Edge::new("archive", "end"),
            ],
            vec![
                Lane::new("requester", "Requester"),
                Lane::new("manager", "Manager"),
                Lane::new("system", "System"),
            ],
        )
    }

    #[test]
    fn test_three_step_left_to_right() {
        let result = layout(&three_step_process(), Direction::LeftToRight, &LayoutConfig::default());
        assert!(!result.is_fallback());

        let l1 = lane_rect(&result, "L1");
        let l2 = lane_rect(&result, "L2");
        assert_eq!(l1.x, 0.0);
        assert_eq!(l2.x, l1.right());
        assert_eq!(l1.height, l2.height);

        let (a, b, c) = (position(&result, "A"), position(&result, "B"), position(&result, "C"));
        assert!(a.x < b.x);
        for x in [a.x, b.x] {
            assert!(x >= l1.x && x < l1.right());
        }
        assert!(c.x >= l2.x && c.x < l2.right());
        for y in [a.y, b.y, c.y] {
            assert!(y >= l1.y && y < l1.bottom());
        }
    }

    #[test]
    fn test_orphan_goes_to_dashed_lane_last() {
        let mut graph = three_step_process();
        graph.nodes.push(Node::new("D", NodeKind::UserTask));
        graph.edges.push(Edge::new("C", "D"));
        graph.refresh_structural_edges();

        let result = layout(&graph, Direction::LeftToRight, &LayoutConfig::default());
        let lane_ids: Vec<&str> = result.lanes.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(lane_ids, vec!["L1", "L2", UNASSIGNED_LANE_ID]);
        assert_eq!(result.node("D").unwrap().lane_id.as_deref(), Some(UNASSIGNED_LANE_ID));

        let style = |id: &str| result.lane_node(id).unwrap().frame.unwrap().style;
        assert!(style(UNASSIGNED_LANE_ID).dashed_border);
        assert!(style(UNASSIGNED_LANE_ID).tinted);
        assert!(!style("L1").dashed_border);
        assert!(!style("L2").dashed_border);

        let unassigned = lane_rect(&result, UNASSIGNED_LANE_ID);
        let d = position(&result, "D");
        assert_eq!(unassigned.x, lane_rect(&result, "L2").right());
        assert!(d.x >= unassigned.x && d.x < unassigned.right());
    }

    #[test]
    fn test_every_activity_node_has_a_known_lane() {
        for direction in [Direction::LeftToRight, Direction::TopToBottom] {
            let result = layout(&approval_process(), direction, &LayoutConfig::default());
            for node in result.nodes.iter().filter(|n| n.kind.is_activity()) {
                let lane_id = node.lane_id.as_deref().unwrap();
                assert!(result.lanes.iter().any(|lane| lane.id == lane_id));
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        for direction in [Direction::LeftToRight, Direction::TopToBottom] {
            let first = layout(&approval_process(), direction, &LayoutConfig::default());
            let second = layout(&approval_process(), direction, &LayoutConfig::default());
            assert_eq!(first, second);
            for (a, b) in first.nodes.iter().zip(&second.nodes) {
                assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
                assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
            }
        }
    }

    #[test]
    fn test_direction_round_trip_keeps_identity() {
        let graph = approval_process();
        let config = LayoutConfig::default();
        let lr = layout(&graph, Direction::LeftToRight, &config);
        let tb = layout(&graph, lr.direction.toggled(), &config);
        let back = layout(&graph, tb.direction.toggled(), &config);

        let ids = |r: &LayoutResult| r.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&lr), ids(&tb));
        assert_eq!(lr.edges, tb.edges);
        assert_eq!(lr, back);
        assert_ne!(position(&lr, "approve"), position(&tb, "approve"));
    }

    #[test]
    fn test_sequential_nodes_increase_left_to_right() {
        let graph = ProcessGraph::new(
            (1..=5)
                .map(|i| Node::new(format!("t{i}"), NodeKind::UserTask).in_lane("L1"))
                .collect(),
            (1..5).map(|i| Edge::new(format!("t{i}"), format!("t{}", i + 1))).collect(),
            vec![Lane::new("L1", "Clerk")],
        );
        let result = layout(&graph, Direction::LeftToRight, &LayoutConfig::default());
        let xs: Vec<f32> = (1..=5).map(|i| position(&result, &format!("t{i}")).x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");

        // Five tasks overflow the nominal lane width and get shrunk into it
        let lane = lane_rect(&result, "L1");
        assert!(xs.iter().all(|&x| x >= lane.x && x < lane.right()));
    }

    #[test]
    fn test_top_to_bottom_flow_goes_down() {
        let result = layout(&three_step_process(), Direction::TopToBottom, &LayoutConfig::default());
        let l1 = lane_rect(&result, "L1");
        let l2 = lane_rect(&result, "L2");
        assert_eq!(l2.y, l1.bottom());
        assert_eq!(l1.width, l2.width);

        let (a, b, c) = (position(&result, "A"), position(&result, "B"), position(&result, "C"));
        assert!(a.y < b.y);
        assert!(b.y >= l1.y && b.y < l1.bottom());
        assert!(c.y >= l2.y && c.y < l2.bottom());
        assert_eq!(result.node("A").unwrap().handles, Some(Direction::TopToBottom.handles()));
    }

    #[test]
    fn test_start_and_end_sit_outside_lanes() {
        let result = layout(&approval_process(), Direction::LeftToRight, &LayoutConfig::default());
        let first = lane_rect(&result, "requester");
        let last = lane_rect(&result, UNASSIGNED_LANE_ID);

        let start = position(&result, "start");
        let end = position(&result, "end");
        assert!(start.x < first.x);
        assert!(end.x > last.right());
        assert_eq!(start.y + 20.0, first.y + first.height / 2.0);
        assert_eq!(end.y, start.y);
    }

    #[test]
    fn test_empty_graph() {
        let result = layout(&ProcessGraph::default(), Direction::LeftToRight, &LayoutConfig::default());
        assert!(!result.is_fallback());
        assert!(result.nodes.is_empty());
        assert!(result.lanes.is_empty());

        let graph = ProcessGraph::new(
            vec![Node::new("s", NodeKind::Start), Node::new("e", NodeKind::End)],
            vec![Edge::new("s", "e")],
            vec![],
        );
        let result = layout(&graph, Direction::TopToBottom, &LayoutConfig::default());
        assert_eq!(result.nodes.len(), 2);
        assert!(result.nodes.iter().all(|n| n.kind.is_terminal()));
        assert!(position(&result, "s").y < position(&result, "e").y);
    }

    #[test]
    fn test_solver_failure_returns_input_unchanged() {
        let mut graph = three_step_process();
        graph.nodes[0].position = Position::new(12.0, 34.0);
        graph.edges.push(Edge::new("C", "A"));
        graph.refresh_structural_edges();
        let config = LayoutConfig {
            break_cycles: false,
            ..Default::default()
        };

        assert!(try_layout(&graph, Direction::LeftToRight, &config).is_err());

        let result = layout(&graph, Direction::LeftToRight, &config);
        assert!(matches!(result.fallback, Some(LayoutError::Cycle { .. })));
        assert_eq!(result.nodes, graph.nodes);
        assert_eq!(result.edges, graph.edges);
        assert_eq!(result.lanes, graph.lanes);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let graph = approval_process();
        let before = graph.clone();
        let _ = layout(&graph, Direction::TopToBottom, &LayoutConfig::default());
        assert_eq!(graph, before);
    }

    #[test]
    fn test_lane_nodes_are_regenerated() {
        let mut graph = three_step_process();
        graph.nodes.insert(
            0,
            Node::new("L2", NodeKind::Swimlane).with_label("Manager (renamed)"),
        );
        graph.nodes.push(Node::new("old-lane", NodeKind::Swimlane));

        let result = layout(&graph, Direction::LeftToRight, &LayoutConfig::default());
        let lanes: Vec<(&str, &str)> = result
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Swimlane)
            .map(|n| (n.id.as_str(), n.label.as_str()))
            .collect();
        assert_eq!(lanes, vec![("L1", "Clerk"), ("L2", "Manager (renamed)")]);
        // Lane backgrounds come first
        assert_eq!(result.nodes[0].id, "L1");
    }

    #[test]
    fn test_snapshot_output_lays_out_again_identically() {
        let snapshot: ProcessSnapshot = serde_json::from_value(json!({
            "nodes": [
                { "id": "s", "type": "start" },
                { "id": "fill", "label": "Fill form", "laneId": "emp" },
                { "id": "mail", "config": { "type": "email" }, "laneId": "sys" },
                { "id": "route", "type": "exclusiveGateway" },
                { "id": "e", "type": "end" }
            ],
            "edges": [
                { "source": "s", "target": "fill" },
                { "source": "fill", "target": "route" },
                { "source": "route", "target": "mail", "label": "yes" },
                { "source": "mail", "target": "e" }
            ],
            "lanes": [{ "id": "emp", "name": "Employee" }, { "id": "sys", "name": "System" }]
        }))
        .unwrap();
        let config = LayoutConfig::default();
        let first = layout_snapshot(&snapshot, Direction::LeftToRight, &config);
        assert_eq!(first.node("mail").unwrap().kind, NodeKind::ServiceTask);
        assert_eq!(first.node("route").unwrap().lane_id.as_deref(), Some(UNASSIGNED_LANE_ID));

        let json = serde_json::to_value(&first).unwrap();
        let again: ProcessSnapshot = serde_json::from_value(json).unwrap();
        let second = layout_snapshot(&again, Direction::LeftToRight, &config);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.lanes, second.lanes);
    }
}
