use derive_more::{Constructor, Display};
use graph_layout::{Point, RankDir};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Kind of a process node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    UserTask,
    ServiceTask,
    Gateway,
    Start,
    End,
    Swimlane,
}

impl NodeKind {
    /// Activity nodes take part in the layered layout
    pub fn is_activity(self) -> bool {
        matches!(self, NodeKind::UserTask | NodeKind::ServiceTask | NodeKind::Gateway)
    }

    /// Start and end markers, placed outside the lanes
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeKind::Start | NodeKind::End)
    }
}

/// Overall flow orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum Direction {
    /// Flow left to right, lanes side by side
    #[default]
    #[serde(rename = "LR")]
    #[display("LR")]
    LeftToRight,
    /// Flow top to bottom, lanes stacked as horizontal bands
    #[serde(rename = "TB")]
    #[display("TB")]
    TopToBottom,
}

impl Direction {
    pub fn rank_dir(self) -> RankDir {
        match self {
            Direction::LeftToRight => RankDir::LeftToRight,
            Direction::TopToBottom => RankDir::TopToBottom,
        }
    }

    /// Connector sides matching the flow
    pub fn handles(self) -> Handles {
        match self {
            Direction::LeftToRight => Handles {
                target: HandleSide::Left,
                source: HandleSide::Right,
            },
            Direction::TopToBottom => Handles {
                target: HandleSide::Top,
                source: HandleSide::Bottom,
            },
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::TopToBottom,
            Direction::TopToBottom => Direction::LeftToRight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction {0:?}, expected LR or TB")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(Direction::LeftToRight),
            "TB" => Ok(Direction::TopToBottom),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Which side of a node receives incoming edges and which emits outgoing ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handles {
    pub target: HandleSide,
    pub source: HandleSide,
}

/// Absolute canvas position of a node's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Constructor)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Self::new(point.x, point.y)
    }
}

/// Axis-aligned rectangle on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Constructor)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneStyle {
    pub dashed_border: bool,
    pub tinted: bool,
}

/// Size and styling of a lane background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneFrame {
    pub width: f32,
    pub height: f32,
    pub style: LaneStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_id: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<Handles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<LaneFrame>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            kind,
            lane_id: None,
            description: None,
            config: serde_json::Value::Null,
            position: Position::default(),
            handles: None,
            frame: None,
        }
    }

    pub fn in_lane(mut self, lane_id: impl Into<String>) -> Self {
        self.lane_id = Some(lane_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Touches a start, end or swimlane node (or an unknown node) and is
    /// left out of the solver
    #[serde(default)]
    pub is_structural: bool,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let (source, target) = (source.into(), target.into());
        Self {
            id: format!("{source}->{target}"),
            source,
            target,
            label: None,
            is_structural: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_lane_id: Option<String>,
    /// Created by the layout to hold nodes without a lane
    #[serde(default)]
    pub synthetic: bool,
}

impl Lane {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            next_lane_id: None,
            synthetic: false,
        }
    }

    pub fn style(&self) -> LaneStyle {
        LaneStyle {
            dashed_border: self.synthetic,
            tinted: self.synthetic,
        }
    }
}

/// Canonical process graph, the input of the layout pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub lanes: Vec<Lane>,
}

impl ProcessGraph {
    /// Build a graph, computing which edges are structural
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, lanes: Vec<Lane>) -> Self {
        let mut graph = Self { nodes, edges, lanes };
        graph.refresh_structural_edges();
        graph
    }

    /// First node with the given id
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn lane(&self, id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.id == id)
    }

    pub fn activity_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.kind.is_activity())
    }

    /// Branch condition of an edge leaving a gateway
    pub fn branch_label<'a>(&'a self, edge: &'a Edge) -> Option<&'a str> {
        let source = self.node(&edge.source)?;
        if source.kind == NodeKind::Gateway {
            edge.label.as_deref()
        } else {
            None
        }
    }

    pub fn refresh_structural_edges(&mut self) {
        let mut kinds: HashMap<&str, NodeKind> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            kinds.entry(node.id.as_str()).or_insert(node.kind);
        }

        let is_activity =
            |id: &str| kinds.get(id).is_some_and(|kind| kind.is_activity());
        for edge in &mut self.edges {
            edge.is_structural = !(is_activity(&edge.source) && is_activity(&edge.target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("LR".parse::<Direction>(), Ok(Direction::LeftToRight));
        assert_eq!("tb".parse::<Direction>(), Ok(Direction::TopToBottom));
        assert!("diagonal".parse::<Direction>().is_err());
        assert_eq!(Direction::TopToBottom.to_string(), "TB");
        assert_eq!(Direction::LeftToRight.toggled(), Direction::TopToBottom);
    }

    #[test]
    fn test_direction_serde() {
        assert_eq!(serde_json::to_string(&Direction::TopToBottom).unwrap(), "\"TB\"");
        let direction: Direction = serde_json::from_str("\"LR\"").unwrap();
        assert_eq!(direction, Direction::LeftToRight);
    }

    #[test]
    fn test_structural_edges() {
        let graph = ProcessGraph::new(
            vec![
                Node::new("start", NodeKind::Start),
                Node::new("a", NodeKind::UserTask),
                Node::new("b", NodeKind::Gateway),
            ],
            vec![
                Edge::new("start", "a"),
                Edge::new("a", "b"),
                Edge::new("b", "ghost"),
            ],
            vec![],
        );
        let flags: Vec<bool> = graph.edges.iter().map(|e| e.is_structural).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_branch_label_only_from_gateway() {
        let graph = ProcessGraph::new(
            vec![
                Node::new("a", NodeKind::UserTask),
                Node::new("gw", NodeKind::Gateway),
                Node::new("b", NodeKind::ServiceTask),
            ],
            vec![
                Edge::new("a", "gw").with_label("submit"),
                Edge::new("gw", "b").with_label("approved"),
            ],
            vec![],
        );
        assert_eq!(graph.branch_label(&graph.edges[0]), None);
        assert_eq!(graph.branch_label(&graph.edges[1]), Some("approved"));
        // The raw label is untouched either way
        assert_eq!(graph.edges[0].label.as_deref(), Some("submit"));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 25.0, 15.0));
        assert_eq!(a.center(), Position::new(5.0, 5.0));
    }
}
