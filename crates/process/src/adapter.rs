//! Normalization of loosely-typed process snapshots
//!
//! Process definitions reach the layout from the AI backend and from manual
//! edits in the editor. Both are accepted here as-is and turned into a
//! [`ProcessGraph`] with a resolved [`NodeKind`] for every node. Nothing in
//! this module fails: unknown or missing data falls back to safe defaults.

use crate::model::{Edge, Lane, Node, NodeKind, Position, ProcessGraph};
use crate::orphans::UNASSIGNED_LANE_ID;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Process graph as received from collaborators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessSnapshot {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
    pub lanes: Vec<RawLane>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(alias = "swimlaneId", alias = "lane")]
    pub lane_id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub config: Value,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEdge {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLane {
    pub id: String,
    pub name: Option<String>,
    pub next_lane_id: Option<String>,
}

/// Classify a node from a free-form configuration hint
///
/// Best effort: anything mentioning a gateway is a gateway, e-mail and
/// service hints are service tasks, everything else is a user task.
pub fn classify_hint(hint: Option<&str>) -> NodeKind {
    let Some(hint) = hint else {
        return NodeKind::UserTask;
    };

    let hint = hint.to_ascii_lowercase();
    if hint.contains("gateway") {
        NodeKind::Gateway
    } else if hint.contains("email") || hint.contains("service") {
        NodeKind::ServiceTask
    } else {
        NodeKind::UserTask
    }
}

/// Parse an explicit node type, ignoring case and `_`/`-`/space separators
pub fn parse_kind(kind: &str) -> Option<NodeKind> {
    let normalized: String = kind
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.as_str() {
        "usertask" | "task" => Some(NodeKind::UserTask),
        "servicetask" => Some(NodeKind::ServiceTask),
        "gateway" | "exclusivegateway" | "parallelgateway" | "inclusivegateway" => {
            Some(NodeKind::Gateway)
        }
        "start" | "startevent" => Some(NodeKind::Start),
        "end" | "endevent" => Some(NodeKind::End),
        "swimlane" | "lane" => Some(NodeKind::Swimlane),
        _ => None,
    }
}

/// Resolve the kind of a raw node: explicit type first, then the
/// configuration hint, then the unknown type string itself
pub fn resolve_kind(node: &RawNode) -> NodeKind {
    if let Some(kind) = node.kind.as_deref().and_then(parse_kind) {
        return kind;
    }

    let hint = node
        .config
        .get("type")
        .and_then(Value::as_str)
        .or(node.kind.as_deref());
    classify_hint(hint)
}

/// Turn a snapshot into a canonical process graph
pub fn normalize(snapshot: &ProcessSnapshot) -> ProcessGraph {
    let lanes = normalize_lanes(&snapshot.lanes);

    let nodes: Vec<Node> = snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_node(index, raw))
        .collect();

    let mut seen_ids: HashMap<String, usize> = HashMap::new();
    let edges = snapshot
        .edges
        .iter()
        .map(|raw| {
            let base = raw
                .id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("{}->{}", raw.source, raw.target));
            let count = seen_ids.entry(base.clone()).or_insert(0);
            *count += 1;
            let id = if *count == 1 {
                base
            } else {
                format!("{base}#{count}")
            };

            Edge {
                id,
                source: raw.source.clone(),
                target: raw.target.clone(),
                label: raw.label.clone(),
                is_structural: false,
            }
        })
        .collect();

    let graph = ProcessGraph::new(nodes, edges, lanes);
    debug!(
        "Normalized snapshot: {} node(s), {} edge(s), {} lane(s)",
        graph.nodes.len(),
        graph.edges.len(),
        graph.lanes.len()
    );
    graph
}

fn normalize_node(index: usize, raw: &RawNode) -> Node {
    let kind = resolve_kind(raw);
    let id = if raw.id.is_empty() {
        format!("node-{index}")
    } else {
        raw.id.clone()
    };

    // Only activities belong to a lane
    let lane_id = raw
        .lane_id
        .clone()
        .filter(|lane| kind.is_activity() && !lane.is_empty());

    Node {
        label: raw.label.clone().unwrap_or_else(|| id.clone()),
        id,
        kind,
        lane_id,
        description: raw.description.clone(),
        config: raw.config.clone(),
        position: raw.position.unwrap_or_default(),
        handles: None,
        frame: None,
    }
}

fn normalize_lanes(raw_lanes: &[RawLane]) -> Vec<Lane> {
    let mut seen = HashSet::new();
    raw_lanes
        .iter()
        .filter(|raw| {
            if raw.id.is_empty() {
                warn!("Ignoring lane without id");
                return false;
            }
            if !seen.insert(raw.id.as_str()) {
                warn!("Ignoring duplicate lane {:?}", raw.id);
                return false;
            }
            true
        })
        .map(|raw| Lane {
            id: raw.id.clone(),
            name: raw.name.clone().unwrap_or_else(|| raw.id.clone()),
            next_lane_id: raw.next_lane_id.clone(),
            synthetic: raw.id == UNASSIGNED_LANE_ID,
        })
        .collect()
}
