use crate::model::{Lane, ProcessGraph};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Id of the lane collecting activity nodes without a valid lane
pub const UNASSIGNED_LANE_ID: &str = "__unassigned__";

/// Display name of the unassigned lane
pub const UNASSIGNED_LANE_NAME: &str = "Unassigned (System/Error)";

impl Lane {
    pub fn unassigned() -> Self {
        Self {
            id: UNASSIGNED_LANE_ID.to_string(),
            name: UNASSIGNED_LANE_NAME.to_string(),
            next_lane_id: None,
            synthetic: true,
        }
    }
}

/// Give every activity node a lane
///
/// Activity nodes with no lane, or with a lane id that is not in the lane
/// list, are moved to the unassigned lane. The unassigned lane is added when
/// needed and always kept last. Running this twice is a no-op.
///
/// Returns the number of nodes that were reassigned.
pub fn resolve_orphans(graph: &mut ProcessGraph) -> usize {
    let known: HashSet<&str> = graph.lanes.iter().map(|lane| lane.id.as_str()).collect();

    let orphans: Vec<usize> = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind.is_activity())
        .filter(|(_, node)| {
            node.lane_id
                .as_deref()
                .map_or(true, |lane_id| !known.contains(lane_id))
        })
        .map(|(index, _)| index)
        .collect();

    if !orphans.is_empty() {
        if !known.contains(UNASSIGNED_LANE_ID) {
            graph.lanes.push(Lane::unassigned());
        }

        for &index in &orphans {
            let node = &mut graph.nodes[index];
            if let Some(dangling) = &node.lane_id {
                warn!("Node {:?} refers to unknown lane {dangling:?}", node.id);
            }
            node.lane_id = Some(UNASSIGNED_LANE_ID.to_string());
        }
        debug!("Moved {} orphan node(s) to the unassigned lane", orphans.len());
    }

    // Keep the unassigned lane last, whatever order it came in
    if let Some(position) = graph.lanes.iter().position(|lane| lane.id == UNASSIGNED_LANE_ID) {
        let mut lane = graph.lanes.remove(position);
        lane.synthetic = true;
        graph.lanes.push(lane);
    }

    orphans.len()
}
