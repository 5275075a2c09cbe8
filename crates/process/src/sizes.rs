use crate::model::NodeKind;
use graph_layout::Vec2;

pub const TASK_SIZE: Vec2 = Vec2 { x: 180.0, y: 64.0 };
pub const GATEWAY_SIZE: Vec2 = Vec2 { x: 56.0, y: 56.0 };
pub const TERMINAL_SIZE: Vec2 = Vec2 { x: 40.0, y: 40.0 };

/// Rendered size of a node of the given kind
///
/// Swimlanes have no intrinsic size, their frame is computed by the
/// compositor.
pub fn node_size(kind: NodeKind) -> Vec2 {
    match kind {
        NodeKind::UserTask | NodeKind::ServiceTask => TASK_SIZE,
        NodeKind::Gateway => GATEWAY_SIZE,
        NodeKind::Start | NodeKind::End => TERMINAL_SIZE,
        NodeKind::Swimlane => Vec2::zero(),
    }
}
