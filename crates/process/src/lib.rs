//! Swimlane layout for business-process graphs
//!
//! Given process nodes (tasks, gateways, start and end markers), the edges
//! between them and an ordered list of lanes, this crate computes absolute
//! canvas positions for every node and a background rectangle for every
//! lane, either flowing left to right or top to bottom.
//!
//! The pipeline runs in this order:
//!
//! 1. [`normalize`] resolves loosely-typed input into a [`ProcessGraph`]
//! 2. [`resolve_orphans`] moves activity nodes without a lane to the
//!    unassigned lane
//! 3. [`solve`] runs the layered solver on the activity subgraph
//! 4. [`compose`] maps solver coordinates onto the lanes
//! 5. [`place_terminals`] puts start and end markers around the lanes
//!
//! [`layout`] runs all of it and never fails: if the solver does, the input
//! comes back unchanged with [`LayoutResult::fallback`] set.
//!
//! ```
//! use flowlane_process::{layout, Direction, Edge, Lane, LayoutConfig, Node, NodeKind, ProcessGraph};
//!
//! let graph = ProcessGraph::new(
//!     vec![
//!         Node::new("review", NodeKind::UserTask).in_lane("clerk"),
//!         Node::new("notify", NodeKind::ServiceTask),
//!     ],
//!     vec![Edge::new("review", "notify")],
//!     vec![Lane::new("clerk", "Clerk")],
//! );
//!
//! let result = layout(&graph, Direction::LeftToRight, &LayoutConfig::default());
//! assert_eq!(result.lanes.len(), 2);
//! assert!(result.node("review").unwrap().position.x < result.node("notify").unwrap().position.x);
//! ```

pub mod adapter;
pub mod compositor;
pub mod config;
pub mod error;
pub mod model;
pub mod orphans;
pub mod pipeline;
pub mod requests;
pub mod sizes;
pub mod solver;
pub mod terminals;

pub use adapter::{
    classify_hint, normalize, parse_kind, resolve_kind, ProcessSnapshot, RawEdge, RawLane, RawNode,
};
pub use compositor::{compose, Composition};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use model::{
    Direction, Edge, HandleSide, Handles, Lane, LaneFrame, LaneStyle, Node, NodeKind,
    ParseDirectionError, Position, ProcessGraph, Rect,
};
pub use orphans::{resolve_orphans, UNASSIGNED_LANE_ID, UNASSIGNED_LANE_NAME};
pub use pipeline::{layout, layout_snapshot, try_layout, LayoutResult};
pub use requests::{LayoutRequests, LayoutTicket};
pub use sizes::node_size;
pub use solver::{solve, SolvedLayout};
pub use terminals::place_terminals;
