//! Mapping of solver coordinates onto swimlanes
//!
//! The two directions share the grouping step but size lanes differently:
//!
//! - Left to right: lanes are fixed-width columns placed side by side. All
//!   lanes share one height, sized to the tallest content overall. Content
//!   wider than a lane is shrunk to fit, narrower content is centered.
//! - Top to bottom: lanes are bands stacked downward. Each band is as tall
//!   as its own content, and all bands share the width of the widest
//!   content. Nothing is scaled.

use graph_layout::{Point, Vec2};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::model::{Direction, Position, ProcessGraph, Rect};
use crate::sizes::node_size;
use crate::solver::SolvedLayout;

/// Absolute geometry of the activity nodes and lanes
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Position of every activity node, indexed like `graph.nodes`.
    /// `None` for structural nodes.
    pub positions: Vec<Option<Position>>,

    /// Background rectangle of every lane, indexed like `graph.lanes`
    pub lanes: Vec<Rect>,

    /// Area covered by all lanes
    pub extent: Rect,
}

/// Axis-aligned bounds of solver output
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    fn of(pos: Point, size: Vec2) -> Self {
        Self {
            min: pos,
            max: Point::new(pos.x + size.x, pos.y + size.y),
        }
    }

    fn merge(this: Option<Self>, other: Self) -> Self {
        match this {
            None => other,
            Some(b) => Self {
                min: Point::new(b.min.x.min(other.min.x), b.min.y.min(other.min.y)),
                max: Point::new(b.max.x.max(other.max.x), b.max.y.max(other.max.y)),
            },
        }
    }

    fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

struct Member {
    node: usize,
    lane: Option<usize>,
    raw: Point,
}

/// Activity nodes grouped by lane, with content bounds
struct Grouping {
    members: Vec<Member>,
    per_lane: Vec<Option<Bounds>>,
    global: Option<Bounds>,
}

fn group_by_lane(graph: &ProcessGraph, solved: &SolvedLayout) -> Grouping {
    let lane_index: HashMap<&str, usize> = graph
        .lanes
        .iter()
        .enumerate()
        .map(|(i, lane)| (lane.id.as_str(), i))
        .collect();

    let mut grouping = Grouping {
        members: Vec::new(),
        per_lane: vec![None; graph.lanes.len()],
        global: None,
    };

    for (index, node) in graph.nodes.iter().enumerate() {
        if !node.kind.is_activity() {
            continue;
        }

        let raw = solved.position(index).unwrap_or_else(|| {
            warn!("Node {:?} has no solver position", node.id);
            Point::new(0.0, 0.0)
        });
        let bounds = Bounds::of(raw, node_size(node.kind));
        let lane = node
            .lane_id
            .as_deref()
            .and_then(|id| lane_index.get(id).copied());

        grouping.global = Some(Bounds::merge(grouping.global, bounds));
        if let Some(lane) = lane {
            grouping.per_lane[lane] = Some(Bounds::merge(grouping.per_lane[lane], bounds));
        }
        grouping.members.push(Member {
            node: index,
            lane,
            raw,
        });
    }

    grouping
}

/// Place activity nodes and lane backgrounds on the canvas
pub fn compose(
    graph: &ProcessGraph,
    solved: &SolvedLayout,
    direction: Direction,
    config: &LayoutConfig,
) -> Composition {
    let grouping = group_by_lane(graph, solved);
    let composition = match direction {
        Direction::LeftToRight => compose_left_to_right(graph, &grouping, config),
        Direction::TopToBottom => compose_top_to_bottom(graph, &grouping, config),
    };
    debug!(
        "Composed {} lane(s) {direction}, extent {:?}",
        composition.lanes.len(),
        composition.extent
    );
    composition
}

fn compose_left_to_right(
    graph: &ProcessGraph,
    grouping: &Grouping,
    config: &LayoutConfig,
) -> Composition {
    let padding = config.lane_padding;
    let available = config.lane_content_width().max(1.0);

    // One height for every lane, from the content of all lanes together
    let content_height = grouping.global.map_or(0.0, |b| b.height());
    let min_y = grouping.global.map_or(0.0, |b| b.min.y);
    let lane_height = (content_height + 2.0 * padding).max(config.min_lane_height);
    let offset_y = (lane_height - content_height) / 2.0;

    let lanes: Vec<Rect> = (0..graph.lanes.len())
        .map(|i| Rect::new(i as f32 * config.lane_width, 0.0, config.lane_width, lane_height))
        .collect();
    let extent = Rect::new(0.0, 0.0, lanes.len() as f32 * config.lane_width, lane_height);

    // (scale, centering offset, left edge of the content) per lane
    let fits: Vec<Option<(f32, f32, f32)>> = grouping
        .per_lane
        .iter()
        .map(|bounds| {
            bounds.map(|b| {
                let width = b.width();
                if width > available {
                    (available / width, 0.0, b.min.x)
                } else {
                    (1.0, (available - width) / 2.0, b.min.x)
                }
            })
        })
        .collect();

    let mut positions = vec![None; graph.nodes.len()];
    for member in &grouping.members {
        let y = offset_y + (member.raw.y - min_y);
        let fit = member.lane.and_then(|lane| fits[lane].map(|fit| (lane, fit)));
        let x = match fit {
            Some((lane, (scale, offset, min_x))) => {
                lanes[lane].x + padding + offset + (member.raw.x - min_x) * scale
            }
            None => {
                let (global_width, global_min_x) =
                    grouping.global.map_or((0.0, 0.0), |b| (b.width(), b.min.x));
                (extent.width - global_width) / 2.0 + (member.raw.x - global_min_x)
            }
        };
        positions[member.node] = Some(Position::new(x, y));
    }

    Composition {
        positions,
        lanes,
        extent,
    }
}

fn compose_top_to_bottom(
    graph: &ProcessGraph,
    grouping: &Grouping,
    config: &LayoutConfig,
) -> Composition {
    let padding = config.lane_padding;

    // Raw x is kept, so the widest content is measured from the origin
    let content_width = grouping.global.map_or(0.0, |b| b.max.x);
    let lane_width = (content_width + config.lane_margin).max(config.min_lane_width);

    let mut next_y = 0.0;
    let lanes: Vec<Rect> = grouping
        .per_lane
        .iter()
        .map(|bounds| {
            let content_height = bounds.map_or(0.0, |b| b.height());
            let height = (content_height + 2.0 * padding).max(config.min_lane_height);
            let rect = Rect::new(0.0, next_y, lane_width, height);
            next_y += height;
            rect
        })
        .collect();
    let extent = Rect::new(0.0, 0.0, lane_width, next_y);

    let mut positions = vec![None; graph.nodes.len()];
    for member in &grouping.members {
        let band = member
            .lane
            .and_then(|lane| grouping.per_lane[lane].map(|b| (lanes[lane], b)));
        let y = match band {
            Some((rect, bounds)) => rect.y + padding + (member.raw.y - bounds.min.y),
            None => {
                let (global_height, global_min_y) =
                    grouping.global.map_or((0.0, 0.0), |b| (b.height(), b.min.y));
                (extent.height - global_height) / 2.0 + (member.raw.y - global_min_y)
            }
        };
        positions[member.node] = Some(Position::new(member.raw.x, y));
    }

    Composition {
        positions,
        lanes,
        extent,
    }
}
