//! Generic layered graph layout
//!
//! This crate provides a Sugiyama-style layout for directed graphs that works
//! with any graph data structure through petgraph's visitor traits. It knows
//! nothing about what the nodes represent: callers hand in a graph and a size
//! for each node and get back the top-left corner of every node.
//!
//! # Example
//!
//! ```
//! use flowlane_graph_layout::{LayeredLayout, LayoutEngine, RankDir, Vec2};
//! use petgraph::graphmap::DiGraphMap;
//!
//! let mut graph = DiGraphMap::new();
//! graph.add_edge(1, 2, ());
//! graph.add_edge(2, 3, ());
//!
//! let engine = LayeredLayout::new(Vec2::new(40.0, 20.0)).with_direction(RankDir::TopToBottom);
//! let sizes = |_node: i32| Vec2::new(100.0, 50.0);
//!
//! // Single call
//! let positions = engine.layout(&graph, &sizes).unwrap();
//! assert!(positions[&1].y < positions[&2].y);
//!
//! // Or one phase at a time, caching the layers
//! let layers = engine.compute_layers(&graph).unwrap();
//! let positions = engine.compute_positions(&layers, &sizes).unwrap();
//! assert_eq!(positions.len(), 3);
//! ```

mod engine;
mod geometry;
mod sizes;

pub mod layered;

// Re-export core types and traits
pub use engine::LayoutEngine;
pub use geometry::{Point, Vec2};
pub use sizes::NodeSizes;

// Re-export petgraph visitor traits for graph abstraction
pub use petgraph::visit::{GraphBase, IntoNeighborsDirected, IntoNodeIdentifiers};
pub use petgraph::Direction;

// Re-export layered layout types
pub use layered::{LayeredLayout, LayeredLayoutError, Layers, RankDir};
