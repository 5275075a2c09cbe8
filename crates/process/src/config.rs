use graph_layout::{LayeredLayout, Vec2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::Direction;

/// Spacing and sizing constants of the swimlane layout
///
/// Every field has a default, so partial configuration files are fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap between nodes sharing a rank
    pub node_spacing: f32,
    /// Gap between consecutive ranks
    pub rank_spacing: f32,
    /// Nominal width of a lane in left-to-right layouts
    pub lane_width: f32,
    /// Inner padding between a lane border and its nodes
    pub lane_padding: f32,
    /// Minimum lane height
    pub min_lane_height: f32,
    /// Minimum lane width in top-to-bottom layouts
    pub min_lane_width: f32,
    /// Extra width added to the widest content in top-to-bottom layouts
    pub lane_margin: f32,
    /// Distance between the lanes and the start/end markers
    pub terminal_margin: f32,
    pub max_crossing_iterations: usize,
    pub max_position_iterations: usize,
    /// Reverse back edges instead of failing on cyclic processes
    pub break_cycles: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 40.0,
            rank_spacing: 80.0,
            lane_width: 600.0,
            lane_padding: 40.0,
            min_lane_height: 200.0,
            min_lane_width: 800.0,
            lane_margin: 100.0,
            terminal_margin: 60.0,
            max_crossing_iterations: 10,
            max_position_iterations: 50,
            break_cycles: true,
        }
    }
}

impl LayoutConfig {
    /// Parse a RON configuration
    pub fn from_ron(source: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(source)
    }

    /// Copy of the configuration with unusable values replaced by defaults
    ///
    /// Lengths must be finite and not negative, and a left-to-right lane must
    /// leave some room for content once padded.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let length = |name: &str, value: f32, default: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                warn!("Invalid layout setting {name} = {value}, using {default}");
                default
            }
        };

        let mut config = Self {
            node_spacing: length("node_spacing", self.node_spacing, defaults.node_spacing),
            rank_spacing: length("rank_spacing", self.rank_spacing, defaults.rank_spacing),
            lane_width: length("lane_width", self.lane_width, defaults.lane_width),
            lane_padding: length("lane_padding", self.lane_padding, defaults.lane_padding),
            min_lane_height: length("min_lane_height", self.min_lane_height, defaults.min_lane_height),
            min_lane_width: length("min_lane_width", self.min_lane_width, defaults.min_lane_width),
            lane_margin: length("lane_margin", self.lane_margin, defaults.lane_margin),
            terminal_margin: length("terminal_margin", self.terminal_margin, defaults.terminal_margin),
            ..self.clone()
        };

        if config.lane_width <= 2.0 * config.lane_padding {
            warn!(
                "Lane width {} leaves no room inside padding {}, using defaults",
                config.lane_width, config.lane_padding
            );
            config.lane_width = defaults.lane_width;
            config.lane_padding = defaults.lane_padding;
        }

        config
    }

    /// Room left for nodes inside a left-to-right lane
    pub fn lane_content_width(&self) -> f32 {
        self.lane_width - 2.0 * self.lane_padding
    }

    pub(crate) fn engine(&self, direction: Direction) -> LayeredLayout {
        LayeredLayout {
            spacing: Vec2::new(self.rank_spacing, self.node_spacing),
            direction: direction.rank_dir(),
            max_crossing_iterations: self.max_crossing_iterations,
            max_position_iterations: self.max_position_iterations,
            break_cycles: self.break_cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_partial_ron() {
        let config = LayoutConfig::from_ron("(lane_width: 900.0, break_cycles: false)").unwrap();
        assert_eq!(config.lane_width, 900.0);
        assert!(!config.break_cycles);
        assert_eq!(config.node_spacing, LayoutConfig::default().node_spacing);
    }

    #[test]
    fn test_sanitized_replaces_bad_values() {
        let config = LayoutConfig {
            node_spacing: f32::NAN,
            rank_spacing: -5.0,
            min_lane_height: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        let defaults = LayoutConfig::default();
        assert_eq!(config.node_spacing, defaults.node_spacing);
        assert_eq!(config.rank_spacing, defaults.rank_spacing);
        assert_eq!(config.min_lane_height, defaults.min_lane_height);
    }

    #[test]
    fn test_sanitized_keeps_room_in_lanes() {
        let config = LayoutConfig {
            lane_width: 50.0,
            lane_padding: 40.0,
            ..Default::default()
        }
        .sanitized();
        assert!(config.lane_content_width() > 0.0);
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn test_engine_spacing_follows_config() {
        let config = LayoutConfig::default();
        let engine = config.engine(Direction::TopToBottom);
        assert_eq!(engine.spacing, Vec2::new(80.0, 40.0));
        assert_eq!(engine.direction, graph_layout::RankDir::TopToBottom);
    }
}
