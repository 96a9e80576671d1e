//! Layout configuration
//!
//! Tunable geometry and performance knobs for the frame pipeline. The config
//! is owned by the caller and passed in by reference each frame; the engine
//! itself reads no files.

use serde::{Deserialize, Serialize};

/// Root configuration for the layout pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Lane geometry and label spacing
    pub geometry: GeometryConfig,
    /// Hit-testing, clustering, and offload thresholds
    pub performance: PerformanceConfig,
}

/// Lane geometry and label spacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Height of one event lane in pixels
    pub lane_height: f32,
    /// Vertical gap between lanes in pixels
    pub lane_gap: f32,
    /// Offset from the top of the canvas to lane 0
    pub track_top: f32,
    /// Narrow events are widened to this many pixels so they stay clickable
    pub min_event_width: f32,
    /// Horizontal breathing room required between two drawn labels
    pub label_padding: f32,
    /// Label truncation length at the medium detail tier
    pub meso_label_chars: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            lane_height: 22.0,
            lane_gap: 4.0,
            track_top: 40.0,
            min_event_width: 3.0,
            label_padding: 6.0,
            meso_label_chars: 12,
        }
    }
}

/// Hit-testing, clustering, and offload thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Bucket width of the spatial hash in pixels
    pub bucket_width: f32,
    /// Events whose projected centers fall within this radius merge into a
    /// cluster at the coarse detail tier
    pub cluster_radius: f32,
    /// Event count above which lane assignment is shipped to the worker
    pub worker_threshold: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            bucket_width: 50.0,
            cluster_radius: 24.0,
            worker_threshold: 2000,
        }
    }
}

impl LayoutConfig {
    /// Top edge of a lane's row in pixels
    pub fn lane_y(&self, lane: usize) -> f32 {
        self.geometry.track_top
            + lane as f32 * (self.geometry.lane_height + self.geometry.lane_gap)
    }
}
