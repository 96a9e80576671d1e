//! Common types for Strata
//!
//! This module contains the fundamental temporal types used throughout the
//! Strata timeline engine: the epoch time representation, event records, and
//! the viewport that ties a time window to a pixel width.

use crate::scale::{ScaleResult, TemporalScale};
use serde::{Deserialize, Serialize};

/// Epoch time value: seconds relative to the Unix epoch.
///
/// 128-bit signed integers give exact arithmetic out to ±5.4e21 years, so a
/// 13.8-billion-year span (~4.4e17 s) multiplied through a scale fraction
/// never leaves integer range. No floating point is used for time values.
pub type TimeSecs = i128;

/// Mean Gregorian year in seconds (365.2425 days).
pub const SECS_PER_YEAR: TimeSecs = 31_556_952;

/// One day in seconds.
pub const SECS_PER_DAY: TimeSecs = 86_400;

/// Approximate age of the universe: 13.8 Ga before the epoch.
pub const BIG_BANG: TimeSecs = -13_800_000_000 * SECS_PER_YEAR;

/// Formation of the Earth: 4.5 Ga before the epoch.
pub const EARTH_FORMATION: TimeSecs = -4_500_000_000 * SECS_PER_YEAR;

/// Rendering priority of an event.
///
/// Coarser zoom tiers drop low-priority events first; see the LOD controller
/// in the layout crate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
}

impl Priority {
    /// Convert from a numeric level (0-2) to a Priority
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Priority::Low),
            1 => Some(Priority::Medium),
            2 => Some(Priority::High),
            _ => None,
        }
    }

    /// Get the name of this priority
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A single timeline event.
///
/// Events are produced by the application's data-loading layer and are
/// immutable once loaded; the engine borrows them read-only each frame and
/// never revalidates. An absent `end` marks a point event (zero-width
/// interval).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: String,
    /// Start instant, seconds from the epoch
    pub start: TimeSecs,
    /// End instant; `None` for point events
    #[serde(default)]
    pub end: Option<TimeSecs>,
    /// Display label
    pub label: String,
    /// Optional category (used by filtering outside the engine)
    #[serde(default)]
    pub category: Option<String>,
    /// Rendering priority; defaults to medium
    #[serde(default)]
    pub priority: Priority,
    /// Free-form tags (used by search outside the engine)
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Event {
    /// Effective end of the interval: `end` for ranged events, `start` for
    /// point events. An `end` before `start` collapses to a zero-width
    /// interval rather than a negative one.
    pub fn effective_end(&self) -> TimeSecs {
        match self.end {
            Some(end) => end.max(self.start),
            None => self.start,
        }
    }

    /// Duration in seconds (zero for point events)
    pub fn duration(&self) -> TimeSecs {
        self.effective_end() - self.start
    }

    /// True when this event has no `end`
    pub fn is_point(&self) -> bool {
        self.end.is_none()
    }

    /// Midpoint of the interval (the event itself for point events)
    pub fn midpoint(&self) -> TimeSecs {
        self.start + self.duration() / 2
    }

    /// True when the interval intersects `[from, to]`
    pub fn intersects(&self, from: TimeSecs, to: TimeSecs) -> bool {
        self.start <= to && self.effective_end() >= from
    }
}

/// The visible time window: a start instant, a pixels-per-second scale, and
/// a width in device pixels. The end of the window is derived, never stored,
/// so the three fields can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Leftmost visible instant
    pub start: TimeSecs,
    /// Active time/pixel mapping
    pub scale: TemporalScale,
    /// Viewport width in pixels
    pub width_px: u32,
}

impl Viewport {
    /// Create a new viewport
    pub fn new(start: TimeSecs, scale: TemporalScale, width_px: u32) -> Self {
        Viewport {
            start,
            scale,
            width_px,
        }
    }

    /// Rightmost visible instant (derived from scale and width)
    pub fn end(&self) -> TimeSecs {
        self.start + self.scale.pixels_to_time(self.width_px as i64)
    }

    /// Visible duration in seconds
    pub fn duration(&self) -> TimeSecs {
        self.end() - self.start
    }

    /// Check if an instant is within the visible window
    pub fn contains(&self, time: TimeSecs) -> bool {
        time >= self.start && time <= self.end()
    }

    /// Project an instant to a pixel x coordinate (may fall outside
    /// `0..width_px` for off-screen instants)
    pub fn x_of(&self, time: TimeSecs) -> f64 {
        self.scale.time_to_pixels(time - self.start)
    }

    /// Instant under a pixel x coordinate
    pub fn time_at(&self, px: i64) -> TimeSecs {
        self.start + self.scale.pixels_to_time(px)
    }

    /// Shift the window by a pixel delta (positive pans right)
    pub fn pan_pixels(&self, dpx: i64) -> Self {
        Viewport {
            start: self.start + self.scale.pixels_to_time(dpx),
            scale: self.scale,
            width_px: self.width_px,
        }
    }

    /// Zoom by `factor`, keeping the instant under `anchor_px` fixed at that
    /// pixel. A factor above 1 zooms in.
    pub fn zoom_around(&self, factor: f64, anchor_px: i64) -> ScaleResult<Self> {
        let anchor_time = self.time_at(anchor_px);
        let scale = self.scale.zoom(factor)?;
        Ok(Viewport {
            start: anchor_time - scale.pixels_to_time(anchor_px),
            scale,
            width_px: self.width_px,
        })
    }

    /// Re-center the window on an instant without changing the scale
    pub fn centered_on(&self, center: TimeSecs) -> Self {
        let half = self.scale.pixels_to_time(self.width_px as i64 / 2);
        Viewport {
            start: center - half,
            scale: self.scale,
            width_px: self.width_px,
        }
    }
}
