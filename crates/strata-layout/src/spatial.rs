//! Spatial hash for pixel hit-testing
//!
//! One-dimensional buckets of fixed pixel width along the x axis, with a side
//! cache of exact bounds per event. A rectangle spanning several buckets is
//! inserted into each of them; a point query inspects only its owning bucket
//! and then does exact containment, so lookup cost tracks local occupancy,
//! not total event count.
//!
//! The index is rebuilt from scratch every frame. Rebuild is linear in the
//! visible event count, which is far cheaper than maintaining the structure
//! incrementally across pan/zoom.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strata_core::Event;

/// Default bucket width in pixels
pub const DEFAULT_BUCKET_WIDTH: f32 = 50.0;

/// A projected pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Create a new bounds rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exact point containment (half-open on the right and bottom edges)
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Occupancy counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialStats {
    /// Number of occupied buckets
    pub bucket_count: usize,
    /// Total bucket entries (an event counts once per bucket it touches)
    pub entry_count: usize,
    /// Number of cached bounds (one per inserted event)
    pub cached_bounds: usize,
    /// Largest single-bucket occupancy
    pub max_bucket_occupancy: usize,
}

/// Bucketed index from pixel position to event ids
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bucket_width: f32,
    buckets: HashMap<i64, Vec<String>>,
    bounds: HashMap<String, Bounds>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_WIDTH)
    }
}

impl SpatialIndex {
    /// Create an empty index with the given bucket width. Widths at or below
    /// one pixel are raised to one pixel.
    pub fn new(bucket_width: f32) -> Self {
        Self {
            bucket_width: bucket_width.max(1.0),
            buckets: HashMap::new(),
            bounds: HashMap::new(),
        }
    }

    /// Insert an event's rectangle into every bucket it touches
    pub fn insert(&mut self, id: &str, bounds: Bounds) {
        let first = self.bucket_of(bounds.x);
        let last = self.bucket_of(bounds.x + bounds.width);
        for key in first..=last {
            self.buckets.entry(key).or_default().push(id.to_string());
        }
        self.bounds.insert(id.to_string(), bounds);
    }

    /// All events whose rectangle contains the pixel
    pub fn query(&self, px: f32, py: f32) -> Vec<&str> {
        let Some(candidates) = self.buckets.get(&self.bucket_of(px)) else {
            return Vec::new();
        };
        candidates
            .iter()
            .filter(|id| {
                self.bounds
                    .get(id.as_str())
                    .is_some_and(|b| b.contains(px, py))
            })
            .map(String::as_str)
            .collect()
    }

    /// First event (in insertion order) whose rectangle contains the pixel
    pub fn query_first(&self, px: f32, py: f32) -> Option<&str> {
        let candidates = self.buckets.get(&self.bucket_of(px))?;
        candidates
            .iter()
            .find(|id| {
                self.bounds
                    .get(id.as_str())
                    .is_some_and(|b| b.contains(px, py))
            })
            .map(String::as_str)
    }

    /// Cached bounds of an inserted event
    pub fn bounds_of(&self, id: &str) -> Option<Bounds> {
        self.bounds.get(id).copied()
    }

    /// Clear and re-insert from an event slice; events for which `bounds_fn`
    /// returns `None` (off-screen, filtered) are skipped.
    pub fn rebuild<F>(&mut self, events: &[Event], bounds_fn: F)
    where
        F: Fn(&Event) -> Option<Bounds>,
    {
        self.clear();
        for event in events {
            if let Some(bounds) = bounds_fn(event) {
                self.insert(&event.id, bounds);
            }
        }
    }

    /// Remove all entries, keeping allocations
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.bounds.clear();
    }

    /// Occupancy counters for diagnostics
    pub fn stats(&self) -> SpatialStats {
        SpatialStats {
            bucket_count: self.buckets.len(),
            entry_count: self.buckets.values().map(Vec::len).sum(),
            cached_bounds: self.bounds.len(),
            max_bucket_occupancy: self.buckets.values().map(Vec::len).max().unwrap_or(0),
        }
    }

    fn bucket_of(&self, x: f32) -> i64 {
        (x / self.bucket_width).floor() as i64
    }
}
