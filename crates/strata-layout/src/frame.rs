//! Per-frame layout orchestration
//!
//! The single entry point callers drive once per frame: project, pick the
//! detail tier, assign lanes, derive pixel bounds, rebuild the hit-test
//! index, resolve labels, and cluster at coarse zoom. The function is pure
//! (the same events, viewport, previous tier, and config always produce the
//! same layout) and owns no state between calls; the caller holds the
//! returned tier and feeds it back for hysteresis.

use crate::cluster::{cluster_events, ClusterGroup};
use crate::config::LayoutConfig;
use crate::label::{resolve_labels, LabelCandidate};
use crate::lane::{assign_lanes, LaneAssignment};
use crate::lod::{determine_lod, filter_events_by_lod, LodTier};
use crate::spatial::{Bounds, SpatialIndex};
use std::collections::BTreeMap;
use std::collections::HashSet;
use strata_core::{Event, Viewport};

/// Text measurement callback supplied by the renderer: pixel width of a
/// string in the label font. The engine holds no font metrics of its own.
pub type TextMeasure<'a> = &'a dyn Fn(&str) -> f32;

/// Pixel placement and visibility flags for one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventLayout {
    /// Event id
    pub id: String,
    /// Left edge in pixels (viewport-relative)
    pub x: f32,
    /// Top edge in pixels
    pub y: f32,
    /// Width in pixels (at least the configured minimum)
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Whether this event's label survived collision resolution
    pub label_visible: bool,
    /// Whether this event is summarized by a cluster marker
    pub clustered: bool,
}

/// Everything the paint routine and the accessible mirror need for one frame
#[derive(Debug)]
pub struct FrameLayout {
    /// Per-event placement, in visible-set order
    pub layouts: Vec<EventLayout>,
    /// Lane placement for the visible set
    pub lanes: LaneAssignment,
    /// Detail tier in effect; feed back as `previous_lod` next frame
    pub lod: LodTier,
    /// Cluster markers (Macro tier only, empty otherwise)
    pub clusters: Vec<ClusterGroup>,
    /// Hit-test index over the frame's bounds
    pub index: SpatialIndex,
}

impl FrameLayout {
    /// Bounds of an event in this frame, if it is visible
    pub fn bounds_of(&self, id: &str) -> Option<Bounds> {
        self.index.bounds_of(id)
    }
}

/// Compute the layout for one frame.
///
/// Events outside the viewport are culled before any other work; the LOD
/// tier then filters by priority, lanes are assigned (Micro/Meso), bounds
/// are derived, and labels/clusters resolved per tier.
pub fn layout_frame(
    events: &[Event],
    viewport: &Viewport,
    previous_lod: LodTier,
    config: &LayoutConfig,
    measure: TextMeasure,
) -> FrameLayout {
    let lod = determine_lod(viewport.scale.seconds_per_pixel(), previous_lod);

    let view_start = viewport.start;
    let view_end = viewport.end();
    let in_view = events
        .iter()
        .filter(|event| event.intersects(view_start, view_end));
    let visible = filter_events_by_lod(in_view, lod);

    // Macro collapses everything onto one row; the clusters carry density
    let lanes = match lod {
        LodTier::Macro => single_lane(&visible),
        _ => assign_lanes(visible.iter().copied()),
    };

    let mut layouts = Vec::with_capacity(visible.len());
    let mut index = SpatialIndex::new(config.performance.bucket_width);
    for event in &visible {
        let x0 = viewport.x_of(event.start) as f32;
        let x1 = viewport.x_of(event.effective_end()) as f32;
        let lane = lanes.lane(&event.id).unwrap_or(0);
        let layout = EventLayout {
            id: event.id.clone(),
            x: x0,
            y: config.lane_y(lane),
            width: (x1 - x0).max(config.geometry.min_event_width),
            height: config.geometry.lane_height,
            label_visible: false,
            clustered: false,
        };
        index.insert(
            &layout.id,
            Bounds::new(layout.x, layout.y, layout.width, layout.height),
        );
        layouts.push(layout);
    }

    if lod.shows_labels() {
        let candidates = visible
            .iter()
            .zip(&layouts)
            .filter(|(event, _)| !event.label.is_empty())
            .map(|(event, layout)| {
                let text = display_label(&event.label, lod, config);
                LabelCandidate {
                    id: event.id.clone(),
                    x: layout.x,
                    width: measure(&text),
                }
            })
            .collect();
        let visible_labels = resolve_labels(candidates, config.geometry.label_padding);
        for layout in &mut layouts {
            layout.label_visible = visible_labels.contains(&layout.id);
        }
    }

    let clusters = if lod == LodTier::Macro {
        let groups = cluster_events(&visible, viewport, config.performance.cluster_radius);
        let clustered: HashSet<&str> = groups
            .iter()
            .flat_map(|g| g.member_ids.iter().map(String::as_str))
            .collect();
        for layout in &mut layouts {
            layout.clustered = clustered.contains(layout.id.as_str());
        }
        groups
    } else {
        Vec::new()
    };

    FrameLayout {
        layouts,
        lanes,
        lod,
        clusters,
        index,
    }
}

/// The label text actually drawn at a tier: full at Micro, truncated at Meso
fn display_label(label: &str, lod: LodTier, config: &LayoutConfig) -> String {
    match lod {
        LodTier::Meso => abbreviate(label, config.geometry.meso_label_chars),
        _ => label.to_string(),
    }
}

/// Truncate to `max_chars` characters, appending an ellipsis when shortened
fn abbreviate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Everything on lane 0 (Macro tier)
fn single_lane(visible: &[&Event]) -> LaneAssignment {
    let lane_of: BTreeMap<String, usize> =
        visible.iter().map(|event| (event.id.clone(), 0)).collect();
    LaneAssignment {
        lane_count: if lane_of.is_empty() { 0 } else { 1 },
        lane_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Priority, TemporalScale, TimeSecs, SECS_PER_YEAR};

    fn event(id: &str, start: TimeSecs, end: Option<TimeSecs>, priority: Priority) -> Event {
        Event {
            id: id.to_string(),
            start,
            end,
            label: format!("Event {id}"),
            category: None,
            priority,
            tags: Vec::new(),
        }
    }

    fn measure(text: &str) -> f32 {
        text.chars().count() as f32 * 7.0
    }

    #[test]
    fn test_micro_frame_layout() {
        let events = vec![
            event("a", 0, Some(100), Priority::Low),
            event("b", 50, Some(150), Priority::Medium),
            event("c", 120, Some(200), Priority::High),
        ];
        // 1 px per second: everything fits in 1000 px
        let viewport = Viewport::new(
            0,
            TemporalScale::from_pixels_per_second(1).unwrap(),
            1000,
        );
        let config = LayoutConfig::default();

        let frame = layout_frame(&events, &viewport, LodTier::Micro, &config, &measure);

        assert_eq!(frame.lod, LodTier::Micro);
        assert_eq!(frame.layouts.len(), 3);
        assert_eq!(frame.lanes.lane("a"), Some(0));
        assert_eq!(frame.lanes.lane("b"), Some(1));
        assert_eq!(frame.lanes.lane("c"), Some(0));

        let a = &frame.layouts[0];
        assert_eq!(a.x, 0.0);
        assert_eq!(a.width, 100.0);
        assert_eq!(a.y, config.lane_y(0));

        // hit-test goes through the rebuilt index
        assert_eq!(frame.index.query_first(10.0, a.y + 1.0), Some("a"));
        assert!(frame.clusters.is_empty());
    }

    #[test]
    fn test_culling_excludes_offscreen_events() {
        let events = vec![
            event("visible", 10, Some(20), Priority::Medium),
            event("left", -500, Some(-400), Priority::Medium),
            event("right", 5_000, None, Priority::Medium),
        ];
        let viewport = Viewport::new(
            0,
            TemporalScale::from_pixels_per_second(1).unwrap(),
            1000,
        );

        let frame = layout_frame(
            &events,
            &viewport,
            LodTier::Micro,
            &LayoutConfig::default(),
            &measure,
        );
        assert_eq!(frame.layouts.len(), 1);
        assert_eq!(frame.layouts[0].id, "visible");
    }

    #[test]
    fn test_meso_filters_and_abbreviates() {
        let events = vec![
            event("low", 0, Some(3600), Priority::Low),
            Event {
                label: "A very long label indeed".to_string(),
                ..event("high", 86_400, Some(200_000), Priority::High)
            },
        ];
        // one day per second-per-pixel band: Meso territory
        let viewport = Viewport::new(
            0,
            TemporalScale::from_seconds_per_pixel(86_400).unwrap(),
            1000,
        );
        let config = LayoutConfig::default();

        let frame = layout_frame(&events, &viewport, LodTier::Meso, &config, &measure);

        assert_eq!(frame.lod, LodTier::Meso);
        // the low-priority event is filtered out
        assert_eq!(frame.layouts.len(), 1);
        assert_eq!(frame.layouts[0].id, "high");
        assert!(frame.layouts[0].label_visible);
    }

    #[test]
    fn test_macro_clusters_and_drops_labels() {
        let year = SECS_PER_YEAR;
        let events = vec![
            event("a", 0, None, Priority::High),
            event("b", 1000 * year, None, Priority::High),
            event("c", 1010 * year, None, Priority::High),
            event("d", 500_000 * year, None, Priority::High),
            event("medium", 2000 * year, None, Priority::Medium),
        ];
        // 1000 years per pixel: deep Macro
        let viewport = Viewport::new(
            0,
            TemporalScale::from_seconds_per_pixel(1000 * year).unwrap(),
            1000,
        );
        let config = LayoutConfig::default();

        let frame = layout_frame(&events, &viewport, LodTier::Macro, &config, &measure);

        assert_eq!(frame.lod, LodTier::Macro);
        // medium priority filtered at Macro
        assert_eq!(frame.layouts.len(), 4);
        assert!(frame.layouts.iter().all(|l| !l.label_visible));
        assert_eq!(frame.lanes.lane_count, 1);

        // a, b, c project within the cluster radius; d is far away
        assert_eq!(frame.clusters.len(), 1);
        let cluster = &frame.clusters[0];
        assert_eq!(cluster.member_ids, vec!["a", "b", "c"]);
        assert!(frame
            .layouts
            .iter()
            .find(|l| l.id == "d")
            .is_some_and(|l| !l.clustered));
        assert!(frame
            .layouts
            .iter()
            .find(|l| l.id == "a")
            .is_some_and(|l| l.clustered));
    }

    #[test]
    fn test_min_event_width_applied() {
        let events = vec![event("p", 500, None, Priority::Medium)];
        let viewport = Viewport::new(
            0,
            TemporalScale::from_pixels_per_second(1).unwrap(),
            1000,
        );
        let config = LayoutConfig::default();

        let frame = layout_frame(&events, &viewport, LodTier::Micro, &config, &measure);
        assert_eq!(frame.layouts[0].width, config.geometry.min_event_width);
    }

    #[test]
    fn test_same_inputs_same_layout() {
        let events = vec![
            event("a", 0, Some(100), Priority::Medium),
            event("b", 50, Some(150), Priority::Medium),
        ];
        let viewport = Viewport::new(
            0,
            TemporalScale::from_pixels_per_second(1).unwrap(),
            1000,
        );
        let config = LayoutConfig::default();

        let one = layout_frame(&events, &viewport, LodTier::Micro, &config, &measure);
        let two = layout_frame(&events, &viewport, LodTier::Micro, &config, &measure);
        assert_eq!(one.layouts, two.layouts);
        assert_eq!(one.lanes, two.lanes);
        assert_eq!(one.clusters, two.clusters);
    }
}
