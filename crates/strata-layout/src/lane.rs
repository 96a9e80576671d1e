//! Lane assignment - interval scheduling onto display rows
//!
//! Places each event into the lowest display lane where it does not
//! temporally overlap the lane's previous occupant. Intervals are half-open,
//! so an event starting exactly where another ends shares its lane. The
//! greedy lowest-free-lane walk over start-sorted intervals is the classic
//! minimal-coloring algorithm for interval graphs: the lane count equals the
//! maximum number of simultaneously overlapping events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_core::{Event, TimeSecs};

/// Lane placement for one frame's visible events.
///
/// Always replaced wholesale when the visible set changes, never patched, so
/// two frames over the same events are bit-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneAssignment {
    /// Event id to lane index (0-based, no holes)
    pub lane_of: BTreeMap<String, usize>,
    /// Number of lanes in use
    pub lane_count: usize,
}

impl LaneAssignment {
    /// Lane index of an event, if it was assigned
    pub fn lane(&self, id: &str) -> Option<usize> {
        self.lane_of.get(id).copied()
    }
}

/// Assign lanes to a set of events.
///
/// Deterministic for any input order: events are sorted by start, then by
/// descending duration (point events sort as maximal), then by id. Point
/// events are zero-width intervals, and two events with exactly equal starts
/// always land in different lanes even where the half-open overlap test
/// alone would let them share.
pub fn assign_lanes<'a, I>(events: I) -> LaneAssignment
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut order: Vec<&Event> = events.into_iter().collect();
    order.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| sort_duration(b).cmp(&sort_duration(a)))
            .then_with(|| a.id.cmp(&b.id))
    });

    // Per lane: start and end of the interval most recently placed there.
    // Starts are non-decreasing over the walk, so an equal-start conflict can
    // only be with a lane's most recent occupant.
    let mut lanes: Vec<(TimeSecs, TimeSecs)> = Vec::new();
    let mut lane_of = BTreeMap::new();

    for event in order {
        let start = event.start;
        let end = event.effective_end();
        let slot = lanes
            .iter()
            .position(|&(last_start, free_at)| free_at <= start && last_start != start);
        let lane = match slot {
            Some(i) => {
                lanes[i] = (start, end);
                i
            }
            None => {
                lanes.push((start, end));
                lanes.len() - 1
            }
        };
        lane_of.insert(event.id.clone(), lane);
    }

    LaneAssignment {
        lane_of,
        lane_count: lanes.len(),
    }
}

/// Duration used for ordering only: point events sort as maximal so they are
/// placed before any ranged event sharing their start.
fn sort_duration(event: &Event) -> TimeSecs {
    if event.is_point() {
        TimeSecs::MAX
    } else {
        event.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Priority;

    fn event(id: &str, start: TimeSecs, end: Option<TimeSecs>) -> Event {
        Event {
            id: id.to_string(),
            start,
            end,
            label: id.to_string(),
            category: None,
            priority: Priority::default(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_optimal_lane_reuse() {
        // A=[0,100) B=[50,150) C=[120,200): C reuses A's lane
        let events = vec![
            event("a", 0, Some(100)),
            event("b", 50, Some(150)),
            event("c", 120, Some(200)),
        ];
        let lanes = assign_lanes(&events);
        assert_eq!(lanes.lane("a"), Some(0));
        assert_eq!(lanes.lane("b"), Some(1));
        assert_eq!(lanes.lane("c"), Some(0));
        assert_eq!(lanes.lane_count, 2);
    }

    #[test]
    fn test_touching_endpoints_share_a_lane() {
        let events = vec![event("a", 0, Some(100)), event("b", 100, Some(200))];
        let lanes = assign_lanes(&events);
        assert_eq!(lanes.lane_count, 1);
        assert_eq!(lanes.lane("a"), lanes.lane("b"));
    }

    #[test]
    fn test_deterministic_under_permutation() {
        let events = vec![
            event("a", 0, Some(100)),
            event("b", 50, Some(150)),
            event("c", 120, Some(200)),
            event("d", 10, None),
            event("e", 130, Some(135)),
        ];
        let baseline = assign_lanes(&events);

        let mut rotated = events.clone();
        for _ in 0..events.len() {
            rotated.rotate_left(1);
            assert_eq!(assign_lanes(&rotated), baseline);
        }

        let mut reversed = events;
        reversed.reverse();
        assert_eq!(assign_lanes(&reversed), baseline);
    }

    #[test]
    fn test_point_and_interval_same_start() {
        // Equal starts force separate lanes even though the half-open test
        // finds no overlap with a zero-width interval
        let events = vec![event("point", 50, None), event("range", 50, Some(200))];
        let lanes = assign_lanes(&events);
        assert_ne!(lanes.lane("point"), lanes.lane("range"));
        assert_eq!(lanes.lane_count, 2);
    }

    #[test]
    fn test_two_points_same_start() {
        let events = vec![event("p1", 50, None), event("p2", 50, None)];
        let lanes = assign_lanes(&events);
        assert_ne!(lanes.lane("p1"), lanes.lane("p2"));
    }

    #[test]
    fn test_point_event_reuses_freed_lane() {
        // A point at t=100 may share the lane of an interval ending at 100
        let events = vec![event("a", 0, Some(100)), event("p", 100, None)];
        let lanes = assign_lanes(&events);
        assert_eq!(lanes.lane_count, 1);
    }

    #[test]
    fn test_no_holes_in_lane_indices() {
        // Three overlapping, then one far later: lane 0 is reused, not lane 3
        let events = vec![
            event("a", 0, Some(100)),
            event("b", 10, Some(110)),
            event("c", 20, Some(120)),
            event("d", 500, Some(600)),
        ];
        let lanes = assign_lanes(&events);
        assert_eq!(lanes.lane("d"), Some(0));
        assert_eq!(lanes.lane_count, 3);
    }

    #[test]
    fn test_empty_input() {
        let lanes = assign_lanes(std::iter::empty::<&Event>());
        assert_eq!(lanes.lane_count, 0);
        assert!(lanes.lane_of.is_empty());
    }
}
