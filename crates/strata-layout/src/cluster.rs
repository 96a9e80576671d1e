//! Event clustering at coarse zoom
//!
//! At the Macro tier, events whose projected centers land close together
//! merge into a single cluster marker carrying a representative span and a
//! member count. Candidate proximity uses the same fixed-width bucketing as
//! the spatial hash: centers are bucketed at the cluster radius and runs of
//! adjacent occupied buckets merge, which keeps the pass near-linear.
//!
//! Clusters are frame-local: they are discarded and regenerated on every
//! call, never updated incrementally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_core::{Event, TimeSecs, Viewport};

/// A group of events summarized by one marker at coarse zoom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterGroup {
    /// Stable within a frame: "cluster-0", "cluster-1", ... left to right
    pub id: String,
    /// Earliest member start
    pub start: TimeSecs,
    /// Latest member end
    pub end: TimeSecs,
    /// Member event ids, ordered by (start, id)
    pub member_ids: Vec<String>,
    /// Number of members
    pub count: usize,
}

/// Merge events whose projected centers fall within `radius` pixels of each
/// other into cluster groups. Runs of fewer than two events stay unclustered
/// and keep rendering as ordinary markers.
pub fn cluster_events(events: &[&Event], viewport: &Viewport, radius: f32) -> Vec<ClusterGroup> {
    let radius = radius.max(1.0);

    // Bucket projected centers at the cluster radius
    let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, event) in events.iter().enumerate() {
        let center_x = viewport.x_of(event.midpoint());
        let key = (center_x / radius as f64).floor() as i64;
        buckets.entry(key).or_default().push(i);
    }

    let mut groups = Vec::new();
    let mut run: Vec<usize> = Vec::new();
    let mut last_key: Option<i64> = None;

    for (&key, members) in &buckets {
        let adjacent = last_key.is_some_and(|prev| key - prev <= 1);
        if !adjacent && !run.is_empty() {
            flush_run(&mut groups, &run, events);
            run.clear();
        }
        run.extend_from_slice(members);
        last_key = Some(key);
    }
    if !run.is_empty() {
        flush_run(&mut groups, &run, events);
    }

    groups
}

/// Turn a run of bucket-adjacent events into a group, if it is dense enough
fn flush_run(groups: &mut Vec<ClusterGroup>, run: &[usize], events: &[&Event]) {
    if run.len() < 2 {
        return;
    }

    let mut members: Vec<&Event> = run.iter().map(|&i| events[i]).collect();
    members.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let start = members.iter().map(|e| e.start).min().unwrap_or_default();
    let end = members
        .iter()
        .map(|e| e.effective_end())
        .max()
        .unwrap_or_default();

    groups.push(ClusterGroup {
        id: format!("cluster-{}", groups.len()),
        start,
        end,
        member_ids: members.iter().map(|e| e.id.clone()).collect(),
        count: members.len(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{Priority, TemporalScale};

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

    fn viewport() -> Viewport {
        // 1 px per second, 1000 px wide
        Viewport::new(0, TemporalScale::from_pixels_per_second(1).unwrap(), 1000)
    }

    #[test]
    fn test_nearby_events_merge() {
        let a = event("a", 100, None);
        let b = event("b", 110, None);
        let c = event("c", 118, Some(130));
        let events = vec![&a, &b, &c];

        let groups = cluster_events(&events, &viewport(), 24.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].member_ids, vec!["a", "b", "c"]);
        assert_eq!(groups[0].start, 100);
        assert_eq!(groups[0].end, 130);
    }

    #[test]
    fn test_distant_events_stay_apart() {
        let a = event("a", 100, None);
        let b = event("b", 600, None);
        let events = vec![&a, &b];

        let groups = cluster_events(&events, &viewport(), 24.0);
        // two singleton runs, neither dense enough to cluster
        assert!(groups.is_empty());
    }

    #[test]
    fn test_two_separate_clusters() {
        let a = event("a", 100, None);
        let b = event("b", 110, None);
        let c = event("c", 700, None);
        let d = event("d", 705, None);
        let events = vec![&a, &b, &c, &d];

        let groups = cluster_events(&events, &viewport(), 24.0);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].id, "cluster-0");
        assert_eq!(groups[0].member_ids, vec!["a", "b"]);
        assert_eq!(groups[1].id, "cluster-1");
        assert_eq!(groups[1].member_ids, vec!["c", "d"]);
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let a = event("a", 100, None);
        let b = event("b", 110, None);
        let c = event("c", 118, None);

        let forward = cluster_events(&[&a, &b, &c], &viewport(), 24.0);
        let backward = cluster_events(&[&c, &b, &a], &viewport(), 24.0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_input() {
        let groups = cluster_events(&[], &viewport(), 24.0);
        assert!(groups.is_empty());
    }
}
