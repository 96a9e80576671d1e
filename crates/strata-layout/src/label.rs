//! Label collision resolution
//!
//! Decides which labels are drawn so that no two overlap horizontally. A
//! single left-to-right sweep keeps a label whenever it clears the span of
//! the previously kept one; rejected labels are simply omitted while their
//! event shapes still render. Text widths are measured by the renderer and
//! passed in, keeping font metrics out of the engine.

use std::collections::HashSet;

/// A label the resolver may draw: anchor x plus measured pixel width.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    /// Event id the label belongs to
    pub id: String,
    /// Left edge of the label in pixels
    pub x: f32,
    /// Measured text width in pixels
    pub width: f32,
}

/// Resolve which labels are visible.
///
/// Candidates are ordered by x (id as tiebreaker, for determinism) and
/// accepted greedily; `padding` is the horizontal breathing room required
/// between two kept labels.
pub fn resolve_labels(mut candidates: Vec<LabelCandidate>, padding: f32) -> HashSet<String> {
    candidates.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.id.cmp(&b.id)));

    let mut visible = HashSet::with_capacity(candidates.len());
    let mut cursor = f32::NEG_INFINITY;
    for candidate in candidates {
        if candidate.x >= cursor {
            cursor = candidate.x + candidate.width + padding;
            visible.insert(candidate.id);
        }
    }
    visible
}
