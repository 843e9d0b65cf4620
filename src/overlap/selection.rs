//! Turns the user's per-cluster decisions into the final cut list.
//!
//! The flat segment list and the cluster selections are reconciled in three
//! steps: selections are normalized against their clusters, flat segments
//! shadowed by removed attempts are hidden, and the remaining candidates go
//! through greedy overlap resolution so the renderer receives disjoint cuts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{ClusterSelection, SelectedWinner, Segment, SuppressedSegment, TakeCluster};
use crate::overlap::resolve::{find_overlapping_segments, resolve_segment_overlaps, selected_clusters};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Final, authoritative edit for the render step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditDecision {
    /// Intervals to cut, pairwise disjoint and chronological.
    pub cuts: Vec<Segment>,
    /// Segment ids the user chose to keep in the video.
    pub preserved: Vec<String>,
    /// Flat segments dropped because a removed cluster attempt covers them.
    pub hidden: Vec<SuppressedSegment>,
    /// Candidates folded into a longer overlapping cut.
    pub merged: Vec<SuppressedSegment>,
}

/// Fill in what a selection implies but does not spell out.
///
/// An attempt picked as the winner is kept even if `keptSegments` omits it.
/// A selection without explicit removals cuts every attempt it does not keep.
/// Kept ids always win over removed ids, and removals are limited to the
/// cluster's own attempts.
pub fn normalize_selection(selection: &ClusterSelection, cluster: &TakeCluster) -> ClusterSelection {
    let mut kept: Vec<String> = Vec::new();
    for id in &selection.kept_segments {
        if !kept.contains(id) {
            kept.push(id.clone());
        }
    }

    if let SelectedWinner::Attempt(index) = selection.selected_winner {
        match cluster.attempts.get(index) {
            Some(attempt) if !kept.contains(&attempt.id) => kept.push(attempt.id.clone()),
            Some(_) => {}
            None => log_warn!(
                "cluster {} has no attempt {} (only {})",
                cluster.id,
                index,
                cluster.attempts.len()
            ),
        }
    }

    let requested: Vec<&String> = if selection.removed_segments.is_empty() {
        cluster.attempts.iter().map(|attempt| &attempt.id).collect()
    } else {
        selection.removed_segments.iter().collect()
    };

    let mut removed: Vec<String> = Vec::new();
    for id in requested {
        if kept.contains(id) || removed.contains(id) {
            continue;
        }
        if !cluster.contains(id) {
            log_warn!("cluster {} has no attempt {}, ignoring removal", cluster.id, id);
            continue;
        }
        removed.push(id.clone());
    }

    ClusterSelection {
        cluster_id: selection.cluster_id.clone(),
        selected_winner: selection.selected_winner,
        removed_segments: removed,
        kept_segments: kept,
    }
}

const COVER_EPSILON_SECS: f64 = 1e-6;

fn is_fully_covered(suppressed: &SuppressedSegment) -> bool {
    let length = suppressed.segment.end_time - suppressed.segment.start_time;
    suppressed.overlap.overlap_secs >= length - COVER_EPSILON_SECS
}

/// Apply cluster selections to the flat segment list.
///
/// Cuts are the flat segments that are neither kept nor lying wholly inside a
/// removed attempt, plus every removed attempt, resolved so no two cuts
/// overlap. A flat segment only partly under a removed attempt stays a
/// candidate cut.
pub fn apply_selections(
    segments: &[Segment],
    selections: &[ClusterSelection],
    clusters: &[TakeCluster],
) -> EditDecision {
    let pairs = selected_clusters(selections, clusters);
    let normalized: Vec<ClusterSelection> = pairs
        .iter()
        .map(|(selection, cluster)| normalize_selection(selection, cluster))
        .collect();

    let kept: HashSet<&str> = normalized
        .iter()
        .flat_map(|selection| selection.kept_segments.iter().map(String::as_str))
        .collect();
    let removed_ids: HashSet<&str> = normalized
        .iter()
        .flat_map(|selection| selection.removed_segments.iter().map(String::as_str))
        .collect();

    let flat: Vec<Segment> = segments
        .iter()
        .filter(|segment| !kept.contains(segment.id.as_str()))
        .cloned()
        .collect();
    let partition = find_overlapping_segments(&flat, &normalized, clusters);

    // Only segments lying entirely inside a removed attempt are dropped;
    // partial overlaps go through overlap resolution with the attempts.
    let (fully_covered, partially_covered): (Vec<SuppressedSegment>, Vec<SuppressedSegment>) =
        partition
            .hidden
            .into_iter()
            .filter(|suppressed| !removed_ids.contains(suppressed.segment.id.as_str()))
            .partition(is_fully_covered);

    let mut candidates = partition.visible;
    candidates.extend(partially_covered.into_iter().map(|suppressed| suppressed.segment));
    let mut seen: HashSet<String> = candidates.iter().map(|segment| segment.id.clone()).collect();
    for (selection, (_, cluster)) in normalized.iter().zip(pairs.iter()) {
        for id in &selection.removed_segments {
            if kept.contains(id.as_str()) || seen.contains(id) {
                continue;
            }
            if let Some(attempt) = cluster.attempt(id) {
                seen.insert(id.clone());
                candidates.push(attempt.clone());
            }
        }
    }

    let resolved = resolve_segment_overlaps(&candidates);

    let mut preserved: Vec<String> = Vec::new();
    for id in normalized.iter().flat_map(|selection| &selection.kept_segments) {
        if !preserved.contains(id) {
            preserved.push(id.clone());
        }
    }

    // Removed attempts are cut directly; only report what was truly dropped.
    let hidden = fully_covered;

    log_debug!(
        "{} cuts, {} preserved, {} hidden, {} merged",
        resolved.primary.len(),
        preserved.len(),
        hidden.len(),
        resolved.secondary.len()
    );

    EditDecision {
        cuts: resolved.primary,
        preserved,
        hidden,
        merged: resolved.secondary,
    }
}
