use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    ClusterSelection, CoverKind, CoveredBy, OverlapInfo, Segment, SuppressedSegment, TakeCluster,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

/// Result of checking flat segments against the user's cluster removals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlapPartition {
    pub visible: Vec<Segment>,
    pub hidden: Vec<SuppressedSegment>,
}

/// Result of greedy overlap resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSegments {
    /// Pairwise non-overlapping, in chronological order.
    pub primary: Vec<Segment>,
    /// Segments covered by a primary, in the order they were rejected.
    pub secondary: Vec<SuppressedSegment>,
}

/// Pair each selection with the cluster it refers to, skipping unknown ids.
pub(crate) fn selected_clusters<'a>(
    selections: &'a [ClusterSelection],
    clusters: &'a [TakeCluster],
) -> Vec<(&'a ClusterSelection, &'a TakeCluster)> {
    let mut by_id: HashMap<&str, &TakeCluster> = HashMap::new();
    for cluster in clusters {
        by_id.entry(cluster.id.as_str()).or_insert(cluster);
    }

    selections
        .iter()
        .filter_map(|selection| match by_id.get(selection.cluster_id.as_str()) {
            Some(cluster) => Some((selection, *cluster)),
            None => {
                log_warn!("selection references unknown cluster {}", selection.cluster_id);
                None
            }
        })
        .collect()
}

/// Split `segments` into those still visible and those hidden because an
/// attempt removed through a cluster selection overlaps them.
///
/// The first cluster and removed attempt that overlap a segment are reported;
/// later causes are not collected. Segments a selection explicitly keeps are
/// never hidden by that selection.
pub fn find_overlapping_segments(
    segments: &[Segment],
    selections: &[ClusterSelection],
    clusters: &[TakeCluster],
) -> OverlapPartition {
    let pairs = selected_clusters(selections, clusters);
    let mut partition = OverlapPartition::default();

    for segment in segments {
        match cluster_cover(segment, &pairs) {
            Some(overlap) => {
                log_debug!("{} hidden by {}", segment.id, overlap.covered_by.id);
                partition.hidden.push(SuppressedSegment {
                    segment: segment.clone(),
                    overlap,
                });
            }
            None => partition.visible.push(segment.clone()),
        }
    }

    partition
}

fn cluster_cover(
    segment: &Segment,
    pairs: &[(&ClusterSelection, &TakeCluster)],
) -> Option<OverlapInfo> {
    for (selection, cluster) in pairs {
        if selection.kept_segments.iter().any(|id| *id == segment.id) {
            continue;
        }

        for removed_id in &selection.removed_segments {
            let Some(removed) = cluster.attempt(removed_id) else {
                continue;
            };
            if !segment.overlaps(removed) {
                continue;
            }

            let reason = if removed.id == segment.id {
                format!("removed as an attempt of \"{}\"", cluster.name)
            } else {
                format!(
                    "overlaps attempt {} removed with \"{}\"",
                    removed.id, cluster.name
                )
            };

            return Some(OverlapInfo {
                segment_id: segment.id.clone(),
                covered_by: CoveredBy {
                    kind: CoverKind::Cluster,
                    id: cluster.id.clone(),
                    name: Some(cluster.name.clone()),
                    time_range: cluster.time_range,
                },
                overlap_secs: segment.range().overlap_secs(&removed.range()),
                reason,
            });
        }
    }

    None
}

/// Greedy resolution: longest segments claim their interval first.
///
/// Segments are stably sorted by descending duration, ties by ascending start.
/// Each one is accepted as primary unless it overlaps an already accepted
/// primary, in which case it becomes secondary and cites the longest such
/// primary. Every input lands in exactly one of the two lists.
pub fn resolve_segment_overlaps(segments: &[Segment]) -> ResolvedSegments {
    let mut order: Vec<&Segment> = segments.iter().collect();
    order.sort_by(|a, b| {
        b.duration_secs()
            .total_cmp(&a.duration_secs())
            .then_with(|| a.start_time.total_cmp(&b.start_time))
    });

    let mut primary: Vec<&Segment> = Vec::new();
    let mut secondary = Vec::new();

    for segment in order {
        match primary.iter().find(|accepted| accepted.overlaps(segment)) {
            Some(cover) => {
                log_debug!("{} is covered by {}", segment.id, cover.id);
                secondary.push(SuppressedSegment {
                    segment: segment.clone(),
                    overlap: OverlapInfo {
                        segment_id: segment.id.clone(),
                        covered_by: CoveredBy {
                            kind: CoverKind::Segment,
                            id: cover.id.clone(),
                            name: None,
                            time_range: cover.range(),
                        },
                        overlap_secs: segment.range().overlap_secs(&cover.range()),
                        reason: format!("covered by longer segment {}", cover.id),
                    },
                });
            }
            None => primary.push(segment),
        }
    }

    primary.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    ResolvedSegments {
        primary: primary.into_iter().cloned().collect(),
        secondary,
    }
}
