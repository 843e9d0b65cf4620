use serde::{Deserialize, Serialize};

use super::{Segment, TimeRange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoverKind {
    Cluster,
    Segment,
}

/// The cluster or segment that makes another segment redundant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoveredBy {
    pub kind: CoverKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub time_range: TimeRange,
}

/// Why a segment was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlapInfo {
    pub segment_id: String,
    pub covered_by: CoveredBy,
    pub overlap_secs: f64,
    pub reason: String,
}

/// A segment that stays out of the cut list, with its cause.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuppressedSegment {
    pub segment: Segment,
    pub overlap: OverlapInfo,
}
