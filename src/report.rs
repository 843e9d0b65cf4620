use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clustering::{detect_clusters, ClusterConfig};
use crate::models::{Segment, TakeCluster};
use crate::overlap::{resolve_segment_overlaps, ResolvedSegments};

/// Totals over a list of cuts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CutSummary {
    pub cut_count: usize,
    pub total_secs: f64,
    pub secs_by_category: BTreeMap<String, f64>,
}

impl CutSummary {
    pub fn from_cuts(cuts: &[Segment]) -> Self {
        let mut summary = CutSummary::default();

        for cut in cuts {
            let duration = cut.duration_secs();
            if !duration.is_finite() {
                continue;
            }
            summary.cut_count += 1;
            summary.total_secs += duration;
            *summary
                .secs_by_category
                .entry(cut.category.as_str().to_string())
                .or_insert(0.0) += duration;
        }

        summary
    }
}

/// Everything one analysis pass produces for the review UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub segment_count: usize,
    pub clusters: Vec<TakeCluster>,
    pub resolution: ResolvedSegments,
    pub summary: CutSummary,
}

/// Detect clusters and resolve raw overlaps in one pass.
pub fn analyze(segments: &[Segment], config: &ClusterConfig) -> AnalysisReport {
    let clusters = detect_clusters(segments, config);
    let resolution = resolve_segment_overlaps(segments);
    let summary = CutSummary::from_cuts(&resolution.primary);

    AnalysisReport {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        segment_count: segments.len(),
        clusters,
        resolution,
        summary,
    }
}
