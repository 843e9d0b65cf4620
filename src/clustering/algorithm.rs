use crate::clustering::config::ClusterConfig;
use crate::clustering::naming::{cluster_confidence, determine_pattern, infer_cluster_name};
use crate::clustering::scoring::combined_similarity;
use crate::models::{Segment, SegmentCategory, TakeCluster, TimeRange, Winner};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_debug;

/// Detection strategy that produced a cluster; tags the cluster id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Consecutive,
    Retake,
    Similar,
    Aggressive,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Consecutive => "consecutive",
            Strategy::Retake => "retake",
            Strategy::Similar => "similar",
            Strategy::Aggressive => "aggressive",
        }
    }

    fn cluster_id(&self, index: usize) -> String {
        format!("cluster-{}-{}", self.as_str(), index)
    }
}

/// Main detection function: groups flagged segments into take clusters.
///
/// Strategies run independently over the start-sorted list and their outputs
/// are concatenated in order: consecutive, retake, similar. The aggressive
/// pairing only runs when those three found nothing. A segment may belong to
/// clusters from several strategies.
pub fn detect_clusters(segments: &[Segment], config: &ClusterConfig) -> Vec<TakeCluster> {
    // Edge case: empty input
    if segments.is_empty() {
        return Vec::new();
    }

    let sorted = sort_by_start(segments);

    let mut clusters = detect_consecutive(&sorted, config);
    clusters.extend(detect_retakes(&sorted, config));
    clusters.extend(detect_similar(&sorted, config));

    if clusters.is_empty() && sorted.len() >= 2 {
        log_debug!("no clusters from primary strategies, trying aggressive pairing");
        clusters = detect_aggressive(&sorted, config);
    }

    log_debug!(
        "detected {} take clusters from {} segments",
        clusters.len(),
        segments.len()
    );

    clusters
}

/// Stable ascending sort by start time.
///
/// `total_cmp` keeps the order total when a time-code failed to parse; NaN
/// starts sort to the end.
pub fn sort_by_start(segments: &[Segment]) -> Vec<&Segment> {
    let mut sorted: Vec<&Segment> = segments.iter().collect();
    sorted.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
    sorted
}

/// Strategy 1: chain adjacent segments separated by a short positive gap.
fn detect_consecutive(sorted: &[&Segment], config: &ClusterConfig) -> Vec<TakeCluster> {
    let mut clusters = Vec::new();
    let mut group: Vec<usize> = Vec::new();

    for i in 0..sorted.len().saturating_sub(1) {
        let gap = sorted[i + 1].start_time - sorted[i].end_time;

        if gap > 0.0 && gap < config.consecutive_max_gap_secs {
            if group.is_empty() {
                group.push(i);
            }
            group.push(i + 1);
        } else if !group.is_empty() {
            let members = std::mem::take(&mut group);
            if let Some(cluster) = close_consecutive_group(sorted, &members, clusters.len(), config) {
                clusters.push(cluster);
            }
        }
    }

    if let Some(cluster) = close_consecutive_group(sorted, &group, clusters.len(), config) {
        clusters.push(cluster);
    }

    clusters
}

fn close_consecutive_group(
    sorted: &[&Segment],
    members: &[usize],
    index: usize,
    config: &ClusterConfig,
) -> Option<TakeCluster> {
    if members.len() < 2 {
        return None;
    }
    let last_index = *members.last()?;
    let attempts = collect_attempts(sorted, members);
    let range = span(&attempts);

    // Winner runs from the last attempt to the first segment comfortably past
    // the cluster, or a flat lookahead window when nothing follows.
    let winner_start = sorted[last_index].end_time;
    let horizon = range.end + config.consecutive_winner_lookahead_secs;
    let winner_end = sorted[last_index + 1..]
        .iter()
        .find(|segment| segment.start_time > horizon)
        .map(|segment| segment.start_time)
        .unwrap_or(horizon);

    let confidence = cluster_confidence(&attempts, config);
    log_debug!(
        "consecutive cluster: {} attempts, winner {:.2}-{:.2}",
        attempts.len(),
        winner_start,
        winner_end
    );

    Some(build_cluster(
        Strategy::Consecutive,
        index,
        attempts,
        Winner::gap(winner_start, winner_end, config.consecutive_winner_confidence),
        confidence,
        config,
    ))
}

/// Whether a segment looks like a failed or abandoned take.
pub fn is_retake(segment: &Segment, config: &ClusterConfig) -> bool {
    if matches!(
        segment.category,
        SegmentCategory::FalseStart | SegmentCategory::BadTake
    ) {
        return true;
    }

    let reason = segment.reason.to_lowercase();
    if config
        .retake_keywords
        .iter()
        .any(|keyword| reason.contains(&keyword.to_lowercase()))
    {
        return true;
    }

    segment.category == SegmentCategory::Pause
        && segment.duration_secs() < config.retake_pause_max_secs
}

fn has_finite_times(segment: &Segment) -> bool {
    segment.start_time.is_finite() && segment.end_time.is_finite()
}

/// Strategy 2: runs of retake-looking segments, split by long gaps.
fn detect_retakes(sorted: &[&Segment], config: &ClusterConfig) -> Vec<TakeCluster> {
    let mut clusters = Vec::new();
    let mut run: Vec<usize> = Vec::new();

    for (i, segment) in sorted.iter().enumerate() {
        // Unparseable times break the run like any non-retake segment.
        if !has_finite_times(segment) || !is_retake(segment, config) {
            if !run.is_empty() {
                let members = std::mem::take(&mut run);
                clusters.push(close_retake_run(sorted, &members, clusters.len(), config));
            }
            continue;
        }

        run.push(i);

        let closes = match sorted.get(i + 1) {
            None => true,
            Some(next) => next.start_time - segment.end_time > config.retake_max_gap_secs,
        };
        if closes {
            let members = std::mem::take(&mut run);
            clusters.push(close_retake_run(sorted, &members, clusters.len(), config));
        }
    }

    clusters
}

fn close_retake_run(
    sorted: &[&Segment],
    members: &[usize],
    index: usize,
    config: &ClusterConfig,
) -> TakeCluster {
    let attempts = collect_attempts(sorted, members);
    let last_index = members.last().copied().unwrap_or(0);

    // The winner is the unflagged stretch up to the next flagged segment.
    let winner_start = sorted[last_index].end_time;
    let winner_end = sorted[last_index + 1..]
        .iter()
        .find(|segment| segment.start_time > winner_start)
        .map(|segment| segment.start_time)
        .unwrap_or(winner_start + config.retake_winner_fallback_secs);

    let confidence = cluster_confidence(&attempts, config);
    log_debug!(
        "retake cluster: {} attempts starting at {:.2}",
        attempts.len(),
        attempts.first().map(|a| a.start_time).unwrap_or(f64::NAN)
    );

    build_cluster(
        Strategy::Retake,
        index,
        attempts,
        Winner::gap(winner_start, winner_end, config.retake_winner_confidence),
        confidence,
        config,
    )
}

/// Strategy 3: greedy grouping of nearby segments that read alike.
///
/// Each unused seed absorbs every later unused segment within the window whose
/// combined score against the seed clears the threshold. First match wins.
fn detect_similar(sorted: &[&Segment], config: &ClusterConfig) -> Vec<TakeCluster> {
    let mut clusters = Vec::new();
    let mut used = vec![false; sorted.len()];

    for i in 0..sorted.len() {
        if used[i] {
            continue;
        }
        let seed = sorted[i];
        let mut group = vec![i];

        for j in (i + 1)..sorted.len() {
            if used[j] {
                continue;
            }
            let candidate = sorted[j];
            let distance = candidate.start_time - seed.end_time;
            if distance > config.similarity_window_secs {
                break;
            }
            // NaN distance: neither within nor past the window
            if !(distance <= config.similarity_window_secs) {
                continue;
            }

            let score = combined_similarity(seed, candidate);
            if score > config.similarity_threshold {
                log_debug!(
                    "similar: {} ~ {} (score {:.2})",
                    seed.id,
                    candidate.id,
                    score
                );
                group.push(j);
                used[j] = true;
            }
        }

        if group.len() < 2 {
            continue;
        }
        used[i] = true;

        let attempts = collect_attempts(sorted, &group);
        let winner_start = group
            .last()
            .map(|&last| sorted[last].end_time)
            .unwrap_or(seed.end_time);
        let winner = Winner::gap(
            winner_start,
            winner_start + config.similarity_winner_secs,
            config.similarity_winner_confidence,
        );

        clusters.push(build_cluster(
            Strategy::Similar,
            clusters.len(),
            attempts,
            winner,
            config.similarity_cluster_confidence,
            config,
        ));
    }

    clusters
}

/// Strategy 4: pair up adjacent segments that nearly touch.
fn detect_aggressive(sorted: &[&Segment], config: &ClusterConfig) -> Vec<TakeCluster> {
    let mut clusters = Vec::new();
    let mut i = 0;

    while i + 1 < sorted.len() {
        let gap = sorted[i + 1].start_time - sorted[i].end_time;
        if !(gap >= 0.0 && gap < config.aggressive_max_gap_secs) {
            i += 1;
            continue;
        }

        let attempts = collect_attempts(sorted, &[i, i + 1]);
        let winner_start = sorted[i + 1].end_time;
        let winner = Winner::gap(
            winner_start,
            winner_start + config.aggressive_winner_secs,
            config.aggressive_winner_confidence,
        );
        let confidence = cluster_confidence(&attempts, config);

        log_debug!("aggressive pair: {} + {}", sorted[i].id, sorted[i + 1].id);
        clusters.push(build_cluster(
            Strategy::Aggressive,
            clusters.len(),
            attempts,
            winner,
            confidence,
            config,
        ));
        i += 2;
    }

    clusters
}

fn collect_attempts(sorted: &[&Segment], members: &[usize]) -> Vec<Segment> {
    members.iter().map(|&idx| sorted[idx].clone()).collect()
}

/// Overall span of the attempts.
fn span(attempts: &[Segment]) -> TimeRange {
    let start = attempts
        .iter()
        .map(|attempt| attempt.start_time)
        .fold(f64::INFINITY, f64::min);
    let end = attempts
        .iter()
        .map(|attempt| attempt.end_time)
        .fold(f64::NEG_INFINITY, f64::max);
    TimeRange::new(start, end)
}

fn build_cluster(
    strategy: Strategy,
    index: usize,
    attempts: Vec<Segment>,
    winner: Winner,
    confidence: f64,
    config: &ClusterConfig,
) -> TakeCluster {
    TakeCluster {
        id: strategy.cluster_id(index),
        name: infer_cluster_name(&attempts, config),
        pattern: determine_pattern(&attempts),
        time_range: span(&attempts),
        winner: Some(winner),
        confidence,
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, start: f64, end: f64, category: &str, reason: &str) -> Segment {
        Segment::new(id, start, end, category, reason)
    }

    fn sorted_refs(segments: &[Segment]) -> Vec<&Segment> {
        sort_by_start(segments)
    }

    #[test]
    fn sort_is_stable_for_equal_starts() {
        let segments = vec![
            seg("late", 50.0, 52.0, "pause", ""),
            seg("first", 10.0, 11.0, "pause", ""),
            seg("second", 10.0, 12.0, "pause", ""),
        ];
        let ids: Vec<&str> = sort_by_start(&segments).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "late"]);
    }

    #[test]
    fn unparseable_starts_sort_last() {
        let mut broken = seg("broken", 0.0, 1.0, "pause", "");
        broken.start_time = f64::NAN;
        let segments = vec![broken, seg("ok", 30.0, 31.0, "pause", "")];
        let sorted = sort_by_start(&segments);
        assert_eq!(sorted[0].id, "ok");
    }

    #[test]
    fn consecutive_chains_short_gaps_only() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "tangent", ""),
            seg("b", 105.0, 107.0, "tangent", ""),
            seg("c", 110.0, 112.0, "tangent", ""),
            seg("d", 140.0, 141.0, "tangent", ""),
        ];
        let clusters = detect_consecutive(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 1);
        let ids: Vec<&str> = clusters[0].attempts.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(clusters[0].id, "cluster-consecutive-0");
        assert_eq!(clusters[0].time_range, TimeRange::new(100.0, 112.0));
    }

    #[test]
    fn consecutive_ignores_touching_and_overlapping_neighbours() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "tangent", ""),
            seg("b", 102.0, 104.0, "tangent", ""),
            seg("c", 103.0, 106.0, "tangent", ""),
        ];
        assert!(detect_consecutive(&sorted_refs(&segments), &config).is_empty());
    }

    #[test]
    fn consecutive_winner_looks_past_the_horizon() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "tangent", ""),
            seg("b", 104.0, 106.0, "tangent", ""),
            seg("near", 120.0, 121.0, "tangent", ""),
            seg("far", 150.0, 151.0, "tangent", ""),
        ];
        let clusters = detect_consecutive(&sorted_refs(&segments), &config);
        let winner = clusters[0].winner.as_ref().unwrap();

        assert_eq!(winner.start_time, 106.0);
        assert_eq!(winner.end_time, 150.0);
        assert!(winner.is_gap);
    }

    #[test]
    fn consecutive_winner_falls_back_to_lookahead() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "tangent", ""),
            seg("b", 104.0, 106.0, "tangent", ""),
        ];
        let clusters = detect_consecutive(&sorted_refs(&segments), &config);
        assert_eq!(clusters[0].winner.as_ref().unwrap().end_time, 136.0);
    }

    #[test]
    fn retake_predicate_covers_categories_keywords_and_short_pauses() {
        let config = ClusterConfig::default();
        assert!(is_retake(&seg("a", 0.0, 1.0, "false start", ""), &config));
        assert!(is_retake(&seg("b", 0.0, 1.0, "bad_take", ""), &config));
        assert!(is_retake(&seg("c", 0.0, 1.0, "tangent", "Speaker says TRY AGAIN"), &config));
        assert!(is_retake(&seg("d", 0.0, 9.5, "pause", "silence"), &config));
        assert!(!is_retake(&seg("e", 0.0, 12.0, "pause", "silence"), &config));
        assert!(!is_retake(&seg("f", 0.0, 3.0, "tangent", "off topic"), &config));
    }

    #[test]
    fn retake_runs_split_on_long_gaps_and_keep_singletons() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "false_start", ""),
            seg("b", 110.0, 112.0, "bad_take", ""),
            seg("c", 200.0, 202.0, "false_start", ""),
        ];
        let clusters = detect_retakes(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].attempts.len(), 2);
        assert_eq!(clusters[1].attempts.len(), 1);
        assert_eq!(clusters[1].id, "cluster-retake-1");

        let first_winner = clusters[0].winner.as_ref().unwrap();
        assert_eq!(first_winner.start_time, 112.0);
        assert_eq!(first_winner.end_time, 200.0);
        assert_eq!(first_winner.confidence, 0.9);
    }

    #[test]
    fn retake_run_breaks_on_non_retake_segment() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "false_start", ""),
            seg("mid", 104.0, 120.0, "tangent", "off topic"),
            seg("b", 122.0, 124.0, "false_start", ""),
        ];
        let clusters = detect_retakes(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].winner.as_ref().unwrap().end_time, 104.0);
    }

    #[test]
    fn similar_groups_matching_reasons_within_window() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 104.0, "redundant", "repeats the pricing point"),
            seg("b", 130.0, 134.0, "redundant", "repeats the pricing point again"),
            seg("c", 300.0, 304.0, "redundant", "repeats the pricing point"),
        ];
        let clusters = detect_similar(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].attempts.len(), 2);
        assert_eq!(clusters[0].confidence, 0.85);
        let winner = clusters[0].winner.as_ref().unwrap();
        assert_eq!(winner.start_time, 134.0);
        assert_eq!(winner.end_time, 154.0);
    }

    #[test]
    fn similar_uses_each_segment_once() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "technical", "audio glitch"),
            seg("b", 110.0, 112.0, "technical", "audio glitch"),
            seg("c", 120.0, 122.0, "technical", "audio glitch"),
        ];
        let clusters = detect_similar(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].attempts.len(), 3);
    }

    #[test]
    fn aggressive_pairs_without_triples() {
        let config = ClusterConfig::default();
        let segments = vec![
            seg("a", 100.0, 102.0, "tangent", ""),
            seg("b", 102.0, 104.0, "technical", ""),
            seg("c", 105.0, 107.0, "tangent", ""),
            seg("d", 109.0, 111.0, "technical", ""),
        ];
        let clusters = detect_aggressive(&sorted_refs(&segments), &config);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].attempts[1].id, "b");
        assert_eq!(clusters[1].attempts[0].id, "c");
        let winner = clusters[0].winner.as_ref().unwrap();
        assert_eq!(winner.end_time - winner.start_time, 10.0);
    }

    #[test]
    fn aggressive_fallback_only_when_nothing_else_matched() {
        let config = ClusterConfig::default();
        let touching = vec![
            seg("a", 100.0, 103.0, "tangent", "talks about lunch"),
            seg("b", 103.0, 110.0, "technical", "microphone bump"),
        ];
        let clusters = detect_clusters(&touching, &config);

        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].id.starts_with("cluster-aggressive-"));
    }

    #[test]
    fn nan_segments_never_join_groups() {
        let config = ClusterConfig::default();
        let mut broken = seg("broken", 0.0, 0.0, "tangent", "same words here");
        broken.start_time = f64::NAN;
        broken.end_time = f64::NAN;
        let segments = vec![broken, seg("ok", 100.0, 102.0, "tangent", "same words here")];

        let clusters = detect_clusters(&segments, &config);
        assert!(clusters
            .iter()
            .all(|cluster| cluster.attempts.iter().all(|s| s.id != "broken")));
    }

    #[test]
    fn unparseable_retake_never_joins_a_run() {
        let config = ClusterConfig::default();
        let segments = vec![
            Segment::new("s1", "0:10", "0:12", "false_start", "restart"),
            Segment::new("broken", "garbage", "more garbage", "false_start", "restart"),
        ];

        let clusters = detect_clusters(&segments, &config);

        assert!(clusters.iter().all(|cluster| !cluster.contains("broken")));
        let retake = clusters
            .iter()
            .find(|cluster| cluster.id.starts_with("cluster-retake-"))
            .unwrap();
        assert_eq!(retake.attempts.len(), 1);
        assert_eq!(retake.attempts[0].id, "s1");
    }
}
