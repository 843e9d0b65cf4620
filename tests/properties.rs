//! Property tests for ordering, coverage and time-code invariants

use std::collections::HashSet;

use proptest::prelude::*;
use takecut_lib::models::Segment;
use takecut_lib::{detect_clusters, format_time, parse_time, resolve_segment_overlaps, ClusterConfig};

const CATEGORIES: &[&str] = &[
    "pause",
    "false_start",
    "filler_words",
    "bad_take",
    "redundant",
    "tangent",
    "camera shake",
];

const REASONS: &[&str] = &[
    "restart",
    "um",
    "long silence",
    "repeats the previous point",
    "speaker tries again",
    "",
];

fn segment_strategy() -> impl Strategy<Value = (u32, u32, usize, usize, u32)> {
    (
        0u32..60_000,
        1u32..3_000,
        0..CATEGORIES.len(),
        0..REASONS.len(),
        0u32..=100,
    )
}

fn segments_strategy() -> impl Strategy<Value = Vec<Segment>> {
    prop::collection::vec(segment_strategy(), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (start, len, category, reason, confidence))| {
                let start = start as f64 / 100.0;
                let end = start + len as f64 / 100.0;
                Segment::new(format!("seg-{i}"), start, end, CATEGORIES[category], REASONS[reason])
                    .with_confidence(confidence as f64 / 100.0)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn primary_segments_never_overlap(segments in segments_strategy()) {
        let resolved = resolve_segment_overlaps(&segments);

        for (i, a) in resolved.primary.iter().enumerate() {
            for b in &resolved.primary[i + 1..] {
                prop_assert!(!a.overlaps(b), "{} overlaps {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn every_segment_is_primary_or_secondary(segments in segments_strategy()) {
        let resolved = resolve_segment_overlaps(&segments);

        prop_assert_eq!(resolved.primary.len() + resolved.secondary.len(), segments.len());

        let mut seen = HashSet::new();
        for segment in &resolved.primary {
            prop_assert!(seen.insert(segment.id.clone()));
        }
        for suppressed in &resolved.secondary {
            prop_assert!(seen.insert(suppressed.segment.id.clone()));
            prop_assert!(resolved.primary.iter().any(|p| p.id == suppressed.overlap.covered_by.id));
        }
    }

    #[test]
    fn detection_ignores_input_order(segments in segments_strategy()) {
        let config = ClusterConfig::default();
        let mut reversed = segments.clone();
        reversed.reverse();

        let first = detect_clusters(&segments, &config);
        let again = detect_clusters(&segments, &config);
        prop_assert_eq!(&first, &again);

        // Only distinct starts have a unique sorted order.
        let starts: HashSet<u64> = segments.iter().map(|s| s.start_time.to_bits()).collect();
        if starts.len() == segments.len() {
            prop_assert_eq!(first, detect_clusters(&reversed, &config));
        }
    }

    #[test]
    fn clusters_only_reference_input_segments(segments in segments_strategy()) {
        let ids: HashSet<&str> = segments.iter().map(|s| s.id.as_str()).collect();

        for cluster in detect_clusters(&segments, &ClusterConfig::default()) {
            prop_assert!(!cluster.attempts.is_empty());
            prop_assert!(cluster.confidence <= 1.0);
            for attempt in &cluster.attempts {
                prop_assert!(ids.contains(attempt.id.as_str()));
            }
        }
    }

    #[test]
    fn time_codes_round_trip(hundredths in 0u64..720_000) {
        let code = format!(
            "{:02}:{:02}.{:02}",
            hundredths / 6000,
            (hundredths % 6000) / 100,
            hundredths % 100
        );
        let seconds = parse_time(&code);

        prop_assert!((parse_time(&format_time(seconds)) - seconds).abs() < 0.01);
    }
}
