use std::collections::HashSet;

use crate::models::{Segment, SegmentCategory};

/// Jaccard index of the lower-cased whitespace token sets.
///
/// Two strings without tokens share nothing, so the result is 0 rather than
/// 0/0.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let tokens_a: HashSet<&str> = a_lower.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b_lower.split_whitespace().collect();

    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    intersection as f64 / union as f64
}

/// 0.5 for the same known category, 0 otherwise.
pub fn category_similarity(a: &SegmentCategory, b: &SegmentCategory) -> f64 {
    if a.is_known() && a == b {
        0.5
    } else {
        0.0
    }
}

/// 0.3 when the durations differ by less than half of the longer one.
pub fn duration_similarity(d1: f64, d2: f64) -> f64 {
    let relative_difference = (d1 - d2).abs() / d1.max(d2);
    // NaN (both zero, or unparseable times) fails the comparison.
    if relative_difference < 0.5 {
        0.3
    } else {
        0.0
    }
}

/// Unweighted sum of the three signals, in [0, 1.8].
pub fn combined_similarity(a: &Segment, b: &Segment) -> f64 {
    text_similarity(&a.reason, &b.reason)
        + category_similarity(&a.category, &b.category)
        + duration_similarity(a.duration_secs(), b.duration_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_over_token_sets() {
        assert_eq!(text_similarity("the quick fox", "The Quick Fox"), 1.0);
        assert_eq!(text_similarity("a b", "b c"), 1.0 / 3.0);
        assert_eq!(text_similarity("alpha", "beta"), 0.0);
    }

    #[test]
    fn repeated_tokens_count_once() {
        assert_eq!(text_similarity("um um um", "um"), 1.0);
    }

    #[test]
    fn empty_strings_have_no_similarity() {
        assert_eq!(text_similarity("", ""), 0.0);
        assert_eq!(text_similarity("   ", "\t"), 0.0);
        assert_eq!(text_similarity("", "word"), 0.0);
    }

    #[test]
    fn categories_match_only_when_known() {
        assert_eq!(
            category_similarity(&SegmentCategory::Pause, &SegmentCategory::Pause),
            0.5
        );
        assert_eq!(
            category_similarity(&SegmentCategory::Pause, &SegmentCategory::BadTake),
            0.0
        );
        let custom = SegmentCategory::Other("cough".into());
        assert_eq!(category_similarity(&custom, &custom), 0.0);
    }

    #[test]
    fn durations_within_half_match() {
        assert_eq!(duration_similarity(4.0, 5.0), 0.3);
        assert_eq!(duration_similarity(2.0, 4.0), 0.0);
        assert_eq!(duration_similarity(0.0, 0.0), 0.0);
        assert_eq!(duration_similarity(f64::NAN, 3.0), 0.0);
    }

    #[test]
    fn combined_score_sums_signals() {
        let a = Segment::new("a", 0.0, 4.0, "bad take", "stumbled over intro");
        let b = Segment::new("b", 10.0, 14.0, "bad take", "stumbled over intro");
        assert!((combined_similarity(&a, &b) - 1.8).abs() < 1e-9);
    }
}
