use crate::clustering::config::ClusterConfig;
use crate::models::{ClusterPattern, Segment};
use crate::timecode::format_time;

/// Keyword table for cluster labels, checked in order after the position rule.
const NAME_KEYWORDS: &[(&[&str], &str)] = &[
    (&["introduction", "intro"], "Introduction"),
    (&["conclusion", "outro", "closing", "wrap up"], "Closing Remarks"),
    (&["transition"], "Transition"),
    (&["explain", "explanation"], "Explanation"),
    (&["demo", "demonstration"], "Demo Section"),
];

const INTRO_KEYWORDS: &[&str] = &["introduction", "intro"];
const PRACTICE_KEYWORDS: &[&str] = &["practice", "warm up", "warm-up", "rehears"];

fn joined_reasons(attempts: &[Segment]) -> String {
    attempts
        .iter()
        .map(|attempt| attempt.reason.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Human label for a cluster, from the first attempt's position and the
/// attempts' reasons.
pub fn infer_cluster_name(attempts: &[Segment], config: &ClusterConfig) -> String {
    let Some(first) = attempts.first() else {
        return "Untitled Section".to_string();
    };

    if first.start_time < config.opening_window_secs {
        return "Opening Statement".to_string();
    }

    let reasons = joined_reasons(attempts);
    for (keywords, name) in NAME_KEYWORDS {
        if mentions_any(&reasons, keywords) {
            return name.to_string();
        }
    }

    format!("Section at {}", format_time(first.start_time))
}

pub fn determine_pattern(attempts: &[Segment]) -> ClusterPattern {
    let reasons = joined_reasons(attempts);

    if mentions_any(&reasons, INTRO_KEYWORDS) {
        ClusterPattern::RepeatedIntro
    } else if attempts.len() > 3 {
        ClusterPattern::MultipleTakes
    } else if mentions_any(&reasons, PRACTICE_KEYWORDS) {
        ClusterPattern::PracticeRun
    } else {
        ClusterPattern::Retake
    }
}

/// Mean attempt confidence, plus a bonus for large clusters, capped at 1.
pub fn cluster_confidence(attempts: &[Segment], config: &ClusterConfig) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }

    let mean = attempts.iter().map(|attempt| attempt.confidence).sum::<f64>()
        / attempts.len() as f64;
    let bonus = if attempts.len() >= config.large_cluster_min_attempts {
        config.large_cluster_bonus
    } else {
        0.0
    };

    (mean + bonus).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(start: f64, reason: &str) -> Segment {
        Segment::new(format!("s{start}"), start, start + 2.0, "bad take", reason)
    }

    #[test]
    fn early_clusters_are_opening_statements() {
        let config = ClusterConfig::default();
        let name = infer_cluster_name(&[at(12.0, "speaker explains the demo")], &config);
        assert_eq!(name, "Opening Statement");
    }

    #[test]
    fn keywords_name_later_clusters() {
        let config = ClusterConfig::default();
        assert_eq!(
            infer_cluster_name(&[at(300.0, "Second try at the conclusion")], &config),
            "Closing Remarks"
        );
        assert_eq!(
            infer_cluster_name(&[at(300.0, "awkward transition to pricing")], &config),
            "Transition"
        );
        assert_eq!(
            infer_cluster_name(&[at(125.5, "stumbled")], &config),
            "Section at 02:05.50"
        );
    }

    #[test]
    fn pattern_prefers_intro_then_size() {
        let intro = vec![at(5.0, "Repeated introduction")];
        assert_eq!(determine_pattern(&intro), ClusterPattern::RepeatedIntro);

        let many: Vec<Segment> = (0..4).map(|i| at(i as f64 * 5.0, "stumble")).collect();
        assert_eq!(determine_pattern(&many), ClusterPattern::MultipleTakes);

        let practice = vec![at(5.0, "practice run before the real take")];
        assert_eq!(determine_pattern(&practice), ClusterPattern::PracticeRun);

        assert_eq!(determine_pattern(&[at(5.0, "stumble")]), ClusterPattern::Retake);
    }

    #[test]
    fn confidence_is_mean_with_large_cluster_bonus() {
        let config = ClusterConfig::default();
        let pair = vec![
            at(0.0, "").with_confidence(0.6),
            at(5.0, "").with_confidence(0.8),
        ];
        assert!((cluster_confidence(&pair, &config) - 0.7).abs() < 1e-9);

        let triple = vec![
            at(0.0, "").with_confidence(0.6),
            at(5.0, "").with_confidence(0.8),
            at(9.0, "").with_confidence(0.7),
        ];
        assert!((cluster_confidence(&triple, &config) - 0.75).abs() < 1e-9);

        let confident = vec![
            at(0.0, "").with_confidence(1.0),
            at(5.0, "").with_confidence(0.99),
            at(9.0, "").with_confidence(1.0),
        ];
        assert_eq!(cluster_confidence(&confident, &config), 1.0);
    }
}
