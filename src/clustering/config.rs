use serde::{Deserialize, Serialize};

/// Configuration for take-cluster detection with tunable thresholds.
///
/// Defaults are the empirically chosen values; a settings file may override
/// any subset of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Consecutive strategy: adjacent segments chain while the gap is in (0, this)
    pub consecutive_max_gap_secs: f64,
    /// Consecutive winner ends at the first segment more than this far past the cluster
    pub consecutive_winner_lookahead_secs: f64,
    pub consecutive_winner_confidence: f64,

    /// Retake strategy: a run is flushed once the gap to the next segment exceeds this
    pub retake_max_gap_secs: f64,
    /// Pauses shorter than this count as retake evidence
    pub retake_pause_max_secs: f64,
    /// Retake winner length when no later segment bounds it
    pub retake_winner_fallback_secs: f64,
    pub retake_winner_confidence: f64,
    /// Case-insensitive substrings of `reason` that mark a retake
    pub retake_keywords: Vec<String>,

    /// Similarity strategy: candidates must start within this many seconds of the seed's end
    pub similarity_window_secs: f64,
    /// Combined score (text + category + duration) must exceed this
    pub similarity_threshold: f64,
    pub similarity_cluster_confidence: f64,
    pub similarity_winner_secs: f64,
    pub similarity_winner_confidence: f64,

    /// Fallback strategy: adjacent pairs with gap in [0, this) are paired
    pub aggressive_max_gap_secs: f64,
    pub aggressive_winner_secs: f64,
    pub aggressive_winner_confidence: f64,

    /// Clusters with at least this many attempts get the confidence bonus
    pub large_cluster_min_attempts: usize,
    pub large_cluster_bonus: f64,

    /// Clusters starting before this point are named "Opening Statement"
    pub opening_window_secs: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            consecutive_max_gap_secs: 10.0,
            consecutive_winner_lookahead_secs: 30.0,
            consecutive_winner_confidence: 0.8,
            retake_max_gap_secs: 20.0,
            retake_pause_max_secs: 10.0,
            retake_winner_fallback_secs: 30.0,
            retake_winner_confidence: 0.9,
            retake_keywords: [
                "restart",
                "try again",
                "false start",
                "multiple attempts",
                "retake",
                "start over",
                "take",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
            similarity_window_secs: 60.0,
            similarity_threshold: 0.4,
            similarity_cluster_confidence: 0.85,
            similarity_winner_secs: 20.0,
            similarity_winner_confidence: 0.7,
            aggressive_max_gap_secs: 5.0,
            aggressive_winner_secs: 10.0,
            aggressive_winner_confidence: 0.6,
            large_cluster_min_attempts: 3,
            large_cluster_bonus: 0.05,
            opening_window_secs: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: ClusterConfig =
            serde_json::from_str(r#"{"similarity_threshold": 0.6}"#).unwrap();

        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.consecutive_max_gap_secs, 10.0);
        assert_eq!(config.retake_keywords.len(), 7);
    }
}
