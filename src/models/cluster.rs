use serde::{Deserialize, Serialize};

use crate::timecode::serde_timecode;

use super::{Segment, TimeRange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClusterPattern {
    RepeatedIntro,
    MultipleTakes,
    PracticeRun,
    Retake,
}

impl ClusterPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterPattern::RepeatedIntro => "repeated_intro",
            ClusterPattern::MultipleTakes => "multiple_takes",
            ClusterPattern::PracticeRun => "practice_run",
            ClusterPattern::Retake => "retake",
        }
    }
}

/// The interval the editor should keep in place of a cluster's attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    #[serde(with = "serde_timecode")]
    pub start_time: f64,
    #[serde(with = "serde_timecode")]
    pub end_time: f64,
    /// True when the winner is the unflagged content after the attempts
    /// rather than one of the attempts themselves.
    pub is_gap: bool,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_index: Option<usize>,
}

impl Winner {
    pub fn gap(start_time: f64, end_time: f64, confidence: f64) -> Self {
        Self {
            start_time,
            end_time,
            is_gap: true,
            confidence,
            attempt_index: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// A group of segments judged to be repeated attempts at the same content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TakeCluster {
    pub id: String,
    pub name: String,
    pub attempts: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    pub pattern: ClusterPattern,
    pub confidence: f64,
    pub time_range: TimeRange,
}

impl TakeCluster {
    pub fn attempt(&self, segment_id: &str) -> Option<&Segment> {
        self.attempts.iter().find(|attempt| attempt.id == segment_id)
    }

    pub fn contains(&self, segment_id: &str) -> bool {
        self.attempt(segment_id).is_some()
    }
}
