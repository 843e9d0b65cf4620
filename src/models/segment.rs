//! Flagged segment data model.
//!
//! Segments are produced by the external video analyzer, one per interval it
//! suggests cutting. The engine treats them as immutable inputs.

use serde::{Deserialize, Serialize};

use crate::timecode::{serde_timecode, RawTime};

/// Why the analyzer flagged a segment.
///
/// Unknown tags are kept verbatim in `Other` and never count as a category
/// match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SegmentCategory {
    Pause,
    FalseStart,
    FillerWords,
    BadTake,
    Redundant,
    Tangent,
    Technical,
    LowEnergy,
    LongExplanation,
    WeakTransition,
    Other(String),
}

impl SegmentCategory {
    pub fn as_str(&self) -> &str {
        match self {
            SegmentCategory::Pause => "pause",
            SegmentCategory::FalseStart => "false_start",
            SegmentCategory::FillerWords => "filler_words",
            SegmentCategory::BadTake => "bad_take",
            SegmentCategory::Redundant => "redundant",
            SegmentCategory::Tangent => "tangent",
            SegmentCategory::Technical => "technical",
            SegmentCategory::LowEnergy => "low_energy",
            SegmentCategory::LongExplanation => "long_explanation",
            SegmentCategory::WeakTransition => "weak_transition",
            SegmentCategory::Other(raw) => raw.as_str(),
        }
    }

    /// Accepts `false_start`, `false start`, `False-Start` and so on.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        match normalized.as_str() {
            "pause" => SegmentCategory::Pause,
            "false_start" => SegmentCategory::FalseStart,
            "filler_words" | "filler_word" | "filler" => SegmentCategory::FillerWords,
            "bad_take" => SegmentCategory::BadTake,
            "redundant" => SegmentCategory::Redundant,
            "tangent" => SegmentCategory::Tangent,
            "technical" => SegmentCategory::Technical,
            "low_energy" => SegmentCategory::LowEnergy,
            "long_explanation" => SegmentCategory::LongExplanation,
            "weak_transition" => SegmentCategory::WeakTransition,
            _ => SegmentCategory::Other(raw.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SegmentCategory::Other(_))
    }
}

impl Default for SegmentCategory {
    fn default() -> Self {
        SegmentCategory::Other(String::new())
    }
}

impl From<String> for SegmentCategory {
    fn from(raw: String) -> Self {
        SegmentCategory::parse(&raw)
    }
}

impl From<SegmentCategory> for String {
    fn from(category: SegmentCategory) -> Self {
        category.as_str().to_string()
    }
}

/// A closed-open `[start, end)` interval in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    #[serde(with = "serde_timecode")]
    pub start: f64,
    #[serde(with = "serde_timecode")]
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Strict overlap: touching intervals do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the shared portion, 0 when disjoint.
    pub fn overlap_secs(&self, other: &TimeRange) -> f64 {
        if !self.overlaps(other) {
            return 0.0;
        }
        self.end.min(other.end) - self.start.max(other.start)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    #[serde(with = "serde_timecode")]
    pub start_time: f64,
    #[serde(with = "serde_timecode")]
    pub end_time: f64,
    /// Seconds. Authoritative when present, even if it disagrees with the
    /// time-codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub category: SegmentCategory,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        start_time: impl Into<RawTime>,
        end_time: impl Into<RawTime>,
        category: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            start_time: start_time.into().seconds(),
            end_time: end_time.into().seconds(),
            duration: None,
            category: SegmentCategory::parse(category),
            confidence: 0.0,
            reason: reason.into(),
            transcript: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = Some(transcript.into());
        self
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.unwrap_or(self.end_time - self.start_time)
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        self.range().overlaps(&other.range())
    }
}
