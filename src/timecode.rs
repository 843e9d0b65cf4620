//! Conversion between human time-codes and seconds.
//!
//! Everything inside the engine works on `f64` seconds. Time-code strings only
//! exist at the serialization boundary: segments arrive as `MM:SS.mmm` or
//! `HH:MM:SS.mmm` (or plain numbers) and leave as `MM:SS.ss`.

use serde::{Deserialize, Serialize};

/// A time value as it arrives on the wire: either a time-code string or a
/// number of seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Seconds(f64),
    Text(String),
}

impl RawTime {
    pub fn seconds(&self) -> f64 {
        match self {
            RawTime::Seconds(value) => *value,
            RawTime::Text(code) => parse_time(code),
        }
    }
}

impl From<&str> for RawTime {
    fn from(code: &str) -> Self {
        RawTime::Text(code.to_string())
    }
}

impl From<f64> for RawTime {
    fn from(seconds: f64) -> Self {
        RawTime::Seconds(seconds)
    }
}

/// Parse `MM:SS[.mmm]` or `HH:MM:SS[.mmm]` into seconds.
///
/// Any other shape falls back to a lenient float parse of the whole string.
/// Garbage yields NaN; callers compare with `<`/`>` so a NaN segment simply
/// never joins a group.
pub fn parse_time(code: &str) -> f64 {
    let parts: Vec<&str> = code.trim().split(':').collect();
    match parts.as_slice() {
        [minutes, seconds] => lenient_float(minutes) * 60.0 + lenient_float(seconds),
        [hours, minutes, seconds] => {
            lenient_float(hours) * 3600.0 + lenient_float(minutes) * 60.0 + lenient_float(seconds)
        }
        _ => lenient_float(code),
    }
}

/// Format seconds as `MM:SS.ss`.
///
/// Always the 2-part form, even for values past the hour (`75:00.00`).
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "NaN".to_string();
    }

    let sign = if seconds < 0.0 { "-" } else { "" };
    // Round once in hundredths so 59.999 carries into the minute instead of
    // printing "00:60.00".
    let hundredths = (seconds.abs() * 100.0).round() as u64;
    let minutes = hundredths / 6000;
    let rest = hundredths % 6000;

    format!("{sign}{minutes:02}:{:02}.{:02}", rest / 100, rest % 100)
}

/// Parse the longest numeric prefix of `text`, NaN when there is none.
fn lenient_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let candidate: &str = {
        let end = trimmed
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_digit() || matches!(*c, '.' | '+' | '-' | 'e' | 'E')))
            .map(|(idx, _)| idx)
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };

    // Shrink from the right until the prefix parses ("12.5e" -> "12.5").
    let mut end = candidate.len();
    while end > 0 {
        if let Ok(value) = candidate[..end].parse::<f64>() {
            return value;
        }
        end -= 1;
    }

    if trimmed.starts_with("Infinity") {
        return f64::INFINITY;
    }
    f64::NAN
}

/// Serde adapter for `f64` second fields carried as time-codes on the wire.
pub mod serde_timecode {
    use super::{format_time, RawTime};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(seconds: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_time(*seconds))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTime::deserialize(deserializer).map(|raw| raw.seconds())
    }
}
