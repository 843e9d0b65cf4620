use serde::{Deserialize, Serialize};

/// What the user chose to keep for a cluster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "WinnerChoice", into = "WinnerChoice")]
pub enum SelectedWinner {
    /// Keep the synthesized gap winner and cut every attempt.
    Gap,
    /// Keep the attempt at this index instead.
    Attempt(usize),
}

/// Wire form: the string `"gap"` or an attempt index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WinnerChoice {
    Index(usize),
    Label(String),
}

impl TryFrom<WinnerChoice> for SelectedWinner {
    type Error = String;

    fn try_from(choice: WinnerChoice) -> Result<Self, Self::Error> {
        match choice {
            WinnerChoice::Index(index) => Ok(SelectedWinner::Attempt(index)),
            WinnerChoice::Label(label) => {
                let label = label.trim();
                if label.eq_ignore_ascii_case("gap") {
                    return Ok(SelectedWinner::Gap);
                }
                label
                    .parse::<usize>()
                    .map(SelectedWinner::Attempt)
                    .map_err(|_| format!("unknown winner selection '{label}'"))
            }
        }
    }
}

impl From<SelectedWinner> for WinnerChoice {
    fn from(winner: SelectedWinner) -> Self {
        match winner {
            SelectedWinner::Gap => WinnerChoice::Label("gap".to_string()),
            SelectedWinner::Attempt(index) => WinnerChoice::Index(index),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSelection {
    pub cluster_id: String,
    pub selected_winner: SelectedWinner,
    #[serde(default)]
    pub removed_segments: Vec<String>,
    #[serde(default)]
    pub kept_segments: Vec<String>,
}

impl ClusterSelection {
    pub fn new(cluster_id: impl Into<String>, selected_winner: SelectedWinner) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            selected_winner,
            removed_segments: Vec::new(),
            kept_segments: Vec::new(),
        }
    }

    pub fn removing<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.removed_segments.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn keeping<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kept_segments.extend(ids.into_iter().map(Into::into));
        self
    }
}
