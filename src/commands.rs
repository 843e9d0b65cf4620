use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    clustering::{detect_clusters, ClusterConfig},
    models::{ClusterSelection, Segment, TakeCluster},
    overlap::{apply_selections, resolve_segment_overlaps, EditDecision, ResolvedSegments},
    report::{analyze, AnalysisReport},
    settings::SettingsStore,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const CONFIG_ENV: &str = "TAKECUT_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "takecut", version, about = "Find retake clusters and build a clean cut list")]
pub struct Cli {
    /// Threshold overrides (JSON). Falls back to $TAKECUT_CONFIG.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect take clusters and resolve raw overlaps
    Detect {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Resolve overlaps between flagged segments
    Resolve {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply cluster selections and emit the final cut list
    Apply {
        input: PathBuf,
        #[arg(long)]
        selections: PathBuf,
        /// Previously detected clusters (list or report). Attempt times are taken
        /// from the input segments; re-detected from the input when omitted
        #[arg(long)]
        clusters: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Inspect or create the threshold file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective thresholds
    Show,
    /// Write the default thresholds to a file
    Init { path: PathBuf },
}

/// Segments arrive either bare or wrapped in an analyzer response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SegmentsFile {
    List(Vec<Segment>),
    Wrapped { segments: Vec<Segment> },
}

/// Clusters may be a bare list or the `detect` report.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClustersFile {
    List(Vec<TakeCluster>),
    Report { clusters: Vec<TakeCluster> },
}

pub fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Detect { input, out } => {
            let report = detect(&input, &config)?;
            write_output(&report, out.as_deref())
        }
        Command::Resolve { input, out } => {
            let resolved = resolve(&input)?;
            write_output(&resolved, out.as_deref())
        }
        Command::Apply {
            input,
            selections,
            clusters,
            out,
        } => {
            let decision = apply(&input, &selections, clusters.as_deref(), &config)?;
            write_output(&decision, out.as_deref())
        }
        Command::Config { action } => match action {
            ConfigAction::Show => write_output(&config, None),
            ConfigAction::Init { path } => {
                let store = SettingsStore::new(path)?;
                store.update(ClusterConfig::default())?;
                log_info!("wrote default thresholds to {}", store.path().display());
                Ok(())
            }
        },
    }
}

/// `--config` beats `$TAKECUT_CONFIG`; neither means defaults.
pub fn resolve_config(flag: Option<&Path>) -> Result<ClusterConfig> {
    let path = match flag {
        Some(path) => Some(path.to_path_buf()),
        None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
    };

    match path {
        Some(path) => Ok(SettingsStore::new(path)?.config()),
        None => Ok(ClusterConfig::default()),
    }
}

pub fn detect(input: &Path, config: &ClusterConfig) -> Result<AnalysisReport> {
    let segments = load_segments(input)?;
    let report = analyze(&segments, config);
    log_info!(
        "{}: {} segments, {} clusters, {:.2}s to cut",
        input.display(),
        report.segment_count,
        report.clusters.len(),
        report.summary.total_secs
    );
    Ok(report)
}

pub fn resolve(input: &Path) -> Result<ResolvedSegments> {
    let segments = load_segments(input)?;
    Ok(resolve_segment_overlaps(&segments))
}

pub fn apply(
    input: &Path,
    selections: &Path,
    clusters: Option<&Path>,
    config: &ClusterConfig,
) -> Result<EditDecision> {
    let segments = load_segments(input)?;
    let selections: Vec<ClusterSelection> = load_json(selections)?;
    let clusters = match clusters {
        Some(path) => {
            let loaded = match load_json::<ClustersFile>(path)? {
                ClustersFile::List(clusters) | ClustersFile::Report { clusters } => clusters,
            };
            restore_attempt_times(loaded, &segments)
        }
        None => detect_clusters(&segments, config),
    };

    let decision = apply_selections(&segments, &selections, &clusters);
    log_info!(
        "{} selections applied: {} cuts, {} preserved",
        selections.len(),
        decision.cuts.len(),
        decision.preserved.len()
    );
    Ok(decision)
}

/// Swap saved attempts for the input segments with the same id.
///
/// Cluster files carry hundredth-rounded time-codes; the input keeps the
/// analyzer's exact times, which the cut list must reproduce.
fn restore_attempt_times(clusters: Vec<TakeCluster>, segments: &[Segment]) -> Vec<TakeCluster> {
    let by_id: HashMap<&str, &Segment> = segments
        .iter()
        .map(|segment| (segment.id.as_str(), segment))
        .collect();

    clusters
        .into_iter()
        .map(|mut cluster| {
            for attempt in &mut cluster.attempts {
                match by_id.get(attempt.id.as_str()) {
                    Some(exact) => *attempt = (*exact).clone(),
                    None => {
                        log_warn!(
                            "attempt {} of {} is not in the input, keeping saved times",
                            attempt.id,
                            cluster.id
                        );
                    }
                }
            }
            cluster
        })
        .collect()
}

pub fn load_segments(path: &Path) -> Result<Vec<Segment>> {
    Ok(match load_json::<SegmentsFile>(path)? {
        SegmentsFile::List(segments) | SegmentsFile::Wrapped { segments } => segments,
    })
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn write_output<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, serialized)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{serialized}");
            Ok(())
        }
    }
}
