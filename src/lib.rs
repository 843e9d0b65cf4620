//! Take-cluster detection and cut-list overlap resolution.
//!
//! Input is the list of segments an external video analyzer flagged for
//! removal. [`clustering::detect_clusters`] groups repeated attempts at the
//! same content, [`overlap::resolve_segment_overlaps`] and
//! [`overlap::find_overlapping_segments`] reconcile overlapping flags, and
//! [`overlap::apply_selections`] turns the user's per-cluster choices into the
//! final disjoint cut list.

pub mod clustering;
pub mod commands;
pub mod models;
pub mod overlap;
pub mod report;
pub mod settings;
pub mod timecode;
mod utils;

use clap::Parser;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

pub use clustering::{detect_clusters, ClusterConfig};
pub use models::{ClusterSelection, OverlapInfo, SelectedWinner, Segment, TakeCluster};
pub use overlap::{
    apply_selections, find_overlapping_segments, resolve_segment_overlaps, EditDecision,
};
pub use timecode::{format_time, parse_time};

pub fn run() {
    let debug_mode = std::env::var("TAKECUT_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_mode {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let cli = commands::Cli::parse();
    if let Err(err) = commands::execute(cli) {
        crate::log_error!("{err:#}");
        std::process::exit(1);
    }
}
