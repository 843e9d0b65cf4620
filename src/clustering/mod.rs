pub mod algorithm;
pub mod config;
pub mod naming;
pub mod scoring;

pub use algorithm::{detect_clusters, is_retake, sort_by_start, Strategy};
pub use config::ClusterConfig;
pub use scoring::{category_similarity, combined_similarity, duration_similarity, text_similarity};
