pub mod resolve;
pub mod selection;

pub use resolve::{
    find_overlapping_segments, resolve_segment_overlaps, OverlapPartition, ResolvedSegments,
};
pub use selection::{apply_selections, normalize_selection, EditDecision};
