pub mod cluster;
pub mod overlap;
pub mod segment;
pub mod selection;

pub use cluster::{ClusterPattern, TakeCluster, Winner};
pub use overlap::{CoverKind, CoveredBy, OverlapInfo, SuppressedSegment};
pub use segment::{Segment, SegmentCategory, TimeRange};
pub use selection::{ClusterSelection, SelectedWinner};
