//! Finder pipeline.
//!
//! - `run_pipeline`: Diff coverage, classify new records, persist, publish
//! - `regenerate_feed`: Re-render the feed from the stored catalog
//! - `run_label_discovery`: Report which shinsho series the labels cover

pub mod classify;
pub mod diff;
pub mod labels;
pub mod normalize;
pub mod recency;
pub mod run;

pub use classify::{ImprintClassifier, MatchMode, is_tracked_imprint};
pub use diff::{IsbnDiffEngine, SnapshotDiff, calculate_diff};
pub use labels::{LabelCount, LabelReport, LabelTally, normalize_label, run_label_discovery};
pub use normalize::{normalize, series_name};
pub use recency::{RecencyPolicy, ReleaseFacts, is_new_release};
pub use run::{RunSummary, regenerate_feed, run_pipeline};
