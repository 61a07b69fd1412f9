//! Merge pipeline for mergefiles.
//!
//! Collects files matching a pattern set from several ordered input roots,
//! puts them in a deterministic order, resolves duplicate relative paths,
//! hands the result to a merge callback, and writes what it returns into an
//! output directory.
//!
//! ```text
//! roots ─► collect ─► sequence ─► deduplicate ─► merge ─► write
//!          (concurrent)  (sort)     (strategy)   (callback) (reset + write)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mf_pipeline::{merge_fn, BuildConfiguration, MergeFiles};
//! use mf_types::{DuplicateStrategy, MergeOutput};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfiguration::builder()
//!     .duplicates(DuplicateStrategy::KeepLast)
//!     .output_file_name("merged.json")
//!     .merge(merge_fn(|files| Ok(MergeOutput::from(serde_json::to_string(&files)?))))
//!     .build()?;
//!
//! let merge = MergeFiles::new(vec!["a".into(), "b".into()], "dist", config)?;
//! let report = merge.build().await?;
//! println!("wrote {} files, digest {}", report.written.len(), report.digest_hex());
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod collector;
pub mod config;
pub mod dedup;
pub mod error;
pub mod merge;
pub mod plugin;
pub mod reader;
pub mod sequencer;
pub mod writer;

// Re-exports for convenience.
pub use callback::{merge_fn, transform_fn, Comparator, Merge, MergeFn, TransformFile, TransformFn};
pub use config::{BuildConfiguration, BuildConfigurationBuilder, MergeOptions, SortOrder};
pub use dedup::deduplicate;
pub use error::{
    BuildError, BuildResult, CallbackError, ConfigError, DuplicateFileError, ShapeMismatchError,
};
pub use merge::OutputShape;
pub use plugin::{BuildReport, MergeFiles};
pub use reader::FileReader;
pub use sequencer::{default_order, sequence};
pub use writer::{check_relative_path, WriteReport, Writer};
