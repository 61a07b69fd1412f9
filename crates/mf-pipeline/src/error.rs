//! Error types for the merge pipeline.
//!
//! Every variant of [`BuildError`] is fatal to the build that produced it.
//! Nothing is retried and nothing is swallowed; a failed build means no
//! valid output was produced.

use std::path::PathBuf;

use mf_glob::MatchError;
use mf_types::{DuplicateStrategy, RootIndex};

/// Error type returned by user callbacks (transform, merge).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Static configuration problems, detected before any filesystem access.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Sorting is disabled but the duplicate strategy depends on order.
    #[error("sorting is disabled, but duplicate strategy '{0}' needs a deterministic order")]
    UnsortedOrderSensitive(DuplicateStrategy),

    /// The configured single output file name is unusable.
    #[error("invalid output file name '{name}': {reason}")]
    InvalidOutputFileName { name: String, reason: String },

    /// The glob patterns could not be compiled.
    #[error("invalid patterns: {0}")]
    Patterns(#[from] MatchError),

    /// No aggregation callback was supplied.
    #[error("a merge callback is required")]
    MissingMerge,

    /// No input roots were supplied.
    #[error("at least one input root is required")]
    NoInputs,

    /// The output directory would clobber an input root.
    #[error("output directory {} overlaps input root {}", .output.display(), .input.display())]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },
}

/// A relative path was found in more than one root under the prohibit strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("file '{path}' appears in root {root}, but was already seen in root {first_seen}")]
pub struct DuplicateFileError {
    /// The colliding relative path.
    pub path: String,
    /// The root of the entry that collided.
    pub root: RootIndex,
    /// The root the path was first recorded from.
    pub first_seen: RootIndex,
}

/// The merge callback returned a shape the output configuration does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeMismatchError {
    #[error("expected merge to return contents for the single file '{output_file_name}', but it returned a list of files")]
    ExpectedSingle { output_file_name: String },

    #[error("expected merge to return a list of files, since no output file name is configured, but it returned single file contents")]
    ExpectedMultiple,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("duplicate file: {0}")]
    Duplicate(#[from] DuplicateFileError),

    /// A transform callback failed. The callback's error is kept as the source.
    #[error("transform failed for '{path}' in root {root}: {source}")]
    Transform {
        path: String,
        root: RootIndex,
        #[source]
        source: CallbackError,
    },

    /// The merge callback failed.
    #[error("merge callback failed: {0}")]
    Merge(#[source] CallbackError),

    #[error("merge result shape mismatch: {0}")]
    ShapeMismatch(#[from] ShapeMismatchError),

    /// Reading an input or writing an output failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path matching failed: {0}")]
    Match(#[from] MatchError),

    /// A merge result named a path that would escape the output directory.
    #[error("invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: String, reason: String },

    /// A pipeline task panicked or was cancelled.
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors detected before the build touched the filesystem.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Convenience alias for pipeline results.
pub type BuildResult<T> = Result<T, BuildError>;
