use std::path::PathBuf;

/// Errors from pattern compilation and directory scanning.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No include pattern was given.
    #[error("pattern set is empty")]
    EmptyPatternSet,

    /// The root directory does not exist or is not a directory.
    #[error("input root is not a directory: {}", .0.display())]
    MissingRoot(PathBuf),

    /// A matched path is not valid UTF-8 and cannot be represented.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// The directory walk failed.
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Convenience alias for matcher results.
pub type MatchResult<T> = Result<T, MatchError>;
