use thiserror::Error;

/// Errors raised while building the nested tree.
#[derive(Debug, Error)]
pub enum FlatironError {
    /// A file needs `segment` to be a directory level, but a file already sits there.
    #[error("cannot place '{path}': '{segment}' is already a value, not a nested mapping")]
    NotAMapping { path: String, segment: String },

    /// A path produced no key at all.
    #[error("file path '{0}' has no segments")]
    EmptyPath(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type FlatironResult<T> = Result<T, FlatironError>;
