use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown duplicate strategy: {0} (expected prohibit, keep-first, keep-last or keep-all)")]
    UnknownStrategy(String),

    #[error("unknown encoding: {0} (expected utf8, latin1 or raw)")]
    UnknownEncoding(String),
}
