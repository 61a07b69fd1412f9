//! The shapes an aggregation callback may return.

use serde::Serialize;

use crate::content::Blob;

/// One file of a multi-file merge result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
    pub blob: Blob,
}

impl OutputFile {
    pub fn new(path: impl Into<String>, blob: impl Into<Blob>) -> Self {
        Self {
            path: path.into(),
            blob: blob.into(),
        }
    }
}

/// The result of aggregation.
///
/// Which variant is legal is fixed by configuration: `Single` when an output
/// file name is configured, `Multiple` otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutput {
    Single(Blob),
    Multiple(Vec<OutputFile>),
}

impl MergeOutput {
    /// Short name of the shape, for diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Single(_) => "single file contents",
            Self::Multiple(_) => "a list of files",
        }
    }
}

impl From<Blob> for MergeOutput {
    fn from(blob: Blob) -> Self {
        Self::Single(blob)
    }
}

impl From<String> for MergeOutput {
    fn from(text: String) -> Self {
        Self::Single(Blob::Text(text))
    }
}

impl From<Vec<OutputFile>> for MergeOutput {
    fn from(files: Vec<OutputFile>) -> Self {
        Self::Multiple(files)
    }
}
