//! Capability interfaces for the user-supplied callbacks.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use mf_types::{Content, Entry, File, MergeOutput};

use crate::error::CallbackError;

/// Total order over entries, applied as a stable sort.
pub type Comparator = Arc<dyn Fn(&Entry, &Entry) -> Ordering + Send + Sync>;

/// Per-file transform applied right after a file is read.
///
/// Receives the relative path and the decoded contents; whatever it returns
/// replaces the entry's contents. Any error aborts the build.
#[async_trait]
pub trait TransformFile: Send + Sync {
    async fn transform(&self, path: &str, content: Content) -> Result<Content, CallbackError>;
}

/// Aggregation callback: turns the deduplicated file list into output.
///
/// Must return [`MergeOutput::Single`] when an output file name is
/// configured and [`MergeOutput::Multiple`] otherwise.
#[async_trait]
pub trait Merge: Send + Sync {
    async fn merge(&self, files: Vec<File>) -> Result<MergeOutput, CallbackError>;
}

/// Adapter turning a synchronous closure into a [`TransformFile`].
pub struct TransformFn<F>(F);

/// Wrap a synchronous closure as a transform.
pub fn transform_fn<F>(f: F) -> TransformFn<F>
where
    F: Fn(&str, Content) -> Result<Content, CallbackError> + Send + Sync,
{
    TransformFn(f)
}

#[async_trait]
impl<F> TransformFile for TransformFn<F>
where
    F: Fn(&str, Content) -> Result<Content, CallbackError> + Send + Sync,
{
    async fn transform(&self, path: &str, content: Content) -> Result<Content, CallbackError> {
        (self.0)(path, content)
    }
}

/// Adapter turning a synchronous closure into a [`Merge`].
pub struct MergeFn<F>(F);

/// Wrap a synchronous closure as a merge callback.
pub fn merge_fn<F>(f: F) -> MergeFn<F>
where
    F: Fn(Vec<File>) -> Result<MergeOutput, CallbackError> + Send + Sync,
{
    MergeFn(f)
}

#[async_trait]
impl<F> Merge for MergeFn<F>
where
    F: Fn(Vec<File>) -> Result<MergeOutput, CallbackError> + Send + Sync,
{
    async fn merge(&self, files: Vec<File>) -> Result<MergeOutput, CallbackError> {
        (self.0)(files)
    }
}
