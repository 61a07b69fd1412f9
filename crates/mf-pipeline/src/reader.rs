//! Reads one matched file and applies the optional transform.

use std::sync::Arc;

use mf_types::{Encoding, Entry, InputRoot};
use tracing::warn;

use crate::callback::TransformFile;
use crate::error::{BuildError, BuildResult};

/// Reads file contents for a relative path under a root.
///
/// Cheap to clone; the collector hands one copy to every read task.
#[derive(Clone)]
pub struct FileReader {
    encoding: Encoding,
    transform: Option<Arc<dyn TransformFile>>,
}

impl FileReader {
    pub fn new(encoding: Encoding, transform: Option<Arc<dyn TransformFile>>) -> Self {
        Self {
            encoding,
            transform,
        }
    }

    /// Read, decode, and transform `path` under `root`.
    pub async fn read(&self, root: &InputRoot, path: String) -> BuildResult<Entry> {
        let absolute = root.path.join(&path);
        let raw = tokio::fs::read(&absolute)
            .await
            .map_err(|source| BuildError::io(&absolute, source))?;

        let (content, lossy) = self.encoding.decode(raw);
        if lossy {
            warn!(
                path = %absolute.display(),
                encoding = %self.encoding,
                "file is not valid text in the configured encoding, invalid sequences replaced"
            );
        }

        let content = match &self.transform {
            Some(transform) => transform
                .transform(&path, content)
                .await
                .map_err(|source| BuildError::Transform {
                    path: path.clone(),
                    root: root.index,
                    source,
                })?,
            None => content,
        };

        Ok(Entry {
            root: root.index,
            path,
            content,
        })
    }
}
