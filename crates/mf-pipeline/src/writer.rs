//! Writing merge results into the output directory.
//!
//! Every output path is validated and encoded before the directory is
//! touched, so a rejected result leaves the previous output in place. Once
//! writing starts the output directory is reset: files from earlier builds
//! never survive into the new output.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use mf_types::{Encoding, OutputFile};
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{BuildError, BuildResult};

/// Check that `path` is a non-empty relative path that stays inside the
/// output directory. Segments are `/`-separated.
pub fn check_relative_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path is empty".into());
    }
    if path.starts_with('/') || path.starts_with('\\') || Path::new(path).is_absolute() {
        return Err("path must be relative".into());
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err("path contains an empty segment".into()),
            "." => return Err("path contains a '.' segment".into()),
            ".." => return Err("path must not leave the output directory".into()),
            _ => {}
        }
    }
    Ok(())
}

/// What a completed write produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteReport {
    /// Every written file, as the output directory joined with its relative path, sorted.
    pub written: Vec<PathBuf>,
    /// BLAKE3 digest over the sorted (path, bytes) pairs.
    pub digest: [u8; 32],
}

/// Writes output files under one directory with one encoding.
#[derive(Clone, Debug)]
pub struct Writer {
    dir: PathBuf,
    encoding: Encoding,
}

impl Writer {
    pub fn new(dir: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            dir: dir.into(),
            encoding,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and encode `files`, sorted by path.
    pub fn plan(&self, files: Vec<OutputFile>) -> BuildResult<Vec<(String, Bytes)>> {
        let mut seen = HashSet::with_capacity(files.len());
        let mut planned = Vec::with_capacity(files.len());
        for file in files {
            check_relative_path(&file.path).map_err(|reason| BuildError::InvalidOutputPath {
                path: file.path.clone(),
                reason,
            })?;
            if !seen.insert(file.path.clone()) {
                return Err(BuildError::InvalidOutputPath {
                    path: file.path,
                    reason: "path is returned more than once".into(),
                });
            }
            let bytes = self.encoding.encode(&file.blob);
            planned.push((file.path, bytes));
        }
        planned.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(planned)
    }

    /// Replace the output directory's contents with `files`.
    pub async fn write(&self, files: Vec<OutputFile>) -> BuildResult<WriteReport> {
        let planned = self.plan(files)?;
        let digest = digest(&planned);

        self.reset().await?;

        let mut writes = JoinSet::new();
        for (relative, bytes) in planned {
            let target = self.dir.join(&relative);
            writes.spawn(async move {
                if let Some(parent) = target.parent() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|source| BuildError::io(parent, source))?;
                }
                tokio::fs::write(&target, &bytes)
                    .await
                    .map_err(|source| BuildError::io(&target, source))?;
                Ok::<_, BuildError>(target)
            });
        }

        let mut written = Vec::new();
        while let Some(done) = writes.join_next().await {
            written.push(done??);
        }
        written.sort();

        debug!(dir = %self.dir.display(), files = written.len(), "output written");
        Ok(WriteReport { written, digest })
    }

    async fn reset(&self) -> BuildResult<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => debug!(dir = %self.dir.display(), "cleared previous output"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(BuildError::io(&self.dir, err)),
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| BuildError::io(&self.dir, source))
    }
}

/// Digest of a sorted write plan. Independent of write order and timing.
fn digest(planned: &[(String, Bytes)]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for (path, bytes) in planned {
        hasher.update(&(path.len() as u64).to_le_bytes());
        hasher.update(path.as_bytes());
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_types::Blob;

    #[test]
    fn relative_path_rules() {
        for ok in ["a.txt", "nested/deep/file.json", ".hidden", "a..b"] {
            assert!(check_relative_path(ok).is_ok(), "{ok:?} should pass");
        }
        for bad in ["", "/abs", "\\abs", "a//b", "a/", "./a", "a/../b", ".."] {
            assert!(check_relative_path(bad).is_err(), "{bad:?} should fail");
        }
    }

    #[tokio::test]
    async fn writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let writer = Writer::new(&out, Encoding::Utf8);

        let report = writer
            .write(vec![
                OutputFile::new("top.txt", "top"),
                OutputFile::new("a/b/c.bin", vec![0u8, 255]),
            ])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(out.join("top.txt")).unwrap(), "top");
        assert_eq!(std::fs::read(out.join("a/b/c.bin")).unwrap(), vec![0u8, 255]);
        assert_eq!(report.written, vec![out.join("a/b/c.bin"), out.join("top.txt")]);
    }

    #[tokio::test]
    async fn reset_removes_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path().join("out"), Encoding::Utf8);

        writer.write(vec![OutputFile::new("old.txt", "old")]).await.unwrap();
        writer.write(vec![OutputFile::new("new.txt", "new")]).await.unwrap();

        assert!(!writer.dir().join("old.txt").exists());
        assert!(writer.dir().join("new.txt").exists());
    }

    #[tokio::test]
    async fn invalid_paths_leave_directory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path().join("out"), Encoding::Utf8);
        writer.write(vec![OutputFile::new("keep.txt", "k")]).await.unwrap();

        let err = writer
            .write(vec![OutputFile::new("../escape.txt", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidOutputPath { .. }));
        assert!(writer.dir().join("keep.txt").exists());
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn duplicate_output_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path().join("out"), Encoding::Utf8);
        let err = writer
            .write(vec![OutputFile::new("same", "1"), OutputFile::new("same", "2")])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidOutputPath { ref path, .. } if path == "same"));
    }

    #[tokio::test]
    async fn latin1_writes_one_byte_per_char() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Writer::new(dir.path().join("out"), Encoding::Latin1);
        writer.write(vec![OutputFile::new("l.txt", Blob::from("é"))]).await.unwrap();
        assert_eq!(std::fs::read(writer.dir().join("l.txt")).unwrap(), vec![0xE9]);
    }

    #[test]
    fn digest_ignores_input_order() {
        let writer = Writer::new("unused", Encoding::Utf8);
        let a = writer
            .plan(vec![OutputFile::new("a", "1"), OutputFile::new("b", "2")])
            .unwrap();
        let b = writer
            .plan(vec![OutputFile::new("b", "2"), OutputFile::new("a", "1")])
            .unwrap();
        assert_eq!(digest(&a), digest(&b));

        let c = writer
            .plan(vec![OutputFile::new("a", "2"), OutputFile::new("b", "1")])
            .unwrap();
        assert_ne!(digest(&a), digest(&c));
    }
}
