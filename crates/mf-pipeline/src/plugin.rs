//! The build entry point: one merge instance over a fixed set of roots.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use mf_types::InputRoot;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::collector::collect;
use crate::config::BuildConfiguration;
use crate::dedup::deduplicate;
use crate::error::{BuildResult, ConfigError};
use crate::merge::invoke;
use crate::sequencer::sequence;
use crate::writer::Writer;

// ---------------------------------------------------------------------------
// BuildReport
// ---------------------------------------------------------------------------

/// Summary of one successful build.
#[derive(Clone, Debug, Serialize)]
pub struct BuildReport {
    /// Entries collected across all roots, before deduplication.
    pub entries: usize,
    /// Files handed to the merge callback.
    pub files: usize,
    /// Written files (output directory joined with each relative path), sorted.
    pub written: Vec<PathBuf>,
    /// BLAKE3 digest over every written (path, bytes) pair in path order.
    #[serde(serialize_with = "digest_as_hex")]
    pub digest: [u8; 32],
    /// Wall-clock time of the whole build.
    pub elapsed: Duration,
}

impl BuildReport {
    /// The digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        blake3::Hash::from(self.digest).to_hex().to_string()
    }
}

fn digest_as_hex<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(blake3::Hash::from(*digest).to_hex().as_str())
}

// ---------------------------------------------------------------------------
// MergeFiles
// ---------------------------------------------------------------------------

/// A configured merge over ordered input roots into one output directory.
///
/// `build` may be called any number of times; each call re-reads the inputs
/// and replaces the output directory's contents.
#[derive(Clone, Debug)]
pub struct MergeFiles {
    roots: Vec<InputRoot>,
    output: PathBuf,
    config: BuildConfiguration,
}

impl MergeFiles {
    /// Create an instance. Fails on invalid configuration, no inputs, or an
    /// output directory that overlaps an input root.
    pub fn new(
        inputs: Vec<PathBuf>,
        output: impl Into<PathBuf>,
        config: BuildConfiguration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        let output = output.into();
        let normalized_output = normalize(&output);
        for input in &inputs {
            let normalized_input = normalize(input);
            if normalized_output.starts_with(&normalized_input)
                || normalized_input.starts_with(&normalized_output)
            {
                return Err(ConfigError::OutputOverlapsInput {
                    output,
                    input: input.clone(),
                });
            }
        }

        Ok(Self {
            roots: InputRoot::enumerate(&inputs),
            output,
            config,
        })
    }

    pub fn roots(&self) -> &[InputRoot] {
        &self.roots
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn config(&self) -> &BuildConfiguration {
        &self.config
    }

    /// Run collect, sequence, deduplicate, merge, and write.
    ///
    /// Any failure aborts the build. Failures before the write phase leave
    /// the output directory untouched.
    pub async fn build(&self) -> BuildResult<BuildReport> {
        let started = Instant::now();
        let config = &self.config;
        let name = config.annotation().unwrap_or("mergefiles");
        config.validate()?;

        let entries = collect(&self.roots, config).await?;
        let entry_count = entries.len();
        debug!(instance = name, entries = entry_count, roots = self.roots.len(), "collection complete");

        let entries = sequence(entries, config.sort());
        let files = deduplicate(entries, config.duplicates())?;
        let file_count = files.len();
        debug!(instance = name, files = file_count, strategy = %config.duplicates(), "deduplication complete");

        let outputs = invoke(config.merge(), &config.output_shape(), files).await?;
        let write = Writer::new(&self.output, config.encoding()).write(outputs).await?;

        let report = BuildReport {
            entries: entry_count,
            files: file_count,
            written: write.written,
            digest: write.digest,
            elapsed: started.elapsed(),
        };
        info!(
            instance = name,
            entries = report.entries,
            files = report.files,
            written = report.written.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }
}

/// Absolute, lexically normalized form of `path`. Symlinks are not resolved.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::merge_fn;
    use mf_types::MergeOutput;

    fn config() -> BuildConfiguration {
        BuildConfiguration::builder()
            .merge(merge_fn(|_| Ok(MergeOutput::Multiple(Vec::new()))))
            .build()
            .unwrap()
    }

    #[test]
    fn requires_an_input() {
        let err = MergeFiles::new(Vec::new(), "/tmp/out", config()).unwrap_err();
        assert!(matches!(err, ConfigError::NoInputs));
    }

    #[test]
    fn rejects_overlapping_output() {
        for (input, output) in [
            ("/data/src", "/data/src"),
            ("/data/src", "/data/src/out"),
            ("/data/src/sub", "/data/src"),
            ("/data/src", "/data/other/../src/./out"),
        ] {
            let err = MergeFiles::new(vec![input.into()], output, config()).unwrap_err();
            assert!(
                matches!(err, ConfigError::OutputOverlapsInput { .. }),
                "{output} should overlap {input}"
            );
        }
    }

    #[test]
    fn sibling_output_is_fine() {
        let merge = MergeFiles::new(
            vec!["/data/src".into(), "/data/src2".into()],
            "/data/out",
            config(),
        )
        .unwrap();
        assert_eq!(merge.roots().len(), 2);
        assert_eq!(merge.roots()[1].index.get(), 1);
        // Prefix of the name is not containment.
        MergeFiles::new(vec!["/data/src".into()], "/data/src-out", config()).unwrap();
    }

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
    }

    #[test]
    fn report_serializes_digest_as_hex() {
        let report = BuildReport {
            entries: 1,
            files: 1,
            written: vec![PathBuf::from("/out/a")],
            digest: [0xab; 32],
            elapsed: Duration::from_millis(5),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["digest"], serde_json::Value::String("ab".repeat(32)));
        assert_eq!(report.digest_hex(), "ab".repeat(32));
    }
}
