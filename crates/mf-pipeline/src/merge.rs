//! Invoking the aggregation callback and enforcing its result shape.

use mf_types::{File, MergeOutput, OutputFile};
use tracing::debug;

use crate::callback::Merge;
use crate::error::{BuildError, BuildResult, ShapeMismatchError};

/// The merge result shape a configuration accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputShape {
    /// Exactly one file, written under this relative name.
    Single(String),
    /// Any number of caller-named files.
    Multiple,
}

impl OutputShape {
    /// Check `output` against this shape.
    pub fn check(&self, output: &MergeOutput) -> Result<(), ShapeMismatchError> {
        match (self, output) {
            (Self::Single(_), MergeOutput::Single(_)) | (Self::Multiple, MergeOutput::Multiple(_)) => {
                Ok(())
            }
            (Self::Single(name), MergeOutput::Multiple(_)) => Err(ShapeMismatchError::ExpectedSingle {
                output_file_name: name.clone(),
            }),
            (Self::Multiple, MergeOutput::Single(_)) => Err(ShapeMismatchError::ExpectedMultiple),
        }
    }

    /// Check `output` and flatten it into the list of files to write.
    pub fn resolve(&self, output: MergeOutput) -> Result<Vec<OutputFile>, ShapeMismatchError> {
        self.check(&output)?;
        Ok(match (self, output) {
            (Self::Single(name), MergeOutput::Single(blob)) => vec![OutputFile::new(name.clone(), blob)],
            (_, MergeOutput::Multiple(files)) => files,
            // `check` rejected every other combination.
            (Self::Multiple, MergeOutput::Single(_)) => {
                return Err(ShapeMismatchError::ExpectedMultiple);
            }
        })
    }
}

/// Run the merge callback over the deduplicated files and resolve its output.
pub async fn invoke(
    merge: &dyn Merge,
    shape: &OutputShape,
    files: Vec<File>,
) -> BuildResult<Vec<OutputFile>> {
    let count = files.len();
    let output = merge.merge(files).await.map_err(BuildError::Merge)?;
    debug!(files = count, shape = output.shape_name(), "merge callback returned");
    Ok(shape.resolve(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::merge_fn;
    use mf_types::Blob;

    #[test]
    fn single_shape_names_the_file() {
        let shape = OutputShape::Single("out/merged.txt".into());
        let files = shape.resolve(MergeOutput::from("all".to_string())).unwrap();
        assert_eq!(files, vec![OutputFile::new("out/merged.txt", "all")]);
    }

    #[test]
    fn multiple_shape_passes_files_through() {
        let out = vec![OutputFile::new("a", "1"), OutputFile::new("b", vec![2u8])];
        let files = OutputShape::Multiple
            .resolve(MergeOutput::Multiple(out.clone()))
            .unwrap();
        assert_eq!(files, out);
    }

    #[test]
    fn mismatches_are_reported_both_ways() {
        let err = OutputShape::Single("x".into())
            .resolve(MergeOutput::Multiple(Vec::new()))
            .unwrap_err();
        assert_eq!(
            err,
            ShapeMismatchError::ExpectedSingle {
                output_file_name: "x".into()
            }
        );

        let err = OutputShape::Multiple
            .resolve(MergeOutput::Single(Blob::from("x")))
            .unwrap_err();
        assert_eq!(err, ShapeMismatchError::ExpectedMultiple);
    }

    #[tokio::test]
    async fn callback_failure_becomes_merge_error() {
        let failing = merge_fn(|_| Err("no thanks".into()));
        let err = invoke(&failing, &OutputShape::Multiple, Vec::new()).await.unwrap_err();
        assert!(matches!(err, BuildError::Merge(ref source) if source.to_string() == "no thanks"));
    }

    #[tokio::test]
    async fn wrong_shape_is_a_shape_error() {
        let single = merge_fn(|_| Ok(MergeOutput::from("text".to_string())));
        let err = invoke(&single, &OutputShape::Multiple, Vec::new()).await.unwrap_err();
        assert!(matches!(err, BuildError::ShapeMismatch(ShapeMismatchError::ExpectedMultiple)));
    }
}
