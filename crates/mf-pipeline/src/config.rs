//! Build configuration: the serializable options plus the callbacks.
//!
//! A [`BuildConfiguration`] is constructed once and reused for every build.
//! It holds no build-scoped state, so successive or concurrent builds can
//! share it freely.

use std::fmt;
use std::sync::Arc;

use mf_glob::{GlobMatcher, GlobOptions, PathMatcher, PatternSet, DEFAULT_PATTERN};
use mf_types::{DuplicateStrategy, Encoding, Entry};
use serde::{Deserialize, Deserializer, Serialize};

use crate::callback::{Comparator, Merge, TransformFile};
use crate::error::ConfigError;
use crate::merge::OutputShape;
use crate::writer::check_relative_path;

// ---------------------------------------------------------------------------
// MergeOptions
// ---------------------------------------------------------------------------

/// The data half of a build configuration, loadable from a config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MergeOptions {
    /// Descriptive label, used to tell instances apart in logs.
    pub annotation: Option<String>,
    /// Glob patterns of files to include. A single string is accepted.
    #[serde(deserialize_with = "one_or_many")]
    pub patterns: Vec<String>,
    /// Options passed through to the path matcher.
    pub glob: GlobOptions,
    /// Policy for relative paths present in more than one root.
    pub duplicates: DuplicateStrategy,
    /// Encoding for both reading and writing.
    pub encoding: Encoding,
    /// Sort entries by root index then path before deduplication.
    pub sort: bool,
    /// Name of the single output file, if merge produces one.
    pub output_file_name: Option<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            annotation: None,
            patterns: vec![DEFAULT_PATTERN.to_string()],
            glob: GlobOptions::default(),
            duplicates: DuplicateStrategy::default(),
            encoding: Encoding::default(),
            sort: true,
            output_file_name: None,
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

// ---------------------------------------------------------------------------
// SortOrder
// ---------------------------------------------------------------------------

/// How collected entries are ordered before deduplication.
#[derive(Clone, Default)]
pub enum SortOrder {
    /// Root index ascending, then relative path by code point.
    #[default]
    Default,
    /// Completion order, which is not deterministic.
    Unsorted,
    /// Caller-supplied total order, applied as a stable sort.
    Custom(Comparator),
}

impl SortOrder {
    /// Build a custom order from a comparator closure.
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn(&Entry, &Entry) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(compare))
    }

    /// Returns `true` if the order is deterministic.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Self::Unsorted)
    }
}

impl From<bool> for SortOrder {
    fn from(sort: bool) -> Self {
        if sort {
            Self::Default
        } else {
            Self::Unsorted
        }
    }
}

impl fmt::Debug for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Unsorted => f.write_str("Unsorted"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// BuildConfiguration
// ---------------------------------------------------------------------------

/// Immutable configuration for a merge instance.
///
/// Cloning is cheap: patterns and callbacks are shared behind `Arc`s.
#[derive(Clone)]
pub struct BuildConfiguration {
    annotation: Option<String>,
    patterns: Arc<PatternSet>,
    glob: GlobOptions,
    duplicates: DuplicateStrategy,
    encoding: Encoding,
    sort: SortOrder,
    output_file_name: Option<String>,
    transform: Option<Arc<dyn TransformFile>>,
    merge: Arc<dyn Merge>,
    matcher: Arc<dyn PathMatcher>,
}

impl BuildConfiguration {
    /// Start building a configuration from defaults.
    pub fn builder() -> BuildConfigurationBuilder {
        BuildConfigurationBuilder::default()
    }

    /// Configuration from loaded options plus a merge callback.
    pub fn from_options(
        options: MergeOptions,
        merge: impl Merge + 'static,
    ) -> Result<Self, ConfigError> {
        Self::builder().options(options).merge(merge).build()
    }

    /// Re-check the static invariants. Runs before every build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_static(&self.sort, self.duplicates, self.output_file_name.as_deref())
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }

    /// Matcher options as supplied by the caller, before the entry shape is forced.
    pub fn glob_options(&self) -> &GlobOptions {
        &self.glob
    }

    pub fn duplicates(&self) -> DuplicateStrategy {
        self.duplicates
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn sort(&self) -> &SortOrder {
        &self.sort
    }

    pub fn output_file_name(&self) -> Option<&str> {
        self.output_file_name.as_deref()
    }

    /// Which merge result shape this configuration accepts.
    pub fn output_shape(&self) -> OutputShape {
        match &self.output_file_name {
            Some(name) => OutputShape::Single(name.clone()),
            None => OutputShape::Multiple,
        }
    }

    pub fn transform(&self) -> Option<&Arc<dyn TransformFile>> {
        self.transform.as_ref()
    }

    pub fn merge(&self) -> &dyn Merge {
        self.merge.as_ref()
    }

    pub fn matcher(&self) -> &dyn PathMatcher {
        self.matcher.as_ref()
    }
}

impl fmt::Debug for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildConfiguration")
            .field("annotation", &self.annotation)
            .field("patterns", &self.patterns.patterns())
            .field("glob", &self.glob)
            .field("duplicates", &self.duplicates)
            .field("encoding", &self.encoding)
            .field("sort", &self.sort)
            .field("output_file_name", &self.output_file_name)
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

fn validate_static(
    sort: &SortOrder,
    duplicates: DuplicateStrategy,
    output_file_name: Option<&str>,
) -> Result<(), ConfigError> {
    if !sort.is_deterministic() && duplicates.is_order_sensitive() {
        return Err(ConfigError::UnsortedOrderSensitive(duplicates));
    }
    if let Some(name) = output_file_name {
        check_relative_path(name).map_err(|reason| ConfigError::InvalidOutputFileName {
            name: name.to_string(),
            reason,
        })?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder for [`BuildConfiguration`]. Validation happens in [`Self::build`].
#[derive(Default)]
pub struct BuildConfigurationBuilder {
    options: MergeOptions,
    sort: Option<SortOrder>,
    transform: Option<Arc<dyn TransformFile>>,
    merge: Option<Arc<dyn Merge>>,
    matcher: Option<Arc<dyn PathMatcher>>,
}

impl BuildConfigurationBuilder {
    /// Replace every data option at once (e.g. from a config file).
    pub fn options(mut self, options: MergeOptions) -> Self {
        self.sort = Some(options.sort.into());
        self.options = options;
        self
    }

    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.options.annotation = Some(annotation.into());
        self
    }

    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn glob_options(mut self, glob: GlobOptions) -> Self {
        self.options.glob = glob;
        self
    }

    pub fn duplicates(mut self, duplicates: DuplicateStrategy) -> Self {
        self.options.duplicates = duplicates;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.options.encoding = encoding;
        self
    }

    pub fn sort(mut self, sort: impl Into<SortOrder>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Sort with a custom comparator.
    pub fn sort_by<F>(self, compare: F) -> Self
    where
        F: Fn(&Entry, &Entry) -> std::cmp::Ordering + Send + Sync + 'static,
    {
        self.sort(SortOrder::by(compare))
    }

    pub fn output_file_name(mut self, name: impl Into<String>) -> Self {
        self.options.output_file_name = Some(name.into());
        self
    }

    pub fn transform(mut self, transform: impl TransformFile + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn merge(mut self, merge: impl Merge + 'static) -> Self {
        self.merge = Some(Arc::new(merge));
        self
    }

    pub fn shared_merge(mut self, merge: Arc<dyn Merge>) -> Self {
        self.merge = Some(merge);
        self
    }

    /// Replace the default [`GlobMatcher`].
    pub fn matcher(mut self, matcher: impl PathMatcher + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<BuildConfiguration, ConfigError> {
        let MergeOptions {
            annotation,
            patterns,
            glob,
            duplicates,
            encoding,
            sort,
            output_file_name,
        } = self.options;
        let sort = self.sort.unwrap_or_else(|| sort.into());

        validate_static(&sort, duplicates, output_file_name.as_deref())?;
        let merge = self.merge.ok_or(ConfigError::MissingMerge)?;
        let patterns = Arc::new(PatternSet::compile(patterns, &glob)?);

        Ok(BuildConfiguration {
            annotation,
            patterns,
            glob,
            duplicates,
            encoding,
            sort,
            output_file_name,
            transform: self.transform,
            merge,
            matcher: self.matcher.unwrap_or_else(|| Arc::new(GlobMatcher::new())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::merge_fn;
    use mf_types::MergeOutput;

    fn noop_merge() -> impl Merge {
        merge_fn(|_| Ok(MergeOutput::Multiple(Vec::new())))
    }

    #[test]
    fn defaults_mirror_documented_values() {
        let config = BuildConfiguration::builder().merge(noop_merge()).build().unwrap();
        assert_eq!(config.patterns().patterns(), &["**/*".to_string()]);
        assert_eq!(config.duplicates(), DuplicateStrategy::Prohibit);
        assert_eq!(config.encoding(), Encoding::Utf8);
        assert!(matches!(config.sort(), SortOrder::Default));
        assert_eq!(config.output_shape(), OutputShape::Multiple);
        assert!(config.transform().is_none());
    }

    #[test]
    fn unsorted_rejects_keep_first_and_keep_last() {
        for strategy in [DuplicateStrategy::KeepFirst, DuplicateStrategy::KeepLast] {
            let err = BuildConfiguration::builder()
                .sort(false)
                .duplicates(strategy)
                .merge(noop_merge())
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigError::UnsortedOrderSensitive(s) if s == strategy));
        }
    }

    #[test]
    fn unsorted_allows_prohibit_and_keep_all() {
        for strategy in [DuplicateStrategy::Prohibit, DuplicateStrategy::KeepAll] {
            BuildConfiguration::builder()
                .sort(false)
                .duplicates(strategy)
                .merge(noop_merge())
                .build()
                .unwrap();
        }
    }

    #[test]
    fn custom_order_counts_as_deterministic() {
        let config = BuildConfiguration::builder()
            .sort_by(|a, b| b.path.cmp(&a.path))
            .duplicates(DuplicateStrategy::KeepFirst)
            .merge(noop_merge())
            .build()
            .unwrap();
        assert!(matches!(config.sort(), SortOrder::Custom(_)));
    }

    #[test]
    fn merge_is_required() {
        let err = BuildConfiguration::builder().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingMerge));
    }

    #[test]
    fn output_file_name_must_stay_inside_output() {
        for bad in ["", "/etc/passwd", "../escape.txt", "a//b", "dir/"] {
            let err = BuildConfiguration::builder()
                .output_file_name(bad)
                .merge(noop_merge())
                .build()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidOutputFileName { .. }),
                "{bad:?} should be rejected"
            );
        }

        let config = BuildConfiguration::builder()
            .output_file_name("nested/merged.json")
            .merge(noop_merge())
            .build()
            .unwrap();
        assert_eq!(config.output_shape(), OutputShape::Single("nested/merged.json".into()));
    }

    #[test]
    fn invalid_globs_are_config_errors() {
        let err = BuildConfiguration::builder()
            .patterns(["[oops"])
            .merge(noop_merge())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Patterns(_)));
    }

    #[test]
    fn options_load_from_toml() {
        let options: MergeOptions = toml::from_str(
            r#"
            patterns = "**/*.txt"
            duplicates = "keep-last"
            encoding = "latin1"
            output-file-name = "merged.txt"

            [glob]
            dot = true
            "#,
        )
        .unwrap();
        assert_eq!(options.patterns, vec!["**/*.txt".to_string()]);
        assert_eq!(options.duplicates, DuplicateStrategy::KeepLast);
        assert_eq!(options.encoding, Encoding::Latin1);
        assert!(options.sort);
        assert!(options.glob.dot);

        let config = BuildConfiguration::from_options(options, noop_merge()).unwrap();
        assert_eq!(config.output_file_name(), Some("merged.txt"));
    }

    #[test]
    fn options_sort_false_is_validated() {
        let options: MergeOptions =
            toml::from_str("sort = false\nduplicates = \"keep-first\"").unwrap();
        let err = BuildConfiguration::from_options(options, noop_merge()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsortedOrderSensitive(_)));
    }
}
