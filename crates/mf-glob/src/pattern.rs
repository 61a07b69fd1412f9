//! Compiled include/exclude glob sets.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{MatchError, MatchResult};
use crate::options::GlobOptions;

/// Every file below the root, recursively.
pub const DEFAULT_PATTERN: &str = "**/*";

/// A compiled set of glob patterns.
///
/// Patterns starting with `!` exclude; everything else includes. `*` and `?`
/// never cross a `/`, `**` spans any number of segments. A path matches when
/// it matches at least one include and no exclude.
#[derive(Clone, Debug)]
pub struct PatternSet {
    patterns: Vec<String>,
    include: GlobSet,
    exclude: GlobSet,
    /// Includes that spell out a `.`-prefixed segment literally.
    hidden: GlobSet,
    hidden_count: usize,
}

impl PatternSet {
    /// Compile patterns using the default options.
    pub fn new<I, S>(patterns: I) -> MatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::compile(patterns, &GlobOptions::default())
    }

    /// Compile patterns, honouring `case_sensitive` and adding `ignore`
    /// globs as exclusions.
    pub fn compile<I, S>(patterns: I, options: &GlobOptions) -> MatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();

        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut hidden = GlobSetBuilder::new();
        let mut includes = 0usize;
        let mut hidden_count = 0usize;

        for raw in &patterns {
            let pattern = raw.trim();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_prefix('!') {
                Some(negated) => {
                    exclude.add(build_glob(negated, options)?);
                }
                None => {
                    let glob = build_glob(pattern, options)?;
                    if names_hidden_segment(pattern) {
                        hidden.add(glob.clone());
                        hidden_count += 1;
                    }
                    include.add(glob);
                    includes += 1;
                }
            }
        }
        for pattern in &options.ignore {
            exclude.add(build_glob(pattern.trim(), options)?);
        }

        if includes == 0 {
            return Err(MatchError::EmptyPatternSet);
        }

        Ok(Self {
            patterns,
            include: finish(include)?,
            exclude: finish(exclude)?,
            hidden: finish(hidden)?,
            hidden_count,
        })
    }

    /// The patterns as given.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Test a `/`-separated path relative to the root.
    pub fn is_match(&self, relative: &str) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }

    /// Returns `true` if some include pattern spells out a `.`-prefixed segment.
    pub fn has_hidden_patterns(&self) -> bool {
        self.hidden_count > 0
    }

    /// Returns `true` if `relative` matches an include pattern that names its
    /// hidden segments literally, e.g. `.env` or `.config/*.toml`.
    pub fn names_hidden(&self, relative: &str) -> bool {
        self.hidden_count > 0 && self.hidden.is_match(relative)
    }

    /// Returns `true` if a directory is excluded outright, so the walk can
    /// skip its whole subtree.
    pub fn prunes(&self, relative_dir: &str) -> bool {
        self.exclude.is_match(relative_dir) || self.exclude.is_match(format!("{relative_dir}/"))
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        let mut include = GlobSetBuilder::new();
        if let Ok(glob) = GlobBuilder::new(DEFAULT_PATTERN).literal_separator(true).build() {
            include.add(glob);
        }
        Self {
            patterns: vec![DEFAULT_PATTERN.to_string()],
            include: include.build().unwrap_or_else(|_| GlobSet::empty()),
            exclude: GlobSet::empty(),
            hidden: GlobSet::empty(),
            hidden_count: 0,
        }
    }
}

fn names_hidden_segment(pattern: &str) -> bool {
    pattern
        .split('/')
        .any(|segment| segment.starts_with('.') && segment != "." && segment != "..")
}

fn build_glob(pattern: &str, options: &GlobOptions) -> MatchResult<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|err| MatchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.kind().to_string(),
        })
}

fn finish(builder: GlobSetBuilder) -> MatchResult<GlobSet> {
    builder.build().map_err(|err| MatchError::InvalidPattern {
        pattern: err.glob().unwrap_or_default().to_string(),
        reason: err.kind().to_string(),
    })
}
