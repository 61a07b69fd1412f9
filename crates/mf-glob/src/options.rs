//! Options controlling how a root is walked and which paths are emitted.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Rewrites each emitted path before it leaves the matcher.
pub type PathTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Walk and match options.
///
/// The first group tunes which files are found; the second group decides the
/// shape of what is emitted. Callers of the merge pipeline may set anything,
/// but the pipeline always applies [`GlobOptions::with_entry_shape`] first.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct GlobOptions {
    /// Match paths with a segment starting with `.`. When off, hidden paths are
    /// still matched by patterns that spell the hidden segment out, like `.env`.
    pub dot: bool,
    /// Compare patterns case-sensitively.
    pub case_sensitive: bool,
    /// Descend into symlinked directories and report symlinked files.
    pub follow_symlinks: bool,
    /// Maximum number of path segments below the root (1 = root-level files only).
    pub max_depth: Option<usize>,
    /// Additional exclusion globs.
    pub ignore: Vec<String>,

    /// Emit absolute paths instead of root-relative ones.
    pub absolute: bool,
    /// Emit every path at most once.
    pub unique: bool,
    /// Emit files only.
    pub only_files: bool,
    /// Emit directories only.
    pub only_directories: bool,
    /// Rewrite emitted paths.
    #[serde(skip)]
    pub path_transform: Option<PathTransform>,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            dot: false,
            case_sensitive: true,
            follow_symlinks: true,
            max_depth: None,
            ignore: Vec::new(),
            absolute: false,
            unique: true,
            only_files: true,
            only_directories: false,
            path_transform: None,
        }
    }
}

impl GlobOptions {
    /// Force the emitted-path shape every pipeline entry relies on:
    /// root-relative, unique, files only, untransformed.
    pub fn with_entry_shape(&self) -> Self {
        Self {
            absolute: false,
            unique: true,
            only_files: true,
            only_directories: false,
            path_transform: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for GlobOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobOptions")
            .field("dot", &self.dot)
            .field("case_sensitive", &self.case_sensitive)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("max_depth", &self.max_depth)
            .field("ignore", &self.ignore)
            .field("absolute", &self.absolute)
            .field("unique", &self.unique)
            .field("only_files", &self.only_files)
            .field("only_directories", &self.only_directories)
            .field("path_transform", &self.path_transform.is_some())
            .finish()
    }
}
