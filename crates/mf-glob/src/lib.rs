//! Glob-based path matching for mergefiles.
//!
//! Given a root directory and a compiled pattern set, a [`PathMatcher`]
//! produces a lazy [`PathStream`] of relative file paths under that root.
//! The stream signals exhaustion by returning `None`, which lets consumers
//! schedule reads while the walk is still in progress.
//!
//! # Key Types
//!
//! - [`PatternSet`] -- Compiled include/exclude globs (`!`-prefixed patterns exclude)
//! - [`GlobOptions`] -- Walk and match options, with [`GlobOptions::with_entry_shape`]
//!   enforcing the shape the merge pipeline depends on
//! - [`PathMatcher`] -- The matcher seam
//! - [`GlobMatcher`] -- Default matcher: `walkdir` on a blocking task + `globset`
//! - [`PathStream`] -- Channel-backed lazy path sequence

pub mod error;
pub mod matcher;
pub mod options;
pub mod pattern;
pub mod stream;

pub use error::{MatchError, MatchResult};
pub use matcher::{GlobMatcher, PathMatcher};
pub use options::{GlobOptions, PathTransform};
pub use pattern::{PatternSet, DEFAULT_PATTERN};
pub use stream::{PathSink, PathStream};
