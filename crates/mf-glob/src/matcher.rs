//! The matcher seam and its default walkdir-backed implementation.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::error::MatchError;
use crate::options::GlobOptions;
use crate::pattern::PatternSet;
use crate::stream::{PathSink, PathStream, STREAM_CAPACITY};

/// Produces the lazy sequence of paths matching a pattern set under a root.
///
/// Implementations must be `Send + Sync` so a single matcher can serve every
/// root of a build concurrently.
pub trait PathMatcher: Send + Sync {
    /// Start scanning `root`. Errors are delivered through the stream.
    fn scan(&self, root: &Path, patterns: Arc<PatternSet>, options: &GlobOptions) -> PathStream;
}

/// Default matcher: walks the root with `walkdir` on a blocking task and
/// streams every path accepted by the pattern set.
///
/// Must be used from within a tokio runtime. Directory entries are visited in
/// file-name order, but consumers should not rely on emission order.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobMatcher;

impl GlobMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl PathMatcher for GlobMatcher {
    fn scan(&self, root: &Path, patterns: Arc<PatternSet>, options: &GlobOptions) -> PathStream {
        let (sink, stream) = PathStream::channel(STREAM_CAPACITY);
        let root = root.to_path_buf();
        let options = options.clone();
        tokio::task::spawn_blocking(move || walk(&root, &patterns, &options, &sink));
        stream
    }
}

fn walk(root: &Path, patterns: &PatternSet, options: &GlobOptions, sink: &PathSink) {
    if !root.is_dir() {
        sink.send_blocking(Err(MatchError::MissingRoot(root.to_path_buf())));
        return;
    }

    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(options.follow_symlinks)
        .sort_by_file_name();
    if let Some(depth) = options.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut seen = HashSet::new();
    let mut emitted = 0usize;

    let entries = walker
        .into_iter()
        .filter_entry(|entry| keep_descending(entry, root, patterns, options));

    for entry in entries {
        if sink.is_closed() {
            trace!(root = %root.display(), "path stream consumer gone, stopping walk");
            return;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                sink.send_blocking(Err(MatchError::Walk {
                    root: root.to_path_buf(),
                    source,
                }));
                return;
            }
        };

        // With symlinks unfollowed, a link is neither a file nor a directory.
        let file_type = entry.file_type();
        if (options.only_files && !file_type.is_file())
            || (options.only_directories && !file_type.is_dir())
        {
            continue;
        }

        let relative = match relative_path(root, entry.path()) {
            Ok(relative) => relative,
            Err(err) => {
                sink.send_blocking(Err(err));
                return;
            }
        };
        if !options.dot && is_hidden(&relative) && !patterns.names_hidden(&relative) {
            continue;
        }
        if !patterns.is_match(&relative) {
            continue;
        }

        let mut emit = if options.absolute {
            root.join(&relative).to_string_lossy().into_owned()
        } else {
            relative
        };
        if let Some(transform) = &options.path_transform {
            emit = transform(&emit);
        }
        if options.unique && !seen.insert(emit.clone()) {
            continue;
        }

        if !sink.send_blocking(Ok(emit)) {
            return;
        }
        emitted += 1;
    }

    debug!(root = %root.display(), emitted, "path scan exhausted");
}

/// Directory pruning: hidden directories when `dot` is off, and directories
/// an exclusion pattern removes wholesale.
fn keep_descending(entry: &DirEntry, root: &Path, patterns: &PatternSet, options: &GlobOptions) -> bool {
    if !entry.file_type().is_dir() {
        return true;
    }
    let Ok(relative) = relative_path(root, entry.path()) else {
        // Let the main loop report it.
        return true;
    };
    if !options.dot && is_hidden(&relative) && !patterns.has_hidden_patterns() {
        return false;
    }
    !patterns.prunes(&relative)
}

/// Root-relative path with `/` separators regardless of platform.
fn relative_path(root: &Path, path: &Path) -> Result<String, MatchError> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut segments = Vec::new();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            let segment = segment
                .to_str()
                .ok_or_else(|| MatchError::NonUtf8Path(PathBuf::from(path)))?;
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}

fn is_hidden(relative: &str) -> bool {
    relative.split('/').any(|segment| segment.starts_with('.'))
}
