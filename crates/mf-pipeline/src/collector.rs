//! Concurrent multi-root collection.
//!
//! Every root is scanned in its own task. Within a root, each matched path
//! spawns an independent read task as soon as the matcher emits it, so reads
//! overlap the directory walk. Completion order is arbitrary; the sequencer
//! restores determinism afterwards.
//!
//! The first error anywhere aborts the collection: returning drops the
//! `JoinSet`s, which cancels every outstanding scan and read.

use std::sync::Arc;

use mf_glob::PathStream;
use mf_types::{Entry, InputRoot};
use tokio::task::JoinSet;
use tracing::debug;

use crate::config::BuildConfiguration;
use crate::error::BuildResult;
use crate::reader::FileReader;

/// Collect every entry reachable through the configured patterns under all roots.
///
/// Only returns once every root's path stream is exhausted and every read
/// spawned for it has resolved.
pub async fn collect(roots: &[InputRoot], config: &BuildConfiguration) -> BuildResult<Vec<Entry>> {
    let options = config.glob_options().with_entry_shape();
    let reader = FileReader::new(config.encoding(), config.transform().cloned());

    let mut scans = JoinSet::new();
    for root in roots {
        let stream = config
            .matcher()
            .scan(&root.path, Arc::clone(config.patterns()), &options);
        scans.spawn(collect_root(Arc::new(root.clone()), stream, reader.clone()));
    }

    let mut entries = Vec::new();
    while let Some(joined) = scans.join_next().await {
        entries.extend(joined??);
    }
    Ok(entries)
}

async fn collect_root(
    root: Arc<InputRoot>,
    mut stream: PathStream,
    reader: FileReader,
) -> BuildResult<Vec<Entry>> {
    let mut reads = JoinSet::new();
    let mut entries = Vec::new();
    let mut matched = 0usize;

    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(path) => {
                    let path = path?;
                    matched += 1;
                    let reader = reader.clone();
                    let root = Arc::clone(&root);
                    reads.spawn(async move { reader.read(&root, path).await });
                }
                None => break,
            },
            // Surface read failures while the walk is still running.
            Some(done) = reads.join_next(), if !reads.is_empty() => {
                entries.push(done??);
            }
        }
    }

    while let Some(done) = reads.join_next().await {
        entries.push(done??);
    }

    debug!(
        root = %root.index,
        path = %root.path.display(),
        matched,
        "root collected"
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mf_glob::{GlobOptions, MatchError, PathMatcher, PatternSet};
    use mf_types::{Content, MergeOutput, RootIndex};

    use crate::callback::{merge_fn, TransformFile};
    use crate::error::{BuildError, CallbackError};

    fn noop_config() -> crate::config::BuildConfigurationBuilder {
        BuildConfiguration::builder().merge(merge_fn(|_| Ok(MergeOutput::Multiple(Vec::new()))))
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn sorted(mut entries: Vec<Entry>) -> Vec<(usize, String)> {
        entries.sort_by(|a, b| (a.root, &a.path).cmp(&(b.root, &b.path)));
        entries.into_iter().map(|e| (e.root.get(), e.path)).collect()
    }

    #[tokio::test]
    async fn collects_from_every_root() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        write(a.path(), "foo.txt", "foo");
        write(a.path(), "bar.txt", "bar");
        write(b.path(), "foo.txt", "qux");
        write(b.path(), "nested/deep.txt", "deep");

        let roots = InputRoot::enumerate(&[a.path().to_path_buf(), b.path().to_path_buf()]);
        let config = noop_config().build().unwrap();
        let entries = collect(&roots, &config).await.unwrap();

        assert_eq!(
            sorted(entries),
            vec![
                (0, "bar.txt".to_string()),
                (0, "foo.txt".to_string()),
                (1, "foo.txt".to_string()),
                (1, "nested/deep.txt".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_roots_produce_no_entries() {
        let a = tempfile::tempdir().unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf()]);
        let config = noop_config().build().unwrap();
        assert!(collect(&roots, &config).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn caller_glob_options_cannot_change_entry_shape() {
        let a = tempfile::tempdir().unwrap();
        write(a.path(), "dir/file.txt", "f");

        let config = noop_config()
            .glob_options(GlobOptions {
                absolute: true,
                only_files: false,
                only_directories: true,
                ..GlobOptions::default()
            })
            .build()
            .unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf()]);
        let entries = collect(&roots, &config).await.unwrap();
        assert_eq!(sorted(entries), vec![(0, "dir/file.txt".to_string())]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unfollowed_directory_symlink_is_not_read() {
        let a = tempfile::tempdir().unwrap();
        write(a.path(), "real/a.txt", "a");
        std::os::unix::fs::symlink(a.path().join("real"), a.path().join("link")).unwrap();

        let config = noop_config()
            .glob_options(GlobOptions {
                follow_symlinks: false,
                ..GlobOptions::default()
            })
            .build()
            .unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf()]);
        let entries = collect(&roots, &config).await.unwrap();
        assert_eq!(sorted(entries), vec![(0, "real/a.txt".to_string())]);
    }

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl TransformFile for Counting {
        async fn transform(&self, _path: &str, content: Content) -> Result<Content, CallbackError> {
            // Yield so transforms genuinely interleave.
            tokio::task::yield_now().await;
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(content)
        }
    }

    #[tokio::test]
    async fn waits_for_every_transform() {
        let a = tempfile::tempdir().unwrap();
        for i in 0..50 {
            write(a.path(), &format!("f{i}.txt"), "x");
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let config = noop_config()
            .transform(Counting(Arc::clone(&calls)))
            .build()
            .unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf()]);

        let entries = collect(&roots, &config).await.unwrap();
        assert_eq!(entries.len(), 50);
        assert_eq!(calls.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn missing_root_fails_the_collection() {
        let a = tempfile::tempdir().unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf(), a.path().join("missing")]);
        let config = noop_config().build().unwrap();
        let err = collect(&roots, &config).await.unwrap_err();
        assert!(matches!(err, BuildError::Match(MatchError::MissingRoot(_))));
    }

    /// Emits a path that does not exist on disk.
    struct PhantomMatcher;

    impl PathMatcher for PhantomMatcher {
        fn scan(&self, _root: &Path, _patterns: Arc<PatternSet>, _options: &GlobOptions) -> PathStream {
            PathStream::from_paths(["phantom.txt"])
        }
    }

    #[tokio::test]
    async fn read_failure_fails_the_collection() {
        let a = tempfile::tempdir().unwrap();
        let config = noop_config().matcher(PhantomMatcher).build().unwrap();
        let roots = InputRoot::enumerate(&[a.path().to_path_buf()]);
        let err = collect(&roots, &config).await.unwrap_err();
        assert!(matches!(err, BuildError::Io { ref path, .. } if path.ends_with("phantom.txt")));
    }

    #[tokio::test]
    async fn entries_keep_their_root_index() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let c = tempfile::tempdir().unwrap();
        write(c.path(), "only-in-c.txt", "c");

        let roots = InputRoot::enumerate(&[
            a.path().to_path_buf(),
            b.path().to_path_buf(),
            c.path().to_path_buf(),
        ]);
        let config = noop_config().build().unwrap();
        let entries = collect(&roots, &config).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].root, RootIndex(2));
        assert_eq!(entries[0].content, Content::from("c"));
    }
}
