//! Lazy, channel-backed path sequences.

use tokio::sync::mpsc;

use crate::error::{MatchError, MatchResult};

/// Number of matched paths buffered between the walker and its consumer.
pub const STREAM_CAPACITY: usize = 256;

/// A lazy sequence of matched paths under one root.
///
/// `next()` yields paths as the walk discovers them and returns `None` once
/// the producer has finished, which is the only exhaustion signal. Dropping
/// the stream tells the producer to stop.
#[derive(Debug)]
pub struct PathStream {
    rx: mpsc::Receiver<MatchResult<String>>,
}

/// Producing half of a [`PathStream`].
#[derive(Clone, Debug)]
pub struct PathSink {
    tx: mpsc::Sender<MatchResult<String>>,
}

impl PathStream {
    /// Create a connected sink/stream pair.
    pub fn channel(capacity: usize) -> (PathSink, PathStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (PathSink { tx }, PathStream { rx })
    }

    /// A stream over a fixed list of paths, already exhausted at the end.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(paths.into_iter().map(|p| Ok(p.into())))
    }

    /// A stream over a fixed list of items, errors included.
    pub fn from_results<I>(items: I) -> Self
    where
        I: IntoIterator<Item = MatchResult<String>>,
    {
        let items: Vec<_> = items.into_iter().collect();
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            // Capacity covers every item, so this cannot fail.
            let _ = tx.try_send(item);
        }
        Self { rx }
    }

    /// A stream that yields a single error and ends.
    pub fn failed(err: MatchError) -> Self {
        Self::from_results([Err(err)])
    }

    /// Next matched path, or `None` once the sequence is exhausted.
    pub async fn next(&mut self) -> Option<MatchResult<String>> {
        self.rx.recv().await
    }

    /// Drain the whole sequence, stopping at the first error.
    pub async fn collect_all(mut self) -> MatchResult<Vec<String>> {
        let mut paths = Vec::new();
        while let Some(item) = self.next().await {
            paths.push(item?);
        }
        Ok(paths)
    }
}

impl PathSink {
    /// Send from a blocking thread. Returns `false` once the consumer is gone.
    pub fn send_blocking(&self, item: MatchResult<String>) -> bool {
        self.tx.blocking_send(item).is_ok()
    }

    /// Send from async code. Returns `false` once the consumer is gone.
    pub async fn send(&self, item: MatchResult<String>) -> bool {
        self.tx.send(item).await.is_ok()
    }

    /// Returns `true` if the consuming stream has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
