//! Duplicate resolution over the sequenced entries.
//!
//! Two entries are duplicates when their relative paths are byte-identical.
//! "First" and "last" always refer to position in the sequence handed in,
//! which is the configured sort order.

use std::collections::hash_map::{Entry as Slot, HashMap};

use mf_types::{DuplicateStrategy, Entry, File, RootIndex};
use tracing::trace;

use crate::error::DuplicateFileError;

/// Resolve duplicate paths according to `strategy`.
///
/// Collapsing strategies keep each path at the position of its first
/// occurrence; `KeepLast` only swaps the contents in place.
pub fn deduplicate(
    entries: Vec<Entry>,
    strategy: DuplicateStrategy,
) -> Result<Vec<File>, DuplicateFileError> {
    if !strategy.collapses() {
        return Ok(entries.into_iter().map(Entry::into_file).collect());
    }

    let mut slots: HashMap<String, (usize, RootIndex)> = HashMap::with_capacity(entries.len());
    let mut files: Vec<File> = Vec::with_capacity(entries.len());

    for entry in entries {
        match slots.entry(entry.path.clone()) {
            Slot::Vacant(vacant) => {
                vacant.insert((files.len(), entry.root));
                files.push(entry.into_file());
            }
            Slot::Occupied(occupied) => {
                let (index, first_seen) = *occupied.get();
                match strategy {
                    DuplicateStrategy::Prohibit => {
                        return Err(DuplicateFileError {
                            path: entry.path,
                            root: entry.root,
                            first_seen,
                        });
                    }
                    DuplicateStrategy::KeepFirst | DuplicateStrategy::KeepAll => {
                        trace!(path = %entry.path, root = %entry.root, "dropping later duplicate");
                    }
                    DuplicateStrategy::KeepLast => {
                        trace!(path = %entry.path, root = %entry.root, "replacing earlier duplicate");
                        files[index].content = entry.content;
                    }
                }
            }
        }
    }

    Ok(files)
}
