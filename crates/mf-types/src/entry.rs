//! Entries discovered under input roots and the files derived from them.

use std::fmt;
use std::path::PathBuf;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::content::Content;

/// Position of an input root in the caller-supplied list.
///
/// Root order is significant: it breaks ties in the default sequence and
/// therefore decides which entry wins under keep-first and keep-last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RootIndex(pub usize);

impl RootIndex {
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RootIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One input directory tree, immutable for the duration of a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputRoot {
    pub index: RootIndex,
    pub path: PathBuf,
}

impl InputRoot {
    /// Number a list of directories in the order given.
    pub fn enumerate(paths: &[PathBuf]) -> Vec<Self> {
        paths
            .iter()
            .enumerate()
            .map(|(i, path)| Self {
                index: RootIndex(i),
                path: path.clone(),
            })
            .collect()
    }
}

/// A file discovered under a root.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// Index of the root the file was found under.
    pub root: RootIndex,
    /// Path relative to the root, `/`-separated on every platform.
    pub path: String,
    /// Contents, possibly transformed.
    pub content: Content,
}

impl Entry {
    pub fn new(root: RootIndex, path: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            root,
            path: path.into(),
            content: content.into(),
        }
    }

    /// Erase the root tag.
    pub fn into_file(self) -> File {
        File {
            path: self.path,
            content: self.content,
        }
    }
}

/// A file handed to the aggregation callback.
///
/// Serializes as a `[path, content]` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    pub path: String,
    pub content: Content,
}

impl File {
    pub fn new(path: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl Serialize for File {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.path)?;
        pair.serialize_element(&self.content)?;
        pair.end()
    }
}
