use indexmap::IndexMap;
use mf_types::{Content, File};
use serde::{Deserialize, Serialize};

use crate::error::{FlatironError, FlatironResult};

/// Output options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FlatironOptions {
    /// Drop the final extension from the last segment of every path.
    pub trim_extensions: bool,
    /// Text emitted before the JSON.
    pub prefix: String,
    /// Text emitted after the JSON.
    pub suffix: String,
}

impl Default for FlatironOptions {
    fn default() -> Self {
        Self {
            trim_extensions: false,
            prefix: "export default ".to_string(),
            suffix: ";".to_string(),
        }
    }
}

/// One level of the tree. Keys keep first-insertion order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Branch(IndexMap<String, Node>),
    Leaf(Content),
}

impl Node {
    /// Build the tree for `files`, in order. A later file at the same key
    /// replaces whatever was there.
    pub fn build(files: &[File], trim_extensions: bool) -> FlatironResult<IndexMap<String, Node>> {
        let mut root = IndexMap::new();
        for file in files {
            let mut keys: Vec<&str> = file.path.split('/').filter(|s| !s.is_empty()).collect();
            let Some(last) = keys.pop() else {
                return Err(FlatironError::EmptyPath(file.path.clone()));
            };
            let leaf_key = if trim_extensions { trim_extension(last) } else { last };

            let mut level = &mut root;
            for segment in keys {
                let node = level
                    .entry(segment.to_string())
                    .or_insert_with(|| Node::Branch(IndexMap::new()));
                level = match node {
                    Node::Branch(children) => children,
                    Node::Leaf(_) => {
                        return Err(FlatironError::NotAMapping {
                            path: file.path.clone(),
                            segment: segment.to_string(),
                        })
                    }
                };
            }
            level.insert(leaf_key.to_string(), Node::Leaf(file.content.clone()));
        }
        Ok(root)
    }
}

/// `file.txt` -> `file`, `archive.tar.gz` -> `archive.tar`, `.hidden` unchanged.
fn trim_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Serialize `files` as `prefix + pretty JSON tree + suffix`.
pub fn flatiron(files: &[File], options: &FlatironOptions) -> FlatironResult<String> {
    let tree = Node::build(files, options.trim_extensions)?;
    let json = serde_json::to_string_pretty(&tree)?;
    Ok(format!("{}{}{}", options.prefix, json, options.suffix))
}
