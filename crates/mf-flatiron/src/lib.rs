//! Nested-mapping serializer for merged file lists.
//!
//! Turns a list of `(path, content)` files into a single text of the form
//! `prefix + pretty JSON + suffix`, where each path segment becomes a level of
//! nesting. With the default prefix and suffix the result is a module that
//! default-exports the tree.
//!
//! ```rust
//! use mf_flatiron::{flatiron, FlatironOptions};
//! use mf_types::File;
//!
//! let files = vec![File::new("a/b.txt", "hello")];
//! let options = FlatironOptions { trim_extensions: true, ..FlatironOptions::default() };
//! let out = flatiron(&files, &options).unwrap();
//! assert_eq!(out, "export default {\n  \"a\": {\n    \"b\": \"hello\"\n  }\n};");
//! ```

pub mod error;
pub mod tree;

pub use error::{FlatironError, FlatironResult};
pub use tree::{flatiron, FlatironOptions, Node};
