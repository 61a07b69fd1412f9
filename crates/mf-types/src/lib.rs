//! Foundation types for mergefiles.
//!
//! This crate provides the data model shared by every stage of the merge
//! pipeline: the tagged entries produced by collection, the root-erased files
//! handed to the aggregation callback, and the contents that flow between them.
//!
//! # Key Types
//!
//! - [`RootIndex`] -- Position of an input root in the caller-supplied list
//! - [`Entry`] -- A discovered file tagged with its root index
//! - [`File`] -- An entry with the root tag erased
//! - [`Content`] -- Entry contents: text, bytes, or a transform's structured value
//! - [`Blob`] -- Output contents: text or bytes
//! - [`MergeOutput`] -- What an aggregation callback returns
//! - [`DuplicateStrategy`] -- Policy for paths present in several roots
//! - [`Encoding`] -- Text encoding used for both reading and writing

pub mod content;
pub mod entry;
pub mod error;
pub mod output;
pub mod strategy;

pub use content::{Blob, Content, Encoding};
pub use entry::{Entry, File, InputRoot, RootIndex};
pub use error::TypeError;
pub use output::{MergeOutput, OutputFile};
pub use strategy::DuplicateStrategy;
