//! File contents and the encoding used to read and write them.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::TypeError;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Text encoding applied when reading inputs and writing text outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8. Invalid sequences decode to U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1: one byte per char. Chars above U+00FF keep only their low byte on write.
    Latin1,
    /// No decoding: inputs are read as [`Content::Binary`], text outputs are written as UTF-8.
    Raw,
}

impl Encoding {
    /// The lowercase name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Latin1 => "latin1",
            Self::Raw => "raw",
        }
    }

    /// Decode raw file bytes into entry content.
    ///
    /// The returned flag is `true` when UTF-8 decoding had to replace
    /// invalid sequences.
    pub fn decode(&self, raw: Vec<u8>) -> (Content, bool) {
        match self {
            Self::Utf8 => match String::from_utf8(raw) {
                Ok(text) => (Content::Text(text), false),
                Err(err) => {
                    let text = String::from_utf8_lossy(err.as_bytes()).into_owned();
                    (Content::Text(text), true)
                }
            },
            Self::Latin1 => (
                Content::Text(raw.iter().map(|&b| char::from(b)).collect()),
                false,
            ),
            Self::Raw => (Content::Binary(Bytes::from(raw)), false),
        }
    }

    /// Encode an output blob into the bytes written to disk.
    pub fn encode(&self, blob: &Blob) -> Bytes {
        match (self, blob) {
            (_, Blob::Binary(bytes)) => bytes.clone(),
            (Self::Latin1, Blob::Text(text)) => {
                text.chars().map(|c| (u32::from(c) & 0xFF) as u8).collect()
            }
            (_, Blob::Text(text)) => Bytes::copy_from_slice(text.as_bytes()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "iso-8859-1" | "binary" => Ok(Self::Latin1),
            "raw" => Ok(Self::Raw),
            _ => Err(TypeError::UnknownEncoding(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// The contents carried by an entry.
///
/// Reading produces [`Content::Text`] or [`Content::Binary`] depending on the
/// configured [`Encoding`]; a transform may replace it with anything,
/// including a [`Content::Structured`] value.
///
/// Serializes as a string, the structured value itself, or for binary
/// content a plain sequence of bytes (a JSON array of numbers, with no
/// type tag).
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text(String),
    Binary(Bytes),
    Structured(serde_json::Value),
}

impl Content {
    /// The text, if this is text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Convert into an output blob. Structured values render as compact JSON.
    pub fn into_blob(self) -> Blob {
        match self {
            Self::Text(text) => Blob::Text(text),
            Self::Binary(bytes) => Blob::Binary(bytes),
            Self::Structured(value) => Blob::Text(value.to_string()),
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Binary(bytes) => serializer.serialize_bytes(bytes),
            Self::Structured(value) => value.serialize(serializer),
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Contents of one output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Blob {
    Text(String),
    Binary(Bytes),
}

impl Blob {
    /// Length in bytes before encoding.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Binary(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

impl From<String> for Blob {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Blob {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<Bytes> for Blob {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decodes_valid_text() {
        let (content, lossy) = Encoding::Utf8.decode("héllo".as_bytes().to_vec());
        assert_eq!(content, Content::Text("héllo".into()));
        assert!(!lossy);
    }

    #[test]
    fn utf8_replaces_invalid_sequences() {
        let (content, lossy) = Encoding::Utf8.decode(vec![b'a', 0xFF, b'b']);
        assert_eq!(content.as_text(), Some("a\u{FFFD}b"));
        assert!(lossy);
    }

    #[test]
    fn latin1_maps_every_byte() {
        let (content, _) = Encoding::Latin1.decode(vec![0x41, 0xE9, 0xFF]);
        assert_eq!(content.as_text(), Some("A\u{e9}\u{ff}"));
        let bytes = Encoding::Latin1.encode(&Blob::Text("A\u{e9}\u{ff}".into()));
        assert_eq!(&bytes[..], &[0x41, 0xE9, 0xFF]);
    }

    #[test]
    fn raw_keeps_bytes() {
        let (content, _) = Encoding::Raw.decode(vec![0, 159, 146, 150]);
        assert_eq!(content, Content::Binary(Bytes::from_static(&[0, 159, 146, 150])));
    }

    #[test]
    fn binary_blobs_ignore_encoding() {
        let blob = Blob::from(vec![0xC3, 0x28]);
        for encoding in [Encoding::Utf8, Encoding::Latin1, Encoding::Raw] {
            assert_eq!(&encoding.encode(&blob)[..], &[0xC3, 0x28]);
        }
    }

    #[test]
    fn encoding_parses_aliases() {
        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("binary".parse::<Encoding>().unwrap(), Encoding::Latin1);
        assert!(matches!(
            "ebcdic".parse::<Encoding>(),
            Err(TypeError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn content_serializes_by_variant() {
        assert_eq!(serde_json::to_string(&Content::from("hi")).unwrap(), "\"hi\"");
        assert_eq!(serde_json::to_string(&Content::from(vec![1u8, 2])).unwrap(), "[1,2]");
        let structured = Content::from(serde_json::json!({ "a": 1 }));
        assert_eq!(serde_json::to_string(&structured).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn structured_content_renders_as_json_blob() {
        let blob = Content::from(serde_json::json!([1, 2])).into_blob();
        assert_eq!(blob, Blob::Text("[1,2]".into()));
    }
}
