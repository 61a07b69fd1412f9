//! Duplicate resolution policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// What happens when several input roots contain a file with the same
/// relative path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateStrategy {
    /// The build fails with a duplicate file error.
    #[default]
    Prohibit,
    /// The first entry in sequence order wins.
    KeepFirst,
    /// The last entry in sequence order wins.
    KeepLast,
    /// Every entry is passed through, paths may repeat.
    KeepAll,
}

impl DuplicateStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Prohibit,
        Self::KeepFirst,
        Self::KeepLast,
        Self::KeepAll,
    ];

    /// Returns `true` if the outcome depends on the order of entries.
    ///
    /// Such strategies cannot be combined with an unsorted sequence.
    pub fn is_order_sensitive(&self) -> bool {
        matches!(self, Self::KeepFirst | Self::KeepLast)
    }

    /// Returns `true` if the strategy leaves at most one file per path.
    pub fn collapses(&self) -> bool {
        !matches!(self, Self::KeepAll)
    }

    /// The kebab-case name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prohibit => "prohibit",
            Self::KeepFirst => "keep-first",
            Self::KeepLast => "keep-last",
            Self::KeepAll => "keep-all",
        }
    }
}

impl fmt::Display for DuplicateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicateStrategy {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| TypeError::UnknownStrategy(s.to_string()))
    }
}
