use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Filesystem entry kinds the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl EntryKind {
    /// Lowercase name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// One line of a compacted listing.
///
/// Serialises as a bare string or as a `[first, last]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingEntry {
    /// Standalone file or a sequence with a single member.
    Single(String),
    /// First and last member of a sequence with two or more members.
    Sequence(String, String),
}

impl Display for ListingEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::Sequence(first, last) => write!(f, "{first} .. {last}"),
        }
    }
}
