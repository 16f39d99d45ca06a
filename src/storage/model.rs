// Client-facing listing types
use jiff::Timestamp;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::operations::list::ObjectEntry;
use crate::storage::utils::path::is_valid_path;

/// Metadata of one file as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub file_path: String,
    pub last_modified: Option<Timestamp>,
    pub size_bytes: u64,
}

impl TryFrom<ObjectEntry> for FileMetadata {
    type Error = Error;

    fn try_from(entry: ObjectEntry) -> Result<Self> {
        if !is_valid_path(&entry.key) {
            return Err(Error::InvalidStoredKey { key: entry.key });
        }
        Ok(Self {
            file_path: entry.key,
            last_modified: entry.last_modified,
            size_bytes: entry.size,
        })
    }
}

/// One page of a listing.
///
/// `next_cursor` is `None` once the scan has returned every key under its
/// prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<FileMetadata>,
    pub next_cursor: Option<String>,
}

impl Page {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.file_path.as_str())
    }
}
