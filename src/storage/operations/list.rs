use crate::error::Result;
use crate::storage::operations::stat::timestamp_of;
use crate::storage::utils::path::scan_root;
use futures::future;
use futures::stream::{StreamExt, TryStreamExt};
use jiff::Timestamp;
use opendal::{Entry, ErrorKind, Operator};

/// One key returned by a prefix scan, decoded from the backend listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<Timestamp>,
}

/// A slice of a prefix scan.
///
/// `next_marker` is the last key of this slice when more keys remain under
/// the prefix, and `None` once the scan is exhausted.
#[derive(Debug, Clone, Default)]
pub struct KeyPage {
    pub entries: Vec<ObjectEntry>,
    pub next_marker: Option<String>,
}

/// Trait for prefix-scanning keys in object storage.
pub trait Lister {
    /// List up to `max_keys` file keys starting with `prefix`, in ascending
    /// lexicographic order, strictly after `start_after` when given.
    ///
    /// # Arguments
    /// * `prefix` - Key prefix to scan; empty scans the whole bucket
    /// * `max_keys` - Upper bound on the number of entries returned
    /// * `start_after` - Resume marker from a previous [`KeyPage`]
    async fn list_keys(
        &self,
        prefix: &str,
        max_keys: usize,
        start_after: Option<&str>,
    ) -> Result<KeyPage>;
}

/// Implementation of Lister for OpenDAL Operator.
pub struct OpenDalLister {
    operator: Operator,
}

impl OpenDalLister {
    /// Create a new lister with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    /// Whether the backend scans keys in order and can resume after a key
    /// server-side (S3, OSS). Other services are collected and sorted here.
    fn native_scan(&self) -> bool {
        self.operator.info().full_capability().list_with_start_after
    }

    async fn scan(
        &self,
        prefix: &str,
        max_keys: usize,
        start_after: Option<&str>,
    ) -> Result<Vec<Entry>> {
        let native = self.native_scan();
        let mut request = self.operator.lister_with(scan_root(prefix)).recursive(true);
        if native {
            if let Some(marker) = start_after.or_else(|| seek_marker(prefix)) {
                request = request.start_after(marker);
            }
        }

        let lister = match request.await {
            Ok(lister) => lister,
            // Emulated listings report a missing parent directory as NotFound;
            // for native object stores it means the bucket itself is gone.
            Err(e) if e.kind() == ErrorKind::NotFound && !native => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let matching = |entry: &Entry| {
            let path = entry.path();
            future::ready(
                entry.metadata().mode().is_file()
                    && path.starts_with(prefix)
                    && start_after.is_none_or(|marker| path > marker),
            )
        };

        let entries: Vec<Entry> = if native {
            // Keys arrive in order, so the scan ends at the first key past the
            // prefix. One extra entry tells us whether anything remains.
            lister
                .try_take_while(|entry| future::ready(Ok(!past_prefix(entry.path(), prefix))))
                .try_filter(matching)
                .take(max_keys + 1)
                .try_collect()
                .await?
        } else {
            let mut entries: Vec<Entry> = lister.try_filter(matching).try_collect().await?;
            entries.sort_by(|a, b| a.path().cmp(b.path()));
            entries.dedup_by(|a, b| a.path() == b.path());
            entries
        };
        Ok(entries)
    }

    /// Decode an entry's metadata, asking the backend again when the listing
    /// didn't carry a modification time (memory, fs). Keys deleted since the
    /// scan are reported as `None`.
    async fn decode_entry(&self, entry: Entry) -> Result<Option<ObjectEntry>> {
        let (path, meta) = entry.into_parts();
        let meta = if meta.last_modified().is_some() {
            meta
        } else {
            match self.operator.stat(&path).await {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log::debug!("key {path} vanished during listing, skipping");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        };

        Ok(Some(ObjectEntry {
            size: meta.content_length(),
            last_modified: timestamp_of(&meta),
            key: path,
        }))
    }
}

impl Lister for OpenDalLister {
    async fn list_keys(
        &self,
        prefix: &str,
        max_keys: usize,
        start_after: Option<&str>,
    ) -> Result<KeyPage> {
        let scanned = self.scan(prefix, max_keys, start_after).await?;
        let (window, next_marker) = split_page(scanned, max_keys, |e| e.path());

        let mut entries = Vec::with_capacity(window.len());
        for entry in window {
            if let Some(decoded) = self.decode_entry(entry).await? {
                entries.push(decoded);
            }
        }

        Ok(KeyPage {
            entries,
            next_marker,
        })
    }
}

/// Whether an ordered scan for `prefix` has moved beyond every key that can
/// match it.
pub fn past_prefix(path: &str, prefix: &str) -> bool {
    path > prefix && !path.starts_with(prefix)
}

/// Marker that lets an ordered scan skip the keys sorting before `prefix`.
///
/// `start_after` is exclusive and a key may equal the prefix itself, so the
/// marker is the prefix minus its last character.
pub fn seek_marker(prefix: &str) -> Option<&str> {
    let (cut, _) = prefix.char_indices().last()?;
    (cut > 0).then(|| &prefix[..cut])
}

/// Cut an ascending run of items down to one page.
///
/// Returns the first `page_size` items, plus the key of the last returned
/// item when anything was left over. A run that ends exactly on a page
/// boundary yields no marker.
pub fn split_page<T>(
    mut items: Vec<T>,
    page_size: usize,
    key: impl Fn(&T) -> &str,
) -> (Vec<T>, Option<String>) {
    if items.len() <= page_size {
        return (items, None);
    }
    items.truncate(page_size);
    let marker = items.last().map(|item| key(item).to_string());
    (items, marker)
}
