use crate::error::{Error, Result};
use crate::storage::constants::DEFAULT_CONTENT_TYPE;
use jiff::Timestamp;
use opendal::{ErrorKind, Metadata, Operator};
use std::time::SystemTime;

/// Object metadata as reported by a head-style lookup.
///
/// - `path`: The queried object key (as provided by caller)
/// - `size`: Content length in bytes
/// - `last_modified`: Modification time if the backend reports one
/// - `content_type`: MIME type, defaulting to `application/octet-stream`
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub path: String,
    pub size: u64,
    pub last_modified: Option<Timestamp>,
    pub content_type: String,
}

impl ObjectMeta {
    pub(crate) fn from_metadata(path: &str, meta: &Metadata) -> Self {
        Self {
            path: path.to_owned(),
            size: meta.content_length(),
            last_modified: timestamp_of(meta),
            content_type: meta
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string(),
        }
    }
}

/// Convert the backend's modification time into a [`Timestamp`].
pub(crate) fn timestamp_of(meta: &Metadata) -> Option<Timestamp> {
    meta.last_modified()
        .and_then(|t| Timestamp::try_from(SystemTime::from(t)).ok())
}

/// Trait for fetching object metadata from storage.
pub trait Stater {
    /// Create a new stater with the given OpenDAL operator.
    fn new(operator: Operator) -> Self;

    /// Fetch metadata for a single object.
    ///
    /// # Arguments
    /// * `path` - Object key to query. Accepts any type implementing `AsRef<str>`.
    ///
    /// # Returns
    /// * `Result<ObjectMeta>` - Metadata, or `Error::NotFound` when the key is absent
    async fn stat<P: AsRef<str>>(&self, path: P) -> Result<ObjectMeta>;

    /// Check whether an object exists. Absence is not an error.
    async fn exists<P: AsRef<str>>(&self, path: P) -> Result<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Implementation of `Stater` for OpenDAL `Operator`.
#[derive(Clone)]
pub struct OpenDalStater {
    operator: Operator,
}

impl Stater for OpenDalStater {
    fn new(operator: Operator) -> Self {
        Self { operator }
    }

    async fn stat<P: AsRef<str>>(&self, path: P) -> Result<ObjectMeta> {
        let path = path.as_ref();
        match self.operator.stat(path).await {
            Ok(meta) if meta.mode().is_file() => Ok(ObjectMeta::from_metadata(path, &meta)),
            Ok(_) => Err(Error::NotFound {
                path: path.to_owned(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
                path: path.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
