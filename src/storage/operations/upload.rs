use crate::error::Result;
use bytes::Bytes;
use crate::storage::operations::stat::{OpenDalStater, Stater};
use opendal::Operator;

/// Outcome of an upload: whether the key was newly created or overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub created: bool,
}

/// Trait for writing objects to storage.
pub trait Uploader {
    /// Write `content` to `path`, replacing any existing object.
    ///
    /// # Arguments
    /// * `path` - Destination key in storage
    /// * `content` - Full object body
    /// * `content_type` - MIME type stored alongside the object
    ///
    /// # Returns
    /// * `Result<UploadOutcome>` - Whether the key was created by this call
    async fn upload(
        &self,
        path: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<UploadOutcome>;
}

/// Implementation of Uploader for OpenDAL Operator.
pub struct OpenDalUploader {
    operator: Operator,
}

impl OpenDalUploader {
    /// Create a new uploader with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }
}

impl Uploader for OpenDalUploader {
    async fn upload(
        &self,
        path: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<UploadOutcome> {
        // Check-then-write is not atomic: two concurrent uploads of the same
        // new key can both report `created`.
        let existed = OpenDalStater::new(self.operator.clone())
            .exists(path)
            .await?;

        let size = content.len();
        self.operator
            .write_with(path, content)
            .content_type(content_type)
            .await?;
        log::debug!("wrote {size} bytes to {path} (existed={existed})");

        Ok(UploadOutcome { created: !existed })
    }
}
