// Delete operation trait and implementation
use crate::error::Result;
use opendal::Operator;

/// Trait for deleting objects from storage.
pub trait Deleter {
    /// Delete a single object. Deleting a missing key is not an error.
    ///
    /// # Arguments
    /// * `path` - Object key to delete
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Implementation of Deleter for OpenDAL Operator.
pub struct OpenDalDeleter {
    operator: Operator,
}

impl OpenDalDeleter {
    /// Create a new deleter with the given OpenDAL operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }
}

impl Deleter for OpenDalDeleter {
    async fn delete(&self, path: &str) -> Result<()> {
        match self.operator.delete(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
