use crate::error::{Error, Result};
use crate::storage::operations::stat::ObjectMeta;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use opendal::{ErrorKind, Operator};

/// A stored object opened for reading: its metadata plus a body stream.
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: BoxStream<'static, std::io::Result<Bytes>>,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

pub trait FileReader {
    async fn open(&self, path: &str) -> Result<StoredObject>;
}

/// OpenDAL implementation of file reading
pub struct OpenDalFileReader {
    operator: Operator,
}

impl OpenDalFileReader {
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    fn not_found_or(path: &str, err: opendal::Error) -> Error {
        if err.kind() == ErrorKind::NotFound {
            Error::NotFound {
                path: path.to_string(),
            }
        } else {
            err.into()
        }
    }
}

impl FileReader for OpenDalFileReader {
    async fn open(&self, path: &str) -> Result<StoredObject> {
        let metadata = self
            .operator
            .stat(path)
            .await
            .map_err(|e| Self::not_found_or(path, e))?;
        if !metadata.mode().is_file() {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }

        let reader = self
            .operator
            .reader(path)
            .await
            .map_err(|e| Self::not_found_or(path, e))?;
        let body = reader.into_bytes_stream(..).await?.boxed();

        Ok(StoredObject {
            meta: ObjectMeta::from_metadata(path, &metadata),
            body,
        })
    }
}
