use bytes::Bytes;

use crate::error::{Error, Result};
use crate::query::ListQuery;
use opendal::Operator;
use std::str::FromStr;

pub mod constants;
pub mod model;
mod operations;
pub mod utils;

use self::model::{FileMetadata, Page};
use self::operations::delete::OpenDalDeleter;
use self::operations::list::OpenDalLister;
use self::operations::read::OpenDalFileReader;
use self::operations::stat::OpenDalStater;
use self::operations::upload::OpenDalUploader;
use self::operations::{Deleter, FileReader, Lister, Stater, Uploader};
use self::utils::cursor::PageToken;
use crate::wrap_err;

pub use self::operations::read::StoredObject;
pub use self::operations::stat::ObjectMeta;
pub use self::operations::upload::UploadOutcome;

/// Storage provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Oss,
    S3,
    Fs,
    Memory,
}

impl FromStr for StorageProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "oss" => Ok(Self::Oss),
            "s3" | "minio" => Ok(Self::S3),
            "fs" => Ok(Self::Fs),
            "memory" => Ok(Self::Memory),
            _ => Err(Error::UnsupportedProvider {
                provider: s.to_string(),
            }),
        }
    }
}

/// Unified storage configuration for different providers
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub access_key_secret: Option<String>,
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub root_path: Option<String>,
}

impl StorageConfig {
    pub fn oss(
        bucket: String,
        access_key_id: String,
        access_key_secret: String,
        region: Option<String>,
    ) -> Self {
        Self {
            provider: StorageProvider::Oss,
            bucket,
            access_key_id: Some(access_key_id),
            access_key_secret: Some(access_key_secret),
            endpoint: None,
            region,
            root_path: None,
        }
    }

    pub fn s3(
        bucket: String,
        access_key_id: String,
        secret_access_key: String,
        region: Option<String>,
    ) -> Self {
        Self {
            provider: StorageProvider::S3,
            bucket,
            access_key_id: Some(access_key_id),
            access_key_secret: Some(secret_access_key),
            endpoint: None,
            region,
            root_path: None,
        }
    }

    pub fn fs(root_path: String) -> Self {
        Self {
            provider: StorageProvider::Fs,
            bucket: "local".to_string(),
            access_key_id: None,
            access_key_secret: None,
            endpoint: None,
            region: None,
            root_path: Some(root_path),
        }
    }

    /// Process-local storage, for tests and demos.
    pub fn memory() -> Self {
        Self {
            provider: StorageProvider::Memory,
            bucket: "memory".to_string(),
            access_key_id: None,
            access_key_secret: None,
            endpoint: None,
            region: None,
            root_path: None,
        }
    }
}

/// Unified storage client using OpenDAL.
///
/// Cloning is cheap; every clone shares the same operator, so one client can
/// serve any number of concurrent requests.
#[derive(Clone)]
pub struct StorageClient {
    operator: Operator,
    provider: StorageProvider,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let operator = Self::build_operator(&config)?;
        log::info!(
            "storage client ready provider={:?} bucket={}",
            config.provider,
            config.bucket
        );
        Ok(Self {
            operator,
            provider: config.provider,
        })
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn build_operator(config: &StorageConfig) -> Result<Operator> {
        match &config.provider {
            StorageProvider::Oss => {
                let mut builder = opendal::services::Oss::default().bucket(&config.bucket);
                if let Some(access_key_id) = &config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(access_key_secret) = &config.access_key_secret {
                    builder = builder.access_key_secret(access_key_secret);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::S3 => {
                let mut builder = opendal::services::S3::default().bucket(&config.bucket);
                if let Some(access_key_id) = &config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }
                if let Some(secret_access_key) = &config.access_key_secret {
                    builder = builder.secret_access_key(secret_access_key);
                }
                if let Some(region) = &config.region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Fs => {
                let root = config
                    .root_path
                    .as_deref()
                    .unwrap_or(constants::DEFAULT_FS_ROOT);
                let builder = opendal::services::Fs::default().root(root);
                Ok(Operator::new(builder)?.finish())
            }
            StorageProvider::Memory => {
                let builder = opendal::services::Memory::default();
                Ok(Operator::new(builder)?.finish())
            }
        }
    }

    /// Fetch one page of file metadata for `query`.
    ///
    /// Concatenating the pages of one scan (a fresh query followed by each
    /// returned `next_cursor`) yields every key under the prefix exactly once,
    /// in ascending order.
    pub async fn list_page(&self, query: &ListQuery) -> Result<Page> {
        let prefix = query.prefix();
        let page_size = query.page_size();
        log::debug!(
            "list_page provider={:?} prefix={} page_size={} resumed={}",
            self.provider,
            prefix,
            page_size,
            query.start_after().is_some()
        );

        let lister = OpenDalLister::new(self.operator.clone());
        let key_page = wrap_err!(
            lister
                .list_keys(prefix, page_size as usize, query.start_after())
                .await,
            ListFailed {
                prefix: prefix.to_string()
            }
        )?;

        let items = key_page
            .entries
            .into_iter()
            .map(FileMetadata::try_from)
            .collect::<Result<Vec<_>>>()?;
        let next_cursor = key_page.next_marker.map(|start_after| {
            PageToken {
                prefix: prefix.to_string(),
                page_size,
                start_after,
            }
            .encode()
        });

        Ok(Page { items, next_cursor })
    }

    /// Whether `path` currently holds an object.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        log::debug!("exists provider={:?} path={}", self.provider, path);
        OpenDalStater::new(self.operator.clone()).exists(path).await
    }

    /// Head-style lookup of a single object.
    pub async fn stat(&self, path: &str) -> Result<ObjectMeta> {
        log::debug!("stat provider={:?} path={}", self.provider, path);
        wrap_err!(
            OpenDalStater::new(self.operator.clone()).stat(path).await,
            FetchFailed {
                path: path.to_string()
            }
        )
    }

    /// Open an object for streaming.
    pub async fn fetch(&self, path: &str) -> Result<StoredObject> {
        log::debug!("fetch provider={:?} path={}", self.provider, path);
        let reader = OpenDalFileReader::new(self.operator.clone());
        wrap_err!(
            reader.open(path).await,
            FetchFailed {
                path: path.to_string()
            }
        )
    }

    /// Write an object, reporting whether it was newly created.
    pub async fn upload(
        &self,
        path: &str,
        content: impl Into<Bytes>,
        content_type: &str,
    ) -> Result<UploadOutcome> {
        let content = content.into();
        log::debug!(
            "upload provider={:?} path={} size={} content_type={}",
            self.provider,
            path,
            content.len(),
            content_type
        );
        let uploader = OpenDalUploader::new(self.operator.clone());
        wrap_err!(
            uploader.upload(path, content, content_type).await,
            UploadFailed {
                path: path.to_string()
            }
        )
    }

    /// Delete an object. Missing keys are not an error.
    pub async fn delete(&self, path: &str) -> Result<()> {
        log::debug!("delete provider={:?} path={}", self.provider, path);
        let deleter = OpenDalDeleter::new(self.operator.clone());
        wrap_err!(
            deleter.delete(path).await,
            DeleteFailed {
                path: path.to_string()
            }
        )
    }
}
