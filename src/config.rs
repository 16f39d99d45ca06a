use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::storage::constants::DEFAULT_FS_ROOT;
use crate::storage::{StorageConfig, StorageProvider};

// Return the first of `keys` that is set, or report the first one as missing.
fn get_env_var(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .ok_or_else(|| Error::MissingEnvVar {
            key: keys.join(" or "),
        })
}

fn get_optional_env_var(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| env::var(key).ok())
}

/// Load storage configuration from environment variables
pub fn load_storage_config() -> Result<StorageConfig> {
    let provider_str = env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "s3".to_string());
    let provider = StorageProvider::from_str(&provider_str)?;

    match provider {
        StorageProvider::Oss => load_oss_config(),
        StorageProvider::S3 => load_s3_config(&provider_str),
        StorageProvider::Fs => Ok(load_fs_config()),
        StorageProvider::Memory => Ok(StorageConfig::memory()),
    }
}

/// Load OSS (Alibaba Cloud) configuration
fn load_oss_config() -> Result<StorageConfig> {
    let bucket = get_env_var(&["STORAGE_BUCKET", "OSS_BUCKET"])?;
    let access_key_id = get_env_var(&["STORAGE_ACCESS_KEY_ID", "OSS_ACCESS_KEY_ID"])?;
    let access_key_secret =
        get_env_var(&["STORAGE_ACCESS_KEY_SECRET", "OSS_ACCESS_KEY_SECRET"])?;
    let region = get_optional_env_var(&["STORAGE_REGION", "OSS_REGION"]);
    let endpoint = get_optional_env_var(&["STORAGE_ENDPOINT", "OSS_ENDPOINT"])
        .unwrap_or_else(|| "https://oss-cn-hangzhou.aliyuncs.com".to_string());

    let mut config = StorageConfig::oss(bucket, access_key_id, access_key_secret, region);
    config.endpoint = Some(endpoint);
    Ok(config)
}

/// Load S3 (AWS) or MinIO configuration
fn load_s3_config(provider_str: &str) -> Result<StorageConfig> {
    let is_minio = provider_str.eq_ignore_ascii_case("minio");

    let (bucket, access_key_id, secret_access_key) = if is_minio {
        (
            get_env_var(&["STORAGE_BUCKET", "MINIO_BUCKET"])?,
            get_env_var(&["STORAGE_ACCESS_KEY_ID", "MINIO_ACCESS_KEY"])?,
            get_env_var(&["STORAGE_ACCESS_KEY_SECRET", "MINIO_SECRET_KEY"])?,
        )
    } else {
        (
            get_env_var(&["STORAGE_BUCKET", "S3_BUCKET_NAME", "AWS_S3_BUCKET"])?,
            get_env_var(&["STORAGE_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"])?,
            get_env_var(&["STORAGE_ACCESS_KEY_SECRET", "AWS_SECRET_ACCESS_KEY"])?,
        )
    };

    let region = get_optional_env_var(&[
        "STORAGE_REGION",
        "AWS_DEFAULT_REGION",
        "MINIO_DEFAULT_REGION",
    ]);

    let endpoint = if is_minio {
        Some(
            get_optional_env_var(&["STORAGE_ENDPOINT", "MINIO_ENDPOINT"])
                .unwrap_or_else(|| "http://localhost:9000".to_string()),
        )
    } else {
        get_optional_env_var(&["STORAGE_ENDPOINT", "AWS_ENDPOINT_URL"])
    };

    let mut config = StorageConfig::s3(bucket, access_key_id, secret_access_key, region);
    config.endpoint = endpoint;
    Ok(config)
}

/// Load filesystem configuration (for local development)
fn load_fs_config() -> StorageConfig {
    let root_path =
        env::var("STORAGE_ROOT_PATH").unwrap_or_else(|_| DEFAULT_FS_ROOT.to_string());
    StorageConfig::fs(root_path)
}
