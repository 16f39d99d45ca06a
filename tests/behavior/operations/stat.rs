use crate::*;
use files_api::error::{ErrorKind, Result};
use files_api::storage::StorageClient;
use jiff::{SignedDuration, Timestamp};

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_exists_tracks_presence,
        test_stat_file,
        test_stat_reports_last_modified,
        test_stat_not_found,
        test_stat_directory_is_not_a_file
    ));
}

pub async fn test_exists_tracks_presence(client: StorageClient) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path();
    assert!(!client.exists(&path).await?);

    client.operator().write(&path, b"content".to_vec()).await?;
    assert!(client.exists(&path).await?);

    client.operator().delete(&path).await?;
    assert!(!client.exists(&path).await?);
    Ok(())
}

pub async fn test_stat_file(client: StorageClient) -> Result<()> {
    let path = TEST_FIXTURE.new_file_path();
    client.upload(&path, b"Hello, World!".to_vec(), "text/plain").await?;

    let meta = client.stat(&path).await?;

    assert_eq!(meta.path, path);
    assert_eq!(meta.size, 13);
    assert_eq!(meta.content_type, "text/plain");
    Ok(())
}

pub async fn test_stat_reports_last_modified(_client: StorageClient) -> Result<()> {
    let (_dir, client) = fs_client().await;
    let before = Timestamp::now() - SignedDuration::from_secs(60);
    client.operator().write("dated.txt", b"dated".to_vec()).await?;

    let meta = client.stat("dated.txt").await?;

    assert_eq!(meta.size, 5);
    let last_modified = meta.last_modified.expect("fs reports mtime");
    assert!(last_modified > before, "{last_modified}");
    Ok(())
}

pub async fn test_stat_not_found(client: StorageClient) -> Result<()> {
    let err = client
        .stat(&TEST_FIXTURE.new_file_path())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

pub async fn test_stat_directory_is_not_a_file(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_path();
    TEST_FIXTURE
        .write_files(client.operator(), &dir, &["inner.txt"])
        .await?;

    assert!(!client.exists(&dir).await?);
    Ok(())
}
