use crate::*;
use axum::http::{Method, StatusCode, header};
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use files_api::error::Result;
use files_api::http::{ErrorBody, PutFileResponse, router};
use files_api::storage::StorageClient;
use jiff::fmt::rfc2822::DateTimeParser;
use jiff::{SignedDuration, Timestamp};
use serde_json::Value;

const TEST_FILE_CONTENT: &[u8] = b"Hello, World!";
const TEST_FILE_CONTENT_TYPE: &str = "text/plain";
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_api_upload_then_overwrite,
        test_api_upload_rejects_invalid_path,
        test_api_upload_requires_file_part,
        test_api_list_with_pagination,
        test_api_list_directory,
        test_api_list_rejects_bad_page_size,
        test_api_list_page_token_is_mutually_exclusive,
        test_api_list_rejects_garbage_token,
        test_api_head_file,
        test_api_head_reports_last_modified,
        test_api_head_missing_file,
        test_api_get_file,
        test_api_get_missing_file,
        test_api_serves_keys_written_by_other_clients,
        test_api_delete_file,
        test_api_delete_missing_file,
        test_api_unversioned_routes,
        test_api_backend_failure_is_opaque
    ));
}

fn server(client: StorageClient) -> TestServer {
    TestServer::new(router(client, MAX_UPLOAD_BYTES)).expect("test server")
}

fn file_form(content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file_content",
        Part::bytes(content.to_vec())
            .file_name("upload.txt")
            .mime_type(TEST_FILE_CONTENT_TYPE),
    )
}

async fn put_file(server: &TestServer, path: &str, content: &[u8]) -> StatusCode {
    server
        .put(&format!("/v1/files/{path}"))
        .multipart(file_form(content))
        .await
        .status_code()
}

async fn test_api_upload_then_overwrite(client: StorageClient) -> Result<()> {
    let server = server(client);
    let path = TEST_FIXTURE.new_file_path();

    let response = server
        .put(&format!("/v1/files/{path}"))
        .multipart(file_form(TEST_FILE_CONTENT))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(
        response.json::<PutFileResponse>(),
        PutFileResponse {
            file_path: path.clone(),
            message: format!("File uploaded successfully at path: /{path}"),
        }
    );

    let response = server
        .put(&format!("/v1/files/{path}"))
        .multipart(file_form(b"Hello, World! Updated!"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<PutFileResponse>().message,
        format!("File already exists at path: /{path}")
    );

    let response = server.get(&format!("/v1/files/{path}")).await;
    assert_eq!(response.as_bytes().as_ref(), b"Hello, World! Updated!");
    Ok(())
}

async fn test_api_upload_rejects_invalid_path(client: StorageClient) -> Result<()> {
    let server = server(client.clone());

    let status = put_file(&server, "bad%20name.txt", TEST_FILE_CONTENT).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!client.exists("bad name.txt").await?);
    Ok(())
}

async fn test_api_upload_requires_file_part(client: StorageClient) -> Result<()> {
    let server = server(client);
    let path = TEST_FIXTURE.new_file_path();

    let response = server
        .put(&format!("/v1/files/{path}"))
        .multipart(MultipartForm::new().add_text("comment", "no file here"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

async fn test_api_list_with_pagination(_client: StorageClient) -> Result<()> {
    let server = server(isolated_client().await);
    for i in 0..15 {
        let status = put_file(&server, &format!("file{i:02}.txt"), TEST_FILE_CONTENT).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = server.get("/v1/files").add_query_param("page_size", 10).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let data: Value = response.json();
    assert_eq!(data["files"].as_array().map(Vec::len), Some(10));
    assert_eq!(data["files"][0]["file_path"], "file00.txt");
    assert_eq!(data["files"][0]["size_bytes"], TEST_FILE_CONTENT.len());
    let token = data["next_page_token"]
        .as_str()
        .expect("a next page token")
        .to_string();

    let response = server.get("/v1/files").add_query_param("page_token", &token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let data: Value = response.json();
    assert_eq!(data["files"].as_array().map(Vec::len), Some(5));
    assert_eq!(data["files"][0]["file_path"], "file10.txt");
    assert!(data["next_page_token"].is_null());
    Ok(())
}

async fn test_api_list_directory(_client: StorageClient) -> Result<()> {
    let server = server(isolated_client().await);
    for path in ["folder1/a.txt", "folder2/b.txt", "folder2/sub/c.txt"] {
        assert_eq!(put_file(&server, path, TEST_FILE_CONTENT).await, StatusCode::CREATED);
    }

    let data: Value = server
        .get("/v1/files")
        .add_query_param("directory", "folder2/")
        .await
        .json();

    let paths: Vec<&str> = data["files"]
        .as_array()
        .expect("files array")
        .iter()
        .filter_map(|file| file["file_path"].as_str())
        .collect();
    assert_eq!(paths, ["folder2/b.txt", "folder2/sub/c.txt"]);
    assert!(data["next_page_token"].is_null());
    Ok(())
}

async fn test_api_list_rejects_bad_page_size(client: StorageClient) -> Result<()> {
    let server = server(client);

    for bad in ["-1", "0", "101", "ten"] {
        let response = server.get("/v1/files").add_query_param("page_size", bad).await;
        assert_eq!(
            response.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "page_size={bad}"
        );
    }
    Ok(())
}

async fn test_api_list_page_token_is_mutually_exclusive(client: StorageClient) -> Result<()> {
    let server = server(client);

    let cases: [&[(&str, &str)]; 4] = [
        &[("page_token", "token"), ("page_size", "10")],
        &[("page_token", "token"), ("directory", "dir")],
        &[("page_token", "token"), ("page_size", "10"), ("directory", "dir")],
        &[("page_token", "token"), ("directory", "")],
    ];
    for params in cases {
        let mut request = server.get("/v1/files");
        for (key, value) in params {
            request = request.add_query_param(key, value);
        }
        let response = request.await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            response.json::<ErrorBody>().detail.contains("mutually exclusive"),
            "{params:?}"
        );
    }
    Ok(())
}

async fn test_api_list_rejects_garbage_token(client: StorageClient) -> Result<()> {
    let server = server(client);

    let response = server
        .get("/v1/files")
        .add_query_param("page_token", "definitely-not-a-token")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

async fn test_api_head_file(client: StorageClient) -> Result<()> {
    let server = server(client);
    let path = TEST_FIXTURE.new_file_path();
    assert_eq!(put_file(&server, &path, TEST_FILE_CONTENT).await, StatusCode::CREATED);

    let response = server
        .method(Method::HEAD, &format!("/v1/files/{path}"))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.as_bytes().is_empty());
    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        TEST_FILE_CONTENT.len().to_string().as_str()
    );
    assert_eq!(headers[header::CONTENT_TYPE], TEST_FILE_CONTENT_TYPE);
    Ok(())
}

async fn test_api_head_reports_last_modified(_client: StorageClient) -> Result<()> {
    let (_dir, client) = fs_client().await;
    client
        .operator()
        .write("reports/q3.txt", TEST_FILE_CONTENT.to_vec())
        .await?;
    let server = server(client);
    let before = Timestamp::now() - SignedDuration::from_secs(60);

    let response = server
        .method(Method::HEAD, "/v1/files/reports/q3.txt")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_LENGTH],
        TEST_FILE_CONTENT.len().to_string().as_str()
    );
    let last_modified = headers[header::LAST_MODIFIED]
        .to_str()
        .expect("ascii header");
    assert!(last_modified.ends_with(" GMT"), "{last_modified}");
    let parsed = DateTimeParser::new()
        .parse_timestamp(last_modified)
        .expect("HTTP date");
    assert!(parsed > before, "{last_modified}");

    let data: Value = server.get("/v1/files").await.json();
    assert_eq!(data["files"][0]["file_path"], "reports/q3.txt");
    assert!(data["files"][0]["last_modified"].is_string(), "{data}");
    Ok(())
}

async fn test_api_head_missing_file(client: StorageClient) -> Result<()> {
    let server = server(client);

    let response = server
        .method(Method::HEAD, &format!("/v1/files/{}", TEST_FIXTURE.new_file_path()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    Ok(())
}

async fn test_api_get_file(client: StorageClient) -> Result<()> {
    let server = server(client);
    let path = format!("{}nested/file.txt", TEST_FIXTURE.new_dir_path());
    TEST_FIXTURE.add_path(path.clone());
    put_file(&server, &path, TEST_FILE_CONTENT).await;

    let response = server.get(&format!("/v1/files/{path}")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), TEST_FILE_CONTENT);
    assert!(response.headers().contains_key(header::CONTENT_TYPE));
    Ok(())
}

async fn test_api_get_missing_file(client: StorageClient) -> Result<()> {
    let server = server(client);

    let response = server
        .get(&format!("/v1/files/{}", TEST_FIXTURE.new_file_path()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<ErrorBody>(),
        ErrorBody {
            detail: "File not found".to_string()
        }
    );
    Ok(())
}

async fn test_api_serves_keys_written_by_other_clients(_client: StorageClient) -> Result<()> {
    let client = isolated_client().await;
    client
        .operator()
        .write("has space.txt", TEST_FILE_CONTENT.to_vec())
        .await?;
    let server = server(client.clone());

    let response = server.get("/v1/files/has%20space.txt").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), TEST_FILE_CONTENT);

    let response = server.method(Method::HEAD, "/v1/files/has%20space.txt").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.delete("/v1/files/has%20space.txt").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!client.exists("has space.txt").await?);
    Ok(())
}

async fn test_api_delete_file(client: StorageClient) -> Result<()> {
    let server = server(client.clone());
    let path = TEST_FIXTURE.new_file_path();
    put_file(&server, &path, TEST_FILE_CONTENT).await;

    let response = server.delete(&format!("/v1/files/{path}")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.as_bytes().is_empty());
    assert!(!client.exists(&path).await?);
    Ok(())
}

async fn test_api_delete_missing_file(client: StorageClient) -> Result<()> {
    let server = server(client.clone());
    let path = TEST_FIXTURE.new_file_path();

    let response = server.delete(&format!("/v1/files/{path}")).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<ErrorBody>().detail, "File not found");
    assert!(!client.exists(&path).await?);
    Ok(())
}

async fn test_api_unversioned_routes(client: StorageClient) -> Result<()> {
    let server = server(client);
    let path = TEST_FIXTURE.new_file_path();

    let response = server
        .put(&format!("/files/{path}"))
        .multipart(file_form(TEST_FILE_CONTENT))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = server.get(&format!("/files/{path}")).await;
    assert_eq!(response.as_bytes().as_ref(), TEST_FILE_CONTENT);
    Ok(())
}

async fn test_api_backend_failure_is_opaque(_client: StorageClient) -> Result<()> {
    let server = server(unreachable_client().await);

    let response = server.get("/v1/files").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<ErrorBody>(),
        ErrorBody {
            detail: "Internal server error".to_string()
        }
    );
    Ok(())
}
