//! End-to-end tests of the forwarding proxy against a mock backend.

use axum::http::Method;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

use common::{client, start_mock_upstream, start_proxy, upload_form, UPSTREAM_CONTENT_TYPE};

#[tokio::test]
async fn test_compress_pdf_reply_shape() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/compress"))
        .multipart(upload_form("in.pdf", "application/pdf", &[("compressionLevel", "70")]))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "downloadUrl": "/api/download?file=compressed_in.pdf",
            "originalSize": 1000,
            "compressedSize": 400,
        })
    );

    let seen = mock.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, "/api/compress");
    assert_eq!(
        seen[0].fields,
        vec![("compressionLevel".to_string(), "70".to_string())]
    );
    assert_eq!(seen[0].file.as_ref().map(|f| f.0.as_str()), Some("in.pdf"));
    assert_eq!(seen[0].file.as_ref().map(|f| f.1), Some(21));
}

#[tokio::test]
async fn test_media_compression_targets_resource_prefix() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/image/compress"))
        .multipart(upload_form("a.png", "image/png", &[("compressionLevel", "50")]))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["downloadUrl"], "/api/image/download?file=compressed_a.png");

    let res = client()
        .post(proxy.url("/api/video"))
        .multipart(upload_form("c.mp4", "video/mp4", &[("compressionLevel", "30")]))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["downloadUrl"], "/api/video?file=compressed_c.mp4");

    let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/image/compress", "/api/video/compress"]);
}

#[tokio::test]
async fn test_upstream_error_message_is_relayed() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/compress"))
        .multipart(upload_form("bad.pdf", "application/pdf", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "bad file" }));
}

#[tokio::test]
async fn test_upstream_error_without_message_uses_fallback() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/convert/word-to-pdf"))
        .multipart(upload_form("silent.pdf", "application/msword", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Conversion failed" }));
}

#[tokio::test]
async fn test_unreachable_upstream_is_generic_500() {
    let dead = common::closed_addr().await;
    let proxy = start_proxy(&format!("http://{}/api", dead)).await;

    let res = client()
        .post(proxy.url("/api/compress"))
        .multipart(upload_form("in.pdf", "application/pdf", &[]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process PDF" }));

    let res = client()
        .get(proxy.url("/api/download?file=x.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to download file" }));

    let res = client()
        .delete(proxy.url("/api/image/delete?file=a.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to delete file" }));
}

#[tokio::test]
async fn test_reply_without_file_name_is_generic_500() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/compress"))
        .multipart(upload_form("nameless.pdf", "application/pdf", &[]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Failed to process PDF" }));
}

#[tokio::test]
async fn test_conversion_reply_shape() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/convert/pdf-to-word"))
        .multipart(upload_form("in.pdf", "application/pdf", &[]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "downloadUrl": "/api/convert/download?file=converted.docx",
            "sourceFormat": "PDF",
            "targetFormat": "DOCX",
            "message": "Converted",
        })
    );
    assert_eq!(mock.requests()[0].path, "/api/convert/pdf-to-word");
}

#[tokio::test]
async fn test_watermark_routes_by_file_type() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .post(proxy.url("/api/watermark"))
        .multipart(upload_form(
            "in.pdf",
            "application/pdf",
            &[("threshold", "150"), ("tolerance", "25"), ("fileType", "pdf")],
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "downloadUrl": "/api/watermark?file=clean_in.pdf",
            "fileType": "pdf",
            "message": "Watermark removed",
        })
    );

    let seen = mock.requests();
    assert_eq!(seen[0].path, "/api/watermark/remove/pdf");
    assert_eq!(
        seen[0].fields,
        vec![
            ("threshold".to_string(), "150".to_string()),
            ("tolerance".to_string(), "25".to_string()),
            ("fileType".to_string(), "pdf".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_watermark_rejects_unknown_file_type() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    for fields in [vec![("fileType", "video")], vec![]] {
        let res = client()
            .post(proxy.url("/api/watermark"))
            .multipart(upload_form("in.pdf", "application/pdf", &fields))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Invalid file type" }));
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_pdf_download_headers() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .get(proxy.url("/api/download?file=x.pdf"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(res.headers()[CONTENT_DISPOSITION], "attachment; filename=x.pdf");
    assert_eq!(res.text().await.unwrap(), "content:x.pdf");

    let seen = mock.requests();
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].path, "/api/download/x.pdf");
}

#[tokio::test]
async fn test_download_content_type_policies() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let cases = [
        ("/api/image/download?file=a.png", UPSTREAM_CONTENT_TYPE),
        ("/api/video?file=c.mp4", UPSTREAM_CONTENT_TYPE),
        ("/api/watermark?file=clean.png", UPSTREAM_CONTENT_TYPE),
        (
            "/api/convert/download?file=converted.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        ("/api/convert/download?file=converted.pdf", "application/pdf"),
    ];
    for (path, expected) in cases {
        let res = client().get(proxy.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        assert_eq!(res.headers()[CONTENT_TYPE], expected, "{}", path);
    }

    let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            "/api/image/download/a.png",
            "/api/video/download/c.mp4",
            "/api/watermark/download/clean.png",
            "/api/convert/download/converted.docx",
            "/api/convert/download/converted.pdf",
        ]
    );
}

#[tokio::test]
async fn test_download_missing_file_is_not_found() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .get(proxy.url("/api/image/download?file=missing.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "File not found" }));
}

#[tokio::test]
async fn test_file_names_cannot_escape_prefix() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .get(proxy.url("/api/download?file=..%2Fsecret%20file.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[CONTENT_DISPOSITION],
        "attachment; filename=../secret file.pdf"
    );
    assert_eq!(mock.requests()[0].path, "/api/download/..%2Fsecret%20file.pdf");
}

#[tokio::test]
async fn test_missing_file_parameter_is_bad_request() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let requests = [
        client().get(proxy.url("/api/download")),
        client().get(proxy.url("/api/video?file=")),
        client().delete(proxy.url("/api/image/delete")),
        client().delete(proxy.url("/api/watermark")),
    ];
    for request in requests {
        let res = request.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "No file specified" }));
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_delete_passes_upstream_body_through() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client()
        .delete(proxy.url("/api/image/delete?file=a.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "success": true, "message": "File deleted" }));

    let res = client()
        .delete(proxy.url("/api/download?file=missing.pdf"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "File not found on server" }));

    let deletes: Vec<String> = mock
        .requests_with(Method::DELETE)
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(deletes, vec!["/api/image/delete/a.png", "/api/delete/missing.pdf"]);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let mock = start_mock_upstream().await;
    let proxy = start_proxy(&mock.base_url()).await;

    let res = client().get(proxy.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let res = client()
        .get(proxy.url("/health"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}
