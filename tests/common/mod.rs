//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use filepress_proxy::config::ProxyConfig;
use filepress_proxy::http::HttpServer;
use filepress_proxy::lifecycle::Shutdown;

/// Content type the mock backend puts on every download.
pub const UPSTREAM_CONTENT_TYPE: &str = "application/x-upstream";

/// One request seen by the mock backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    /// Raw (still percent-encoded) path.
    pub path: String,
    /// Text parts of a multipart body.
    pub fields: Vec<(String, String)>,
    /// File name and size of the uploaded file part.
    pub file: Option<(String, usize)>,
}

/// Handle on a running mock backend.
#[derive(Clone, Default)]
pub struct MockUpstream {
    pub addr: Option<SocketAddr>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr.expect("mock not started"))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: Method) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

/// Start a mock processing backend on an ephemeral port.
///
/// Uploads named `bad.pdf` are refused with `{"message": "bad file"}`,
/// `silent.pdf` fails without a message and `nameless.pdf` succeeds without
/// naming a file. Downloads and deletes of names starting with `missing`
/// answer 404.
pub async fn start_mock_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockUpstream {
        addr: Some(listener.local_addr().unwrap()),
        ..Default::default()
    };

    let app = Router::new().fallback(mock_handler).with_state(mock.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    mock
}

async fn mock_handler(State(mock): State<MockUpstream>, request: Request) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let mut recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        fields: Vec::new(),
        file: None,
    };

    if method == Method::POST {
        let mut multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(e) => return (StatusCode::BAD_REQUEST, e.body_text()).into_response(),
        };
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(String::from);
            let data = field.bytes().await.unwrap_or_default();
            match file_name {
                Some(file_name) => recorded.file = Some((file_name, data.len())),
                None => recorded
                    .fields
                    .push((name, String::from_utf8_lossy(&data).into_owned())),
            }
        }
    }

    mock.requests.lock().unwrap().push(recorded.clone());

    let last = path.rsplit('/').next().unwrap_or_default().to_string();
    match method {
        Method::POST => process_reply(&path, &last, recorded),
        Method::GET if last.starts_with("missing") => {
            (StatusCode::NOT_FOUND, "no such file").into_response()
        }
        Method::GET => Response::builder()
            .header(header::CONTENT_TYPE, UPSTREAM_CONTENT_TYPE)
            .body(Body::from(format!("content:{}", last)))
            .unwrap(),
        Method::DELETE if last.starts_with("missing") => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "File not found on server" })),
        )
            .into_response(),
        Method::DELETE => Json(json!({ "success": true, "message": "File deleted" })).into_response(),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn process_reply(path: &str, last: &str, recorded: Recorded) -> Response {
    let name = recorded.file.map(|(name, _)| name).unwrap_or_default();
    match name.as_str() {
        "bad.pdf" => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad file" }))).into_response()
        }
        "silent.pdf" => return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "nameless.pdf" => return Json(json!({ "success": true })).into_response(),
        _ => {}
    }

    let body: Value = if path.ends_with("/compress") {
        json!({
            "success": true,
            "fileName": format!("compressed_{}", name),
            "originalSize": 1000,
            "compressedSize": 400,
            "message": "dropped by the proxy",
        })
    } else if path.ends_with("/pdf-to-word") {
        json!({
            "success": true,
            "fileName": "converted.docx",
            "sourceFormat": "PDF",
            "targetFormat": "DOCX",
            "message": "Converted",
            "originalSize": 1000,
        })
    } else if path.ends_with("/word-to-pdf") {
        json!({
            "success": true,
            "fileName": "converted.pdf",
            "sourceFormat": "DOCX",
            "targetFormat": "PDF",
            "message": "Converted",
        })
    } else if path.contains("/watermark/remove/") {
        json!({
            "success": true,
            "fileName": format!("clean_{}", name),
            "fileType": last,
            "message": "Watermark removed",
        })
    } else {
        return StatusCode::NOT_FOUND.into_response();
    };
    Json(body).into_response()
}

/// A running proxy pointed at `base_url`.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the proxy on an ephemeral port, forwarding to `base_url`.
pub async fn start_proxy(base_url: &str) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = base_url.to_string();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Multipart body with a file part and text fields.
pub fn upload_form(
    file_name: &str,
    media_type: &str,
    fields: &[(&str, &str)],
) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(b"%PDF-1.7 test payload".to_vec())
        .file_name(file_name.to_string())
        .mime_str(media_type)
        .unwrap();
    let mut form = reqwest::multipart::Form::new().part("file", part);
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    form
}
