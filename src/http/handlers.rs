//! Forwarding handlers for the `/api` surface.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::Response,
    routing::{delete, get, MethodRouter},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::forward::{ProcessReply, ProxyError, UploadForm};
use crate::http::response::attachment;
use crate::http::server::AppState;
use crate::routing::action::{
    Action, COMPRESS_IMAGE, COMPRESS_PDF, COMPRESS_VIDEO, PDF_TO_WORD, REMOVE_WATERMARK,
    WORD_TO_PDF,
};
use crate::routing::Resource;

const NO_FILE: &str = "No file specified";
const INVALID_FILE_TYPE: &str = "Invalid file type";

/// `?file=<name>` query of download and delete routes.
#[derive(Debug, Default, Deserialize)]
pub struct FileQuery {
    pub file: Option<String>,
}

impl FileQuery {
    fn file_name(self) -> Result<String, ProxyError> {
        self.file
            .filter(|f| !f.is_empty())
            .ok_or(ProxyError::BadRequest(NO_FILE))
    }
}

type ProcessResult = Result<Json<ProcessReply>, ProxyError>;

async fn read_form(
    action: &Action,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, ProxyError> {
    let multipart = multipart.map_err(|e| ProxyError::failed(action.failure_message, e))?;
    UploadForm::read(multipart)
        .await
        .map_err(|e| ProxyError::failed(action.failure_message, e))
}

async fn process(
    state: &AppState,
    action: &Action,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    let form = read_form(action, multipart).await?;
    let reply = state.forwarder.upload(action, None, form).await?;
    Ok(Json(reply))
}

pub async fn compress_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    process(&state, &COMPRESS_PDF, multipart).await
}

pub async fn compress_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    process(&state, &COMPRESS_IMAGE, multipart).await
}

pub async fn compress_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    process(&state, &COMPRESS_VIDEO, multipart).await
}

pub async fn word_to_pdf(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    process(&state, &WORD_TO_PDF, multipart).await
}

pub async fn pdf_to_word(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    process(&state, &PDF_TO_WORD, multipart).await
}

/// Watermark removal; the form's `fileType` picks the upstream endpoint.
pub async fn remove_watermark(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProcessResult {
    let form = read_form(&REMOVE_WATERMARK, multipart).await?;
    let file_type = match form.text("fileType") {
        Some(kind @ ("image" | "pdf")) => kind.to_string(),
        other => {
            tracing::warn!(file_type = ?other, "Rejected watermark request");
            return Err(ProxyError::BadRequest(INVALID_FILE_TYPE));
        }
    };

    let reply = state
        .forwarder
        .upload(&REMOVE_WATERMARK, Some(&file_type), form)
        .await?;
    Ok(Json(reply))
}

/// Stream a processed file of `resource` back as an attachment.
pub async fn download_file(
    state: &AppState,
    resource: Resource,
    query: FileQuery,
) -> Result<Response, ProxyError> {
    let file_name = query.file_name()?;
    let upstream = state.forwarder.download(resource, &file_name).await?;
    attachment(&file_name, resource.content_type_policy(), upstream)
}

/// Delete a processed file of `resource`.
pub async fn delete_file(
    state: &AppState,
    resource: Resource,
    query: FileQuery,
) -> Result<Json<Value>, ProxyError> {
    let file_name = query.file_name()?;
    let body = state.forwarder.delete(resource, &file_name).await?;
    Ok(Json(body))
}

/// `GET ?file=` route for `resource`.
pub fn download_route(resource: Resource) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Query(query): Query<FileQuery>| async move {
            download_file(&state, resource, query).await
        },
    )
}

/// `DELETE ?file=` route for `resource`.
pub fn delete_route(resource: Resource) -> MethodRouter<AppState> {
    delete(
        move |State(state): State<AppState>, Query(query): Query<FileQuery>| async move {
            delete_file(&state, resource, query).await
        },
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
