//! Upload endpoints: receive image batches, serve them back, delete them.

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::{errors::ApiError, state::AppState};

/// POST /api/upload — store a multipart batch of images, all or nothing.
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let multipart = multipart.map_err(|rej| ApiError::MalformedRequest(rej.body_text()))?;

    let files = state.pipeline.process(multipart).await?;
    info!(count = files.len(), "stored uploaded files");

    Ok(Json(json!({
        "success": true,
        "message": format!("{} file(s) uploaded successfully", files.len()),
        "files": files,
    })))
}

/// DELETE /api/upload/{filename} — remove one stored file by storage name.
pub async fn delete_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.storage.delete(&filename).await?;
    info!(filename = %filename, "deleted uploaded file");

    Ok(Json(json!({
        "success": true,
        "message": "File deleted successfully",
    })))
}

/// GET /uploads/{filename} — stream a stored file back to the client.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (file, len, content_type) = state.storage.open(&filename).await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok(response)
}
