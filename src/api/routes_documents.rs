use crate::api::errors::ApiError;
use crate::api::{run_write, AppState};
use crate::store::DocumentId;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub document_id: DocumentId,
}

/// Store a UTF-8 text document sent as the raw request body.
pub async fn upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let text = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::bad_request("document must be UTF-8 text"))?;
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("document is empty"));
    }

    let engine = state.engine.clone();
    let document_id = run_write(move || engine.ingest_text(&text)).await??;
    Ok(Json(UploadResponse {
        message: "Document uploaded successfully",
        document_id,
    }))
}
