use crate::api::errors::ApiError;
use crate::api::{run_blocking, AppState};
use crate::store::DocumentId;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub doc_ids: Vec<DocumentId>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected_documents: Vec<DocumentId>,
}

pub async fn select(
    State(state): State<AppState>,
    Json(payload): Json<SelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let selected = run_blocking(&state.config, move || engine.select(&payload.doc_ids)).await??;
    Ok(Json(SelectionResponse {
        selected_documents: selected,
    }))
}

pub async fn current(State(state): State<AppState>) -> impl IntoResponse {
    Json(SelectionResponse {
        selected_documents: state.engine.selection(),
    })
}

pub async fn clear(State(state): State<AppState>) -> impl IntoResponse {
    state.engine.clear_selection();
    Json(SelectionResponse {
        selected_documents: Vec::new(),
    })
}
