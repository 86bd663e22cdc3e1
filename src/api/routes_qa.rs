use crate::api::errors::ApiError;
use crate::api::{run_blocking, AppState};
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub question: String,
    #[serde(default)]
    pub k: Option<usize>,
}

pub async fn answer_question(
    State(state): State<AppState>,
    Json(payload): Json<QaRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::bad_request("Question cannot be empty."));
    }
    if payload.question.len() > state.config.max_question_len {
        return Err(ApiError::bad_request("question too long"));
    }
    let k = payload.k.unwrap_or(state.config.default_k);
    if k == 0 || k > state.config.max_k {
        return Err(ApiError::bad_request("k invalid"));
    }

    let engine = state.engine.clone();
    let question = payload.question;
    let answer = run_blocking(&state.config, move || engine.ask_with_k(&question, k)).await??;
    Ok(Json(answer))
}
