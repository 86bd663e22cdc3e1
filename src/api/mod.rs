pub mod errors;
mod routes_documents;
mod routes_qa;
mod routes_selection;

use crate::config::Config;
use crate::engine::Engine;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use errors::ApiError;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub config: Config,
}

pub fn router(engine: Engine) -> Router {
    let config = engine.config().clone();
    let body_limit = config.max_body_bytes;
    let state = AppState { engine, config };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(metrics))
        .route("/upload", post(routes_documents::upload))
        .route(
            "/select_documents",
            post(routes_selection::select)
                .get(routes_selection::current)
                .delete(routes_selection::clear),
        )
        .route("/qa", post(routes_qa::answer_question))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    tracing::debug!("root endpoint hit");
    Json(serde_json::json!({ "message": "Welcome to the Document Q&A API" }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    state.engine.health()
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state.engine.metrics_text()
}

async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let engine = state.engine.clone();
    let stats = run_blocking(&state.config, move || engine.stats()).await??;
    Ok(Json(stats))
}

/// Run engine work off the async executor, bounded by the request timeout.
/// A timed-out task is detached, not cancelled, so only use this for reads
/// and idempotent updates.
pub(crate) async fn run_blocking<T, F>(config: &Config, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "blocking task failed");
            Err(ApiError::internal("internal error"))
        }
        Err(_) => Err(ApiError::new(
            StatusCode::GATEWAY_TIMEOUT,
            "timeout",
            "request timed out",
        )),
    }
}

/// Run a non-idempotent engine write off the async executor. No timeout:
/// an ingest that outlived a 504 would still commit.
pub(crate) async fn run_write<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|err| {
        tracing::error!(error = %err, "blocking write failed");
        ApiError::internal("internal error")
    })
}
