use crate::embedding::EmbeddingError;
use crate::engine::{EngineError, SelectionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_argument", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SelectionError> for ApiError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::EmptySelection => {
                Self::new(StatusCode::BAD_REQUEST, "empty_selection", "No document ids given")
            }
            SelectionError::NoMatch => {
                Self::new(StatusCode::NOT_FOUND, "not_found", "Documents not found")
            }
            SelectionError::Store(store) => {
                tracing::error!(error = %store, "selection lookup failed");
                Self::internal("selection failed")
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EmptyQuestion => Self::bad_request("Question cannot be empty."),
            EngineError::Embedding(EmbeddingError::EmptyInput) => {
                Self::bad_request("document is empty")
            }
            EngineError::Embedding(other) => {
                tracing::error!(error = %other, "embedding failed");
                Self::internal("Error generating embedding.")
            }
            EngineError::Vector(vector) => Self::bad_request(vector.to_string()),
            EngineError::Codec(codec) => Self::bad_request(codec.to_string()),
            EngineError::Selection(selection) => selection.into(),
            other => {
                tracing::error!(error = %other, "engine operation failed");
                Self::internal("internal error")
            }
        }
    }
}
