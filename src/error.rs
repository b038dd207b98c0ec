use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures surfaced over HTTP as `{ "error": ... }` bodies. Extraction
/// failures on the analysis endpoints never reach this type; the reconciler
/// absorbs them into canned fallbacks.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload is missing a required field.
    #[error("{0}")]
    MissingData(String),
    /// The service side is misconfigured: missing API key, unsupported model.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Transport failure or a non-2xx reply from the Gemini API.
    #[error("Gemini API error: {0}")]
    Upstream(String),
    /// A 2xx reply with no usable candidate text.
    #[error("Empty response from Gemini API")]
    EmptyResponse,
    /// Model output that should have been JSON was not. Only the generic
    /// generation endpoint surfaces this; it has no fallback shape.
    #[error("Failed to parse JSON from model response")]
    Parse { raw: String },
}

impl ApiError {
    pub fn missing_data(message: impl Into<String>) -> Self {
        Self::MissingData(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream(detail.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingData(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_)
            | ApiError::Upstream(_)
            | ApiError::EmptyResponse
            | ApiError::Parse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "rawText", skip_serializing_if = "Option::is_none")]
    raw_text: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let raw_text = match self {
            ApiError::Parse { ref raw } => Some(raw.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            raw_text,
        };
        (status, Json(body)).into_response()
    }
}
