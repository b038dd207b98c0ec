use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    AppState,
    config::{self, ModelInfo},
};

const MIN_KEY_LENGTH: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/check-config", get(check_config))
        .route("/api/test-key", get(test_key))
        .route("/api/list-models", get(list_models))
}

async fn check_config(State(state): State<AppState>) -> Json<ConfigStatus> {
    let key = state.settings().api_key.as_deref();
    Json(ConfigStatus {
        api_key_configured: key.is_some(),
        api_key_length: key.map_or(0, str::len),
    })
}

/// Shallow shape check so a misconfigured key is visible without burning a
/// real generation request.
async fn test_key(State(state): State<AppState>) -> Json<KeyCheck> {
    let Some(key) = state.settings().api_key.as_deref() else {
        return Json(KeyCheck {
            status: "error",
            message: "GEMINI_API_KEY is not set",
            key_length: None,
            key_prefix: None,
        });
    };

    let valid_format = key.starts_with("AI") && key.len() > MIN_KEY_LENGTH;
    Json(KeyCheck {
        status: if valid_format { "valid_format" } else { "invalid_format" },
        message: if valid_format {
            "API key has the correct format"
        } else {
            "API key does not match the expected format for Gemini API keys"
        },
        key_length: Some(key.len()),
        key_prefix: Some(format!("{}...", key.chars().take(2).collect::<String>())),
    })
}

async fn list_models() -> Json<ModelCatalogResponse> {
    Json(ModelCatalogResponse {
        status: "success",
        message: "Successfully retrieved models",
        models: config::model_catalog(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigStatus {
    api_key_configured: bool,
    api_key_length: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyCheck {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_prefix: Option<String>,
}

#[derive(Debug, Serialize)]
struct ModelCatalogResponse {
    status: &'static str,
    message: &'static str,
    models: Vec<ModelInfo>,
}
