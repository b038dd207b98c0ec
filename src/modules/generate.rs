use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::{
    AppState,
    analysis::extract,
    config::DEFAULT_GENERATE_MODEL,
    error::{ApiError, ApiResult},
    llm::{GenerationConfig, ModelRequest, default_safety_settings},
    web::responses::GeneratedDataEnvelope,
};

const GENERATE_TEMPERATURE: f64 = 0.2;
const GENERATE_MAX_OUTPUT_TOKENS: u32 = 1024;
const GENERATE_TOP_K: u32 = 40;
const GENERATE_TOP_P: f64 = 0.95;

const JSON_INSTRUCTION: &str = "\n\nPlease provide your response as a valid JSON object. Format your response as a JSON object without any explanatory text.";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate-data", post(generate_data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateDataRequest {
    prompt: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

/// Free-form structured generation. Unlike the analysis endpoints this one
/// has no fallback object: an unparseable reply surfaces as an error that
/// carries the raw text.
async fn generate_data(
    State(state): State<AppState>,
    Json(payload): Json<GenerateDataRequest>,
) -> ApiResult<Json<GeneratedDataEnvelope>> {
    let prompt = payload
        .prompt
        .as_deref()
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| ApiError::missing_data("Missing prompt"))?;

    let model = payload
        .model
        .as_deref()
        .filter(|model| !model.is_empty())
        .unwrap_or(DEFAULT_GENERATE_MODEL);

    let generation = GenerationConfig::new(
        payload.temperature.unwrap_or(GENERATE_TEMPERATURE),
        payload.max_tokens.unwrap_or(GENERATE_MAX_OUTPUT_TOKENS),
    )
    .with_sampling(GENERATE_TOP_K, GENERATE_TOP_P);

    let request = ModelRequest::new(model, format!("{prompt}{JSON_INSTRUCTION}"), generation)
        .with_safety_settings(default_safety_settings());

    let text = state.client().generate(&request).await?;
    let data = extract::extract_json(&text).map_err(|err| ApiError::Parse { raw: err.into_raw() })?;

    Ok(Json(GeneratedDataEnvelope::new(data)))
}
