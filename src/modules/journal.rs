use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use crate::{
    AppState,
    analysis::{extract, prompts, reconcile},
    config::DEFAULT_ANALYSIS_MODEL,
    error::{ApiError, ApiResult},
    llm::{GenerationConfig, ModelRequest},
    web::responses::PromptsEnvelope,
};

const PROMPT_TEMPERATURE: f64 = 0.7;
const PROMPT_MAX_OUTPUT_TOKENS: u32 = 1024;
const DEFAULT_PROMPT_COUNT: u32 = 3;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/journal-prompt/generate", post(generate_prompts))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JournalPromptRequest {
    prompt_type: Option<String>,
    count: Option<u32>,
    topic: Option<String>,
    mood: Option<String>,
}

async fn generate_prompts(
    State(state): State<AppState>,
    Json(payload): Json<JournalPromptRequest>,
) -> ApiResult<Json<PromptsEnvelope>> {
    let prompt_type = payload
        .prompt_type
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::missing_data("Missing prompt type"))?;

    let prompt = prompts::journal_prompts(
        prompt_type,
        payload.count.unwrap_or(DEFAULT_PROMPT_COUNT),
        payload.topic.as_deref().unwrap_or(""),
        payload.mood.as_deref().unwrap_or(""),
    );

    let request = ModelRequest::new(
        DEFAULT_ANALYSIS_MODEL,
        prompt,
        GenerationConfig::new(PROMPT_TEMPERATURE, PROMPT_MAX_OUTPUT_TOKENS),
    );
    let text = state.client().generate(&request).await?;
    let prompts = reconcile::journal_prompts(extract::extract_prompts(&text));

    Ok(Json(PromptsEnvelope::new(prompts)))
}
