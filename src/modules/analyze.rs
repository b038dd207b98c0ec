use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    analysis::{AnalysisKind, extract, prompts, reconcile, scoring},
    config::DEFAULT_ANALYSIS_MODEL,
    error::{ApiError, ApiResult},
    llm::{GenerationConfig, ModelRequest},
    web::responses::AnalysisEnvelope,
};

const ANALYSIS_TEMPERATURE: f64 = 0.2;
const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 1024;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze-data", post(analyze_data))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AnalyzeRequest {
    user_data: Option<Value>,
    analysis_type: Option<String>,
}

async fn analyze_data(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let user_data = match payload.user_data {
        Some(value) if !value.is_null() => value,
        _ => return Err(ApiError::missing_data("Missing required data")),
    };
    let analysis_type = payload
        .analysis_type
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::missing_data("Missing required data"))?;

    let kind = AnalysisKind::from_name(analysis_type);
    let analysis = if kind == AnalysisKind::ImmediateMood {
        let answers: scoring::QuestionnaireAnswers =
            serde_json::from_value(user_data).unwrap_or_default();
        let score = scoring::compute_score(&answers);
        let emoji = scoring::emoji_for_score(score);

        let text = run_model(&state, prompts::immediate_mood(&answers, score, emoji)).await?;
        reconcile::immediate_mood(extract::extract_json(&text), score, emoji)
    } else {
        let text = run_model(&state, prompts::for_analysis_kind(kind, &user_data)).await?;
        reconcile::analysis(kind, extract::extract_json(&text))
    };

    Ok(Json(AnalysisEnvelope::new(analysis)))
}

async fn run_model(state: &AppState, prompt: String) -> Result<String, ApiError> {
    let request = ModelRequest::new(
        DEFAULT_ANALYSIS_MODEL,
        prompt,
        GenerationConfig::new(ANALYSIS_TEMPERATURE, ANALYSIS_MAX_OUTPUT_TOKENS),
    );
    state.client().generate(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeminiSettings;
    use crate::llm::GeminiClient;
    use serde_json::json;

    fn test_state(base_url: &str) -> AppState {
        let settings = GeminiSettings {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            api_key_v2: Some("test-key".to_string()),
        };
        AppState::new(GeminiClient::new(settings))
    }

    fn reply_with(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    #[tokio::test]
    async fn missing_user_data_is_rejected() {
        let state = test_state("http://127.0.0.1:9");
        let payload = AnalyzeRequest {
            user_data: None,
            analysis_type: Some("immediate-mood".to_string()),
        };

        let err = analyze_data(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingData(_)));
        assert_eq!(err.to_string(), "Missing required data");
    }

    #[tokio::test]
    async fn missing_analysis_type_is_rejected() {
        let state = test_state("http://127.0.0.1:9");

        for analysis_type in [None, Some(String::new())] {
            let payload = AnalyzeRequest {
                user_data: Some(json!({ "feeling": 5 })),
                analysis_type,
            };
            let err = analyze_data(State(state.clone()), Json(payload))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Missing required data");
        }
    }

    #[tokio::test]
    async fn immediate_mood_keeps_the_computed_score() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_with(
                r#"{"score": 9, "emoji": "happy", "insights": "rough patch", "suggestions": ["x"]}"#,
            ))
            .create_async()
            .await;

        let state = test_state(&server.url());
        let payload = AnalyzeRequest {
            user_data: Some(json!({
                "feeling": 2,
                "moodWord": "devastated",
                "affectingFactor": "stress, debt, conflict",
            })),
            analysis_type: Some("immediate-mood".to_string()),
        };
        let Json(envelope) = analyze_data(State(state), Json(payload)).await.unwrap();

        assert_eq!(envelope.analysis["score"], 1);
        assert_eq!(envelope.analysis["emoji"], "sad");
        assert_eq!(envelope.analysis["insights"], "rough patch");
        assert!(envelope.analysis.get("suggestions").is_none());
    }

    #[tokio::test]
    async fn prose_replies_fall_back_without_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_with("I could not find anything useful to return here."))
            .create_async()
            .await;

        let state = test_state(&server.url());
        let payload = AnalyzeRequest {
            user_data: Some(json!([{ "score": 3 }])),
            analysis_type: Some("mood-patterns".to_string()),
        };
        let Json(envelope) = analyze_data(State(state), Json(payload)).await.unwrap();

        assert_eq!(envelope.analysis["summary"], "We analyzed your mood tracking data.");
        assert!(envelope.analysis["patterns"].is_array());
    }

    #[tokio::test]
    async fn upstream_failures_propagate() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "quota exhausted"}}"#)
            .create_async()
            .await;

        let state = test_state(&server.url());
        let payload = AnalyzeRequest {
            user_data: Some(json!({ "feeling": 5 })),
            analysis_type: Some("immediate-mood".to_string()),
        };

        let err = analyze_data(State(state), Json(payload)).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
