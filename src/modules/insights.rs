use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState,
    analysis::{extract, prompts, reconcile, stats},
    config::DEFAULT_ANALYSIS_MODEL,
    error::{ApiError, ApiResult},
    llm::{GenerationConfig, ModelRequest},
    web::responses::AnalysisEnvelope,
};

const INSIGHTS_TEMPERATURE: f64 = 0.2;
const INSIGHTS_MAX_OUTPUT_TOKENS: u32 = 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/insights/weekly", post(weekly_insights))
        .route("/api/insights/monthly", post(monthly_insights))
        .route("/api/insights/overview", post(overview_insights))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WeeklyInsightsRequest {
    mood_data: Option<Vec<Value>>,
    journal_data: Option<Vec<Value>>,
    week_start: Option<String>,
    week_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MonthlyInsightsRequest {
    mood_data: Option<Vec<Value>>,
    journal_data: Option<Vec<Value>>,
    month_start: Option<String>,
    month_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OverviewInsightsRequest {
    mood_data: Option<Vec<Value>>,
    journal_data: Option<Vec<Value>>,
}

async fn weekly_insights(
    State(state): State<AppState>,
    Json(payload): Json<WeeklyInsightsRequest>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let (mood, journal) = require_history(payload.mood_data, payload.journal_data)?;
    let week_start = parse_bound(payload.week_start.as_deref())?;
    let week_end = parse_bound(payload.week_end.as_deref())?;

    let weekly_mood = stats::filter_range(&mood, week_start, week_end);
    let weekly_journal = stats::filter_range(&journal, week_start, week_end);
    let breakdown = stats::day_breakdown(week_start, &weekly_mood, &weekly_journal);

    let prompt =
        prompts::weekly_insights(week_start, week_end, &weekly_mood, &weekly_journal, &breakdown);
    let text = run_model(&state, prompt).await?;
    let analysis = reconcile::weekly(extract::extract_json(&text), &breakdown);

    Ok(Json(AnalysisEnvelope::new(analysis)))
}

async fn monthly_insights(
    State(state): State<AppState>,
    Json(payload): Json<MonthlyInsightsRequest>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let (mood, journal) = require_history(payload.mood_data, payload.journal_data)?;
    let month_start = parse_bound(payload.month_start.as_deref())?;
    let month_end = parse_bound(payload.month_end.as_deref())?;

    let monthly_mood = stats::filter_range(&mood, month_start, month_end);
    let monthly_journal = stats::filter_range(&journal, month_start, month_end);
    let breakdown = stats::weekly_breakdown(month_start, month_end, &monthly_mood, &monthly_journal);
    let monthly_stats = stats::overall_stats(&monthly_mood, &monthly_journal);

    let prompt = prompts::monthly_insights(
        month_start,
        &monthly_mood,
        &monthly_journal,
        &breakdown,
        &monthly_stats,
    );
    let text = run_model(&state, prompt).await?;
    let analysis = reconcile::monthly(extract::extract_json(&text), &breakdown, &monthly_stats);

    Ok(Json(AnalysisEnvelope::new(analysis)))
}

async fn overview_insights(
    State(state): State<AppState>,
    Json(payload): Json<OverviewInsightsRequest>,
) -> ApiResult<Json<AnalysisEnvelope>> {
    let (mood, journal) = require_history(payload.mood_data, payload.journal_data)?;

    let overall = stats::overall_stats(&mood, &journal);
    let words = stats::mood_words(&mood);
    let themes = stats::journal_themes(&journal);

    let prompt = prompts::overview_insights(&mood, &journal, &overall, &words, &themes);
    let text = run_model(&state, prompt).await?;
    let analysis = reconcile::overview(extract::extract_json(&text), &overall);

    Ok(Json(AnalysisEnvelope::new(analysis)))
}

// At least one history array must be present; a single missing array is
// treated as empty rather than an error.
fn require_history(
    mood: Option<Vec<Value>>,
    journal: Option<Vec<Value>>,
) -> ApiResult<(Vec<Value>, Vec<Value>)> {
    if mood.is_none() && journal.is_none() {
        return Err(ApiError::missing_data("Missing mood or journal data"));
    }
    Ok((mood.unwrap_or_default(), journal.unwrap_or_default()))
}

fn parse_bound(raw: Option<&str>) -> ApiResult<DateTime<Utc>> {
    raw.and_then(stats::parse_instant)
        .ok_or_else(|| ApiError::missing_data("Invalid date range"))
}

async fn run_model(state: &AppState, prompt: String) -> Result<String, ApiError> {
    let request = ModelRequest::new(
        DEFAULT_ANALYSIS_MODEL,
        prompt,
        GenerationConfig::new(INSIGHTS_TEMPERATURE, INSIGHTS_MAX_OUTPUT_TOKENS),
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

    async fn mock_reply(server: &mut mockito::ServerGuard, text: &str) -> mockito::Mock {
        server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply_with(text))
            .create_async()
            .await
    }

    #[tokio::test]
    async fn missing_both_history_arrays_is_rejected() {
        let state = test_state("http://127.0.0.1:9");
        let err = weekly_insights(State(state), Json(WeeklyInsightsRequest::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingData(_)));
        assert_eq!(err.to_string(), "Missing mood or journal data");
    }

    #[tokio::test]
    async fn unparseable_range_bounds_are_rejected() {
        let state = test_state("http://127.0.0.1:9");
        let payload = WeeklyInsightsRequest {
            mood_data: Some(vec![]),
            journal_data: Some(vec![]),
            week_start: Some("not a date".to_string()),
            week_end: Some("2024-05-12".to_string()),
        };
        let err = weekly_insights(State(state), Json(payload)).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid date range");
    }

    #[tokio::test]
    async fn weekly_breakdown_is_merged_over_the_model_reply() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_reply(
            &mut server,
            r#"{"summary": "good week", "moodTrend": "upward", "dayBreakdown": "junk"}"#,
        )
        .await;

        let state = test_state(&server.url());
        let payload = WeeklyInsightsRequest {
            mood_data: Some(vec![
                json!({ "timestamp": "2024-05-06T10:00:00Z", "score": 4 }),
                // exactly at the end bound, excluded by the half-open range
                json!({ "timestamp": "2024-05-12T00:00:00Z", "score": 1 }),
            ]),
            journal_data: None,
            week_start: Some("2024-05-05".to_string()),
            week_end: Some("2024-05-12".to_string()),
        };
        let Json(envelope) = weekly_insights(State(state), Json(payload)).await.unwrap();

        assert_eq!(envelope.analysis["summary"], "good week");
        let breakdown = envelope.analysis["dayBreakdown"].as_array().unwrap();
        assert_eq!(breakdown.len(), 7);
        assert_eq!(breakdown[1]["dayOfWeek"], "Monday");
        assert_eq!(breakdown[1]["moodEntries"], 1);
        let counted: u64 = breakdown
            .iter()
            .map(|day| day["moodEntries"].as_u64().unwrap())
            .sum();
        assert_eq!(counted, 1);
    }

    #[tokio::test]
    async fn monthly_fallback_still_reports_stats() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_reply(&mut server, "Nothing structured in this reply.").await;

        let state = test_state(&server.url());
        let payload = MonthlyInsightsRequest {
            mood_data: Some(vec![
                json!({ "timestamp": "2024-05-02T08:00:00Z", "score": 2 }),
                json!({ "timestamp": "2024-05-20T08:00:00Z", "score": 4 }),
            ]),
            journal_data: Some(vec![]),
            month_start: Some("2024-05-01".to_string()),
            month_end: Some("2024-06-01".to_string()),
        };
        let Json(envelope) = monthly_insights(State(state), Json(payload)).await.unwrap();

        assert_eq!(
            envelope.analysis["summary"],
            "We analyzed your mood and journal data for the month."
        );
        assert_eq!(envelope.analysis["monthlyStats"]["totalMoodEntries"], 2);
        assert_eq!(envelope.analysis["monthlyStats"]["averageMood"], 3.0);
        assert_eq!(envelope.analysis["weeklyBreakdown"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn overview_merges_overall_stats() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_reply(
            &mut server,
            r#"{"summary": "steady", "stats": {"planted": true}}"#,
        )
        .await;

        let state = test_state(&server.url());
        let payload = OverviewInsightsRequest {
            mood_data: Some(vec![json!({ "moodWord": "calm", "score": 4 })]),
            journal_data: Some(vec![json!({ "title": "A good day" })]),
        };
        let Json(envelope) = overview_insights(State(state), Json(payload)).await.unwrap();

        assert_eq!(envelope.analysis["summary"], "steady");
        assert_eq!(envelope.analysis["stats"]["totalMoodEntries"], 1);
        assert_eq!(envelope.analysis["stats"]["highestMood"], 4.0);
    }
}
