use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use super::AnalysisKind;
use super::extract::ExtractError;
use super::stats::{DayBucket, OverallStats, WeekBucket};
use super::text_preview;

const RAW_PREVIEW_CHARS: usize = 200;

const DEFAULT_PROMPTS: &[&str] = &[
    "How did you feel overall today, and what influenced your mood the most?",
    "What was the most challenging part of your day, and how did you handle it?",
    "What is one small win or positive moment you can appreciate from today?",
];

/// Immediate-mood result. The locally computed score and emoji always win
/// over whatever the model replied.
pub fn immediate_mood(extracted: Result<Value, ExtractError>, score: u8, emoji: &str) -> Value {
    match extracted {
        Ok(mut value) => {
            if let Some(map) = value.as_object_mut() {
                map.insert("score".to_string(), json!(score));
                map.insert("emoji".to_string(), json!(emoji));
                map.remove("suggestions");
                map.remove("recommendations");
            }
            value
        }
        Err(err) => {
            log_fallback("immediate-mood", &err);
            json!({
                "score": score,
                "emoji": emoji,
                "insights": "Based on your responses, I've analyzed your mood.",
            })
        }
    }
}

/// Result for the non-immediate questionnaire analysis kinds.
pub fn analysis(kind: AnalysisKind, extracted: Result<Value, ExtractError>) -> Value {
    match extracted {
        Ok(mut value) => {
            strip_advice_fields(&mut value);
            value
        }
        Err(err) => {
            log_fallback(kind.as_str(), &err);
            analysis_fallback(kind)
        }
    }
}

/// Weekly insights. The deterministic day breakdown always lands in the
/// result, replacing any model-supplied field of the same name.
pub fn weekly(extracted: Result<Value, ExtractError>, day_breakdown: &[DayBucket]) -> Value {
    let mut value = match extracted {
        Ok(mut value) => {
            strip_advice_fields(&mut value);
            value
        }
        Err(err) => {
            log_fallback("weekly", &err);
            json!({
                "summary": "We analyzed your mood and journal data for the week.",
                "patterns": ["No clear patterns could be identified with the available data."],
                "insights": "Continue tracking your mood and journaling to get more detailed insights.",
                "moodTrend": "Not enough data to determine a trend.",
            })
        }
    };
    merge_field(&mut value, "dayBreakdown", day_breakdown);
    value
}

pub fn monthly(
    extracted: Result<Value, ExtractError>,
    weekly_breakdown: &[WeekBucket],
    monthly_stats: &OverallStats,
) -> Value {
    let mut value = match extracted {
        Ok(mut value) => {
            strip_advice_fields(&mut value);
            value
        }
        Err(err) => {
            log_fallback("monthly", &err);
            json!({
                "summary": "We analyzed your mood and journal data for the month.",
                "patterns": ["No clear patterns could be identified with the available data."],
                "insights": "Continue tracking your mood and journaling to get more detailed insights.",
                "progressMetrics": "Not enough data to assess progress.",
                "trajectory": "More data needed to determine trajectory.",
            })
        }
    };
    merge_field(&mut value, "weeklyBreakdown", weekly_breakdown);
    merge_field(&mut value, "monthlyStats", monthly_stats);
    value
}

pub fn overview(extracted: Result<Value, ExtractError>, overall: &OverallStats) -> Value {
    let mut value = match extracted {
        Ok(mut value) => {
            strip_advice_fields(&mut value);
            value
        }
        Err(err) => {
            log_fallback("overview", &err);
            json!({
                "summary": "We analyzed your mood and journal data.",
                "patterns": ["No clear patterns could be identified with the available data."],
                "insights": "Continue tracking your mood and journaling to get more detailed insights.",
                "moodTrend": "Not enough data to determine a trend.",
                "journalThemes": "More journal entries needed to identify themes.",
                "correlations": "More data needed to identify correlations.",
            })
        }
    };
    merge_field(&mut value, "stats", overall);
    value
}

/// Journal prompts from the extractor, or the built-in trio when the reply
/// was unusable.
pub fn journal_prompts(extracted: Result<Vec<String>, ExtractError>) -> Vec<String> {
    match extracted {
        Ok(prompts) => prompts,
        Err(err) => {
            log_fallback("journal-prompt", &err);
            DEFAULT_PROMPTS.iter().map(|prompt| prompt.to_string()).collect()
        }
    }
}

fn analysis_fallback(kind: AnalysisKind) -> Value {
    match kind {
        AnalysisKind::MoodPatterns => json!({
            "patterns": ["No clear patterns could be identified with the available data."],
            "insights": "Continue tracking your mood to get more detailed insights.",
            "summary": "We analyzed your mood tracking data.",
        }),
        AnalysisKind::ActivityImpact => json!({
            "positiveActivities": [],
            "negativeActivities": [],
            "neutralActivities": [],
            "summary": "Continue tracking your activities to see how they affect your mood.",
        }),
        AnalysisKind::ProgressTracking => json!({
            "progressMetrics": "Not enough data to assess progress.",
            "improvements": [],
            "challenges": [],
            "trajectory": "More data needed to determine trajectory.",
            "summary": "Continue tracking to see your progress over time.",
        }),
        AnalysisKind::ImmediateMood | AnalysisKind::General => json!({
            "insights": "Continue tracking your mood and journaling to get more detailed insights.",
            "summary": "We analyzed your mental wellbeing data.",
        }),
    }
}

// Advice-style output is a product no-go; drop it wherever the model put it.
fn strip_advice_fields(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        map.remove("suggestions");
        map.remove("recommendations");
    }
}

fn merge_field<T: Serialize + ?Sized>(value: &mut Value, key: &str, data: &T) {
    if let (Some(map), Ok(serialized)) = (value.as_object_mut(), serde_json::to_value(data)) {
        map.insert(key.to_string(), serialized);
    }
}

fn log_fallback(kind: &str, err: &ExtractError) {
    error!(kind, raw = %text_preview(err.raw(), RAW_PREVIEW_CHARS), "model reply was not JSON, returning fallback");
}
