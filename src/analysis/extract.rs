use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap());
static FENCED_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").unwrap());

/// Raised when no strategy produced a JSON object; carries the raw reply so
/// callers can log it or hand it back for diagnostics.
#[derive(Debug, Error)]
#[error("no JSON object found in model reply")]
pub struct ExtractError {
    raw: String,
}

impl ExtractError {
    fn new(raw: &str) -> Self {
        Self { raw: raw.to_string() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn into_raw(self) -> String {
        self.raw
    }
}

/// Pulls a JSON object out of a free-form model reply. Strategies run in
/// order until one parses to an object: a ```json fence, any fence, the span
/// from the first `{` to the last `}`, then the whole reply.
pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    for candidate in candidates(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate.trim()) {
            if value.is_object() {
                return Ok(value);
            }
        }
    }
    Err(ExtractError::new(raw))
}

fn candidates(raw: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    if let Some(body) = FENCED_JSON.captures(raw).and_then(|caps| caps.get(1)) {
        spans.push(body.as_str());
    }
    if let Some(body) = FENCED_ANY.captures(raw).and_then(|caps| caps.get(1)) {
        spans.push(body.as_str());
    }
    if let (Some(open), Some(close)) = (raw.find('{'), raw.rfind('}')) {
        if open < close {
            spans.push(&raw[open..=close]);
        }
    }
    spans.push(raw);
    spans
}

/// Prompt-list recovery for the journal endpoint. When no object with a
/// usable `prompts` array can be extracted, falls back to scanning the reply
/// line by line.
pub fn extract_prompts(raw: &str) -> Result<Vec<String>, ExtractError> {
    if let Ok(value) = extract_json(raw) {
        if let Some(prompts) = prompts_from_value(&value) {
            return Ok(prompts);
        }
    }

    let salvaged = salvage_prompt_lines(raw);
    if salvaged.is_empty() {
        Err(ExtractError::new(raw))
    } else {
        Ok(salvaged)
    }
}

fn prompts_from_value(value: &Value) -> Option<Vec<String>> {
    let items = value.get("prompts")?.as_array()?;
    let prompts: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(|prompt| prompt.trim().to_string())
        .filter(|prompt| !prompt.is_empty())
        .collect();
    (!prompts.is_empty()).then_some(prompts)
}

// Last resort: keep lines that look like list entries or mention "prompt",
// strip markers and quoting, drop anything 5 chars or shorter. Lossy; a
// stray line that happens to match survives.
fn salvage_prompt_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed.starts_with('-')
                || trimmed.starts_with('*')
                || trimmed.starts_with('"')
                || trimmed.chars().next().is_some_and(|c| c.is_ascii_digit())
                || trimmed.to_lowercase().contains("prompt")
        })
        .map(strip_line_decoration)
        .filter(|line| line.chars().count() > 5)
        .collect()
}

fn strip_line_decoration(line: &str) -> String {
    line.trim()
        .trim_start_matches(|c: char| {
            c == '-' || c == '*' || c == '.' || c == ')' || c == ' ' || c.is_ascii_digit()
        })
        .trim_matches(|c: char| c == '"' || c == '\'' || c == ',' || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_json_block_wins() {
        let raw = "Here is the analysis:\n```json\n{\"summary\": \"calm week\"}\n```\nHope it helps!";
        let value = extract_json(raw).unwrap();
        assert_eq!(value["summary"], "calm week");
    }

    #[test]
    fn unlabeled_fences_also_parse() {
        let raw = "```\n{\"score\": 4}\n```";
        assert_eq!(extract_json(raw).unwrap()["score"], 4);
    }

    #[test]
    fn brace_span_recovers_wrapped_objects() {
        let raw = "Sure! {\"insights\": \"steady\", \"summary\": \"ok\"} Let me know.";
        assert_eq!(extract_json(raw).unwrap()["insights"], "steady");
    }

    #[test]
    fn bare_json_parses_directly() {
        let value = extract_json("  {\"emoji\": \"happy\"}  ").unwrap();
        assert_eq!(value["emoji"], "happy");
    }

    #[test]
    fn unparseable_fences_fall_through_to_the_brace_span() {
        let raw = "```json\nnot json at all\n```\ntrailing {\"summary\": \"saved\"}";
        assert_eq!(extract_json(raw).unwrap()["summary"], "saved");
    }

    #[test]
    fn prose_replies_error_and_keep_the_raw_text() {
        let err = extract_json("I am sorry, I cannot help with that.").unwrap_err();
        assert!(err.raw().contains("cannot help"));
    }

    #[test]
    fn top_level_arrays_are_not_accepted() {
        assert!(extract_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn prompts_come_from_a_parsed_object() {
        let raw = "```json\n{\"prompts\": [\"What went well today?\", \"Who supported you?\"]}\n```";
        let prompts = extract_prompts(raw).unwrap();
        assert_eq!(prompts, vec!["What went well today?", "Who supported you?"]);
    }

    #[test]
    fn line_heuristic_salvages_listed_prompts() {
        let raw = "Sure, here you go:\n1. \"What made you smile today?\"\n2. \"What drained your energy?\"\n- Short\n";
        let prompts = extract_prompts(raw).unwrap();
        assert!(prompts.contains(&"What made you smile today?".to_string()));
        assert!(prompts.contains(&"What drained your energy?".to_string()));
        // five chars or fewer after stripping is discarded
        assert!(!prompts.iter().any(|p| p == "Short"));
    }

    #[test]
    fn empty_prompt_arrays_fall_through_to_the_line_scan() {
        let prompts = extract_prompts("{\"prompts\": []}").unwrap();
        assert_eq!(prompts, vec!["{\"prompts\": []}"]);
    }

    #[test]
    fn prompt_extraction_fails_on_plain_prose() {
        assert!(extract_prompts("The weather is nice.\nNothing else.").is_err());
    }
}
