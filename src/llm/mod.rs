use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::analysis::text_preview;
use crate::config::{self, GeminiSettings};
use crate::error::ApiError;

/// Generation knobs forwarded as the `generationConfig` payload section.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub fn new(temperature: f64, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            top_k: None,
            top_p: None,
            max_output_tokens,
        }
    }

    pub fn with_sampling(mut self, top_k: u32, top_p: f64) -> Self {
        self.top_k = Some(top_k);
        self.top_p = Some(top_p);
        self
    }
}

/// Safety threshold entry, forwarded to the API unmodified.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// The four standard harm categories at the block level the generic
/// generation endpoint sends.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    const CATEGORIES: &[&str] = &[
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ];

    CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: (*category).to_string(),
            threshold: "BLOCK_MEDIUM_AND_ABOVE".to_string(),
        })
        .collect()
}

/// A single text-generation call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub prompt: String,
    pub generation: GenerationConfig,
    pub safety: Option<Vec<SafetySetting>>,
}

impl ModelRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            generation,
            safety: None,
        }
    }

    pub fn with_safety_settings(mut self, safety: Vec<SafetySetting>) -> Self {
        self.safety = Some(safety);
        self
    }
}

/// Main entry point for calling the generative-language API.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// Build a client using environment variables.
    pub fn from_env() -> Self {
        Self::new(GeminiSettings::from_env())
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    /// Execute a generateContent call and return the model's raw reply text.
    pub async fn generate(&self, request: &ModelRequest) -> Result<String, ApiError> {
        let model = config::normalize_model(&request.model);
        if !config::is_supported_model(model) {
            return Err(ApiError::configuration(format!(
                "Model {model} is not supported. Please use one of: {}",
                config::SUPPORTED_MODELS.join(", ")
            )));
        }

        let version = config::api_version_for(model);
        let Some(api_key) = self.settings.key_for_version(version) else {
            return Err(ApiError::configuration(format!(
                "Missing API key for {model}. Please check your environment variables."
            )));
        };

        let url = format!(
            "{}/{}/models/{}:generateContent?key={}",
            self.settings.base_url, version, model, api_key
        );

        let mut payload = json!({
            "contents": [{ "parts": [{ "text": &request.prompt }] }],
            "generationConfig": &request.generation,
        });
        if let Some(safety) = &request.safety {
            payload["safetySettings"] = json!(safety);
        }

        let response = self.http.post(&url).json(&payload).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::upstream(upstream_detail(status, &response_text)));
        }

        let body: GenerateContentResponse = match serde_json::from_str(&response_text) {
            Ok(body) => body,
            Err(err) => {
                warn!(?err, body = %text_preview(&response_text, 500), "Gemini reply was not the expected shape");
                return Err(ApiError::EmptyResponse);
            }
        };

        match body.first_text() {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(ApiError::EmptyResponse),
        }
    }
}

/// Error detail for a non-2xx reply: JSON bodies are re-serialized whole,
/// anything else is truncated to a short preview.
fn upstream_detail(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), text_preview(body, 200)),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}
