use std::env;

use serde::Serialize;

/// Models the service is willing to route requests to. Anything else is
/// rejected before a request is built.
pub const SUPPORTED_MODELS: &[&str] = &["gemini-1.5-pro", "gemini-1.5-flash", "gemini-2.0-flash"];

pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GENERATE_MODEL: &str = "gemini-1.5-pro";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment-backed settings for the Gemini backend. Keys are optional at
/// startup; their absence is reported per request, before any network call.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_v2: Option<String>,
}

impl GeminiSettings {
    pub fn from_env() -> Self {
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY_V1"))
            .ok()
            .filter(|key| !key.is_empty());
        let api_key_v2 = env::var("GEMINI_API_KEY_V2")
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            base_url,
            api_key,
            api_key_v2,
        }
    }

    /// Key for a given API version. v1 models are keyed separately from the
    /// v1beta ones.
    pub fn key_for_version(&self, version: &str) -> Option<&str> {
        match version {
            "v1" => self.api_key_v2.as_deref(),
            _ => self.api_key.as_deref(),
        }
    }
}

/// Strips the `models/` prefix some callers include in model names.
pub fn normalize_model(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

pub fn is_supported_model(name: &str) -> bool {
    SUPPORTED_MODELS.contains(&name)
}

/// Gemini 2.0 models are served from the v1 API; everything else from v1beta.
pub fn api_version_for(model: &str) -> &'static str {
    if model.contains("gemini-2.0") {
        "v1"
    } else {
        "v1beta"
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub display_name: &'static str,
    pub supported_methods: &'static [&'static str],
}

/// The models known to handle text generation reliably, in the shape the
/// model-listing endpoint reports.
pub fn model_catalog() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            name: "gemini-1.5-pro",
            version: "v1beta",
            display_name: "Gemini 1.5 Pro",
            supported_methods: &["generateContent"],
        },
        ModelInfo {
            name: "gemini-1.5-flash",
            version: "v1beta",
            display_name: "Gemini 1.5 Flash",
            supported_methods: &["generateContent"],
        },
        ModelInfo {
            name: "gemini-2.0-flash",
            version: "v1",
            display_name: "Gemini 2.0 Flash",
            supported_methods: &["generateContent"],
        },
    ]
}
