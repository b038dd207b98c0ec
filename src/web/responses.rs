use serde::Serialize;
use serde_json::Value;

/// Canonical success payload for the analysis endpoints.
#[derive(Debug, Serialize, Clone)]
pub struct AnalysisEnvelope {
    pub analysis: Value,
}

impl AnalysisEnvelope {
    pub fn new(analysis: Value) -> Self {
        Self { analysis }
    }
}

/// Success payload for the journal prompt endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct PromptsEnvelope {
    pub prompts: Vec<String>,
}

impl PromptsEnvelope {
    pub fn new(prompts: Vec<String>) -> Self {
        Self { prompts }
    }
}

/// Success payload for the free-form structured generation endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct GeneratedDataEnvelope {
    pub data: Value,
}

impl GeneratedDataEnvelope {
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}
