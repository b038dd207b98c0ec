use anyhow::Result;
use tracing::warn;

use crate::config::GeminiSettings;
use crate::llm::GeminiClient;

#[derive(Clone)]
pub struct AppState {
    client: GeminiClient,
}

impl AppState {
    pub fn from_env() -> Result<Self> {
        let client = GeminiClient::from_env();

        let settings = client.settings();
        if settings.api_key.is_none() && settings.api_key_v2.is_none() {
            // Boot proceeds so /api/check-config can report the problem;
            // generation requests fail per-call until a key is configured.
            warn!("no Gemini API key configured");
        }

        Ok(Self { client })
    }

    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GeminiClient {
        &self.client
    }

    pub fn settings(&self) -> &GeminiSettings {
        self.client.settings()
    }
}
