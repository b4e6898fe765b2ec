//! Text generation configuration from TOML (`[generation]` section)

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};

/// Raw generation service configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl FileGenerationConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        if self.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::Empty {
                field: "generation.base_url",
            });
        }
        if self.model.trim().is_empty() {
            issues.push(ConfigValidationError::Empty {
                field: "generation.model",
            });
        }
        if self.timeout_seconds == 0 {
            issues.push(ConfigValidationError::ZeroValue {
                field: "generation.timeout_seconds",
            });
        }
        issues
    }
}
