//! Orchestration configuration from TOML (`[orchestration]` section)

use super::ConfigValidationError;
use ideaforge_application::OrchestrationParams;
use ideaforge_domain::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw orchestration configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Per-agent timeout
    pub agent_timeout_seconds: u64,
    /// Deadline for the whole fan-out; unset means no deadline
    pub request_timeout_seconds: Option<u64>,
    /// Dialogue turns kept per idea
    pub max_context_turns: usize,
    pub min_confidence: f64,
    pub supporting_min_confidence: f64,
    pub infer_supporting: bool,
    /// Ask the text generator when keyword classification is ambiguous
    pub classification_fallback: bool,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        let params = OrchestrationParams::default();
        Self {
            agent_timeout_seconds: params.agent_timeout.as_secs(),
            request_timeout_seconds: params.request_timeout.map(|t| t.as_secs()),
            max_context_turns: params.max_context_turns,
            min_confidence: params.classifier.min_confidence,
            supporting_min_confidence: params.classifier.supporting_min_confidence,
            infer_supporting: params.classifier.infer_supporting,
            classification_fallback: params.classification_fallback,
        }
    }
}

impl FileOrchestrationConfig {
    /// Convert to application-layer parameters
    pub fn to_params(&self) -> OrchestrationParams {
        OrchestrationParams::default()
            .with_agent_timeout(Duration::from_secs(self.agent_timeout_seconds))
            .with_request_timeout(self.request_timeout_seconds.map(Duration::from_secs))
            .with_max_context_turns(self.max_context_turns)
            .with_classifier(ClassifierConfig {
                min_confidence: self.min_confidence,
                supporting_min_confidence: self.supporting_min_confidence,
                infer_supporting: self.infer_supporting,
            })
            .with_classification_fallback(self.classification_fallback)
    }

    pub(super) fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();
        if self.agent_timeout_seconds == 0 {
            issues.push(ConfigValidationError::ZeroValue {
                field: "orchestration.agent_timeout_seconds",
            });
        }
        if self.request_timeout_seconds == Some(0) {
            issues.push(ConfigValidationError::ZeroValue {
                field: "orchestration.request_timeout_seconds",
            });
        }
        if self.max_context_turns == 0 {
            issues.push(ConfigValidationError::ZeroValue {
                field: "orchestration.max_context_turns",
            });
        }
        for (field, value) in [
            ("orchestration.min_confidence", self.min_confidence),
            (
                "orchestration.supporting_min_confidence",
                self.supporting_min_confidence,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigValidationError::OutOfRange { field, value });
            }
        }
        issues
    }
}
