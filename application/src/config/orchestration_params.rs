//! Orchestration parameters for dialogue turns.
//!
//! [`OrchestrationParams`] groups the static parameters that control a
//! dialogue turn in [`DialogueController`](crate::use_cases::advance_dialogue::DialogueController):
//! timeouts, the context window and classifier thresholds.

use ideaforge_domain::ClassifierConfig;
use ideaforge_domain::dialogue::DEFAULT_MAX_TURNS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dialogue turn control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationParams {
    /// Budget for one agent, covering all of its generation calls.
    pub agent_timeout: Duration,
    /// Budget for the whole compose step. Agents still pending when it
    /// expires are recorded as timed out; finished results are kept.
    pub request_timeout: Option<Duration>,
    /// FIFO window of the dialogue context.
    pub max_context_turns: usize,
    pub classifier: ClassifierConfig,
    /// Ask the text generator when heuristics are ambiguous.
    pub classification_fallback: bool,
}

impl Default for OrchestrationParams {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(60),
            request_timeout: Some(Duration::from_secs(180)),
            max_context_turns: DEFAULT_MAX_TURNS,
            classifier: ClassifierConfig::default(),
            classification_fallback: true,
        }
    }
}

impl OrchestrationParams {
    // ==================== Builder Methods ====================

    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_context_turns(mut self, turns: usize) -> Self {
        self.max_context_turns = turns.max(1);
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_classification_fallback(mut self, enabled: bool) -> Self {
        self.classification_fallback = enabled;
        self
    }
}
