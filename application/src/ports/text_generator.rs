//! Text generation port
//!
//! Defines the interface agents use to reach a generative text model.

use async_trait::async_trait;
use ideaforge_domain::Turn;
use thiserror::Error;

/// Errors reported by a text generation service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport failure, HTTP error, timeout or malformed reply
    #[error("Generation unavailable: {0}")]
    Unavailable(String),

    /// The service refused the request on content-policy grounds
    #[error("Generation rejected: {0}")]
    Rejected(String),
}

/// One generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub prompt: String,
    /// Prior dialogue turns, oldest first
    pub context: Vec<Turn>,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Vec<Turn>) -> Self {
        self.context = context;
        self
    }
}

/// Gateway to a text generation model
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
