//! Classify Idea use case
//!
//! Runs the keyword classifier and, when it cannot decide, optionally asks
//! the text generator to name the domain.

use crate::ports::text_generator::{GenerationRequest, TextGenerator};
use ideaforge_domain::classify::unknown_domain_warning;
use ideaforge_domain::{
    Classification, ClassifierConfig, DomainError, PromptTemplate, classify, parse_domain_answer,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ClassifyError {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, ClassifyError::Domain(DomainError::ClassificationAmbiguous))
    }
}

/// Use case for determining an idea's primary and supporting domains
pub struct ClassifyIdeaUseCase {
    fallback: Option<Arc<dyn TextGenerator>>,
    config: ClassifierConfig,
}

impl ClassifyIdeaUseCase {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            fallback: None,
            config,
        }
    }

    /// Ask `generator` when keyword scoring is ambiguous
    pub fn with_fallback(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.fallback = Some(generator);
        self
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub async fn execute(
        &self,
        text: &str,
        explicit_primary: Option<&str>,
        explicit_supporting: Option<&[String]>,
    ) -> Result<Classification, ClassifyError> {
        match classify(text, explicit_primary, explicit_supporting, &self.config) {
            Ok(classification) => {
                debug!(
                    primary = %classification.primary,
                    confidence = classification.confidence,
                    explicit = classification.explicit,
                    "Classified idea"
                );
                Ok(classification)
            }
            Err(DomainError::ClassificationAmbiguous) => {
                self.ask_generator(text, explicit_primary, explicit_supporting)
                    .await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ask_generator(
        &self,
        text: &str,
        explicit_primary: Option<&str>,
        explicit_supporting: Option<&[String]>,
    ) -> Result<Classification, ClassifyError> {
        let Some(generator) = &self.fallback else {
            return Err(DomainError::ClassificationAmbiguous.into());
        };

        let request = GenerationRequest::new(
            PromptTemplate::classification_system(),
            PromptTemplate::classification_prompt(text),
        );
        let answer = match generator.generate(&request).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Classification fallback failed: {}", e);
                return Err(DomainError::ClassificationAmbiguous.into());
            }
        };

        let Some(domain) = parse_domain_answer(&answer) else {
            info!(answer = %answer.trim(), "Classification fallback gave no domain");
            return Err(DomainError::ClassificationAmbiguous.into());
        };

        info!(primary = %domain, "Classification fallback chose domain");
        let mut classification = classify(
            text,
            Some(domain.as_str()),
            explicit_supporting,
            &self.config,
        )?;
        classification.explicit = false;
        if let Some(id) = explicit_primary {
            classification.warnings.insert(0, unknown_domain_warning(id));
        }
        Ok(classification)
    }
}
