//! Agent capability shared by every domain expert.
//!
//! An agent is stateless between invocations: everything it knows about the
//! dialogue arrives in the `context` argument. The capability set is
//! implemented once here on top of [`AgentCore`]; concrete agents decide
//! only their limits and when a diagram is warranted.

use crate::ports::text_generator::{GenerationError, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use ideaforge_domain::{
    AgentResult, DiagramSpec, Domain, Idea, ImplementationStep, PromptTemplate, Turn,
    parse_analysis, parse_diagram, parse_steps,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while an agent runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Agent {domain} failed: {cause}")]
    InvocationFailed {
        domain: Domain,
        cause: GenerationError,
    },

    #[error("Agent {domain} timed out")]
    TimedOut { domain: Domain },

    #[error("Agent {domain} aborted: {reason}")]
    TaskAborted { domain: Domain, reason: String },
}

impl AgentError {
    pub fn domain(&self) -> Domain {
        match self {
            AgentError::InvocationFailed { domain, .. }
            | AgentError::TimedOut { domain }
            | AgentError::TaskAborted { domain, .. } => *domain,
        }
    }
}

/// Default number of items kept per analysis section
pub const DEFAULT_MAX_ITEMS: usize = 5;

/// Generation plumbing shared by all agents
#[derive(Clone)]
pub struct AgentCore {
    domain: Domain,
    generator: Arc<dyn TextGenerator>,
    max_items: usize,
    max_steps: usize,
}

impl AgentCore {
    pub fn new(domain: Domain, generator: Arc<dyn TextGenerator>, max_steps: usize) -> Self {
        Self {
            domain,
            generator,
            max_items: DEFAULT_MAX_ITEMS,
            max_steps,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Send one prompt with the domain persona as system prompt
    pub async fn ask(&self, prompt: String, context: &[Turn]) -> Result<String, AgentError> {
        let request = GenerationRequest::new(PromptTemplate::domain_system(self.domain), prompt)
            .with_context(context.to_vec());

        debug!(domain = %self.domain, context_turns = context.len(), "Sending prompt");
        self.generator
            .generate(&request)
            .await
            .map_err(|cause| AgentError::InvocationFailed {
                domain: self.domain,
                cause,
            })
    }
}

/// Capability set of a domain expert
#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    fn domain(&self) -> Domain {
        self.core().domain()
    }

    /// Whether the idea deserves a diagram, judged after steps are known
    fn warrants_diagram(&self, idea: &Idea, steps: &[ImplementationStep]) -> bool;

    /// Full analysis: sections, steps and (when warranted) a diagram.
    ///
    /// Generation failures for the analysis or the steps propagate as
    /// [`AgentError::InvocationFailed`]; a failed diagram description only
    /// drops the diagram.
    async fn analyze(&self, idea: &Idea, context: &[Turn]) -> Result<AgentResult, AgentError> {
        let core = self.core();
        let response = core
            .ask(
                PromptTemplate::analysis_prompt(core.domain(), idea, core.max_items()),
                context,
            )
            .await?;
        let mut sections = parse_analysis(&response);
        sections.suggestions.truncate(core.max_items());
        sections.questions.truncate(core.max_items());
        sections.related_concepts.truncate(core.max_items());

        let steps = self.generate_steps(idea, context).await?;

        let diagram = if self.warrants_diagram(idea, &steps) {
            match self.describe_diagram(idea, context).await {
                Ok(diagram) => diagram,
                Err(e) => {
                    warn!(domain = %core.domain(), "Diagram description failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(AgentResult::new(core.domain())
            .with_suggestions(sections.suggestions)
            .with_questions(sections.questions)
            .with_related_concepts(sections.related_concepts)
            .with_steps(steps)
            .with_diagram(diagram))
    }

    /// Ordered implementation steps with dependency hints
    async fn generate_steps(
        &self,
        idea: &Idea,
        context: &[Turn],
    ) -> Result<Vec<ImplementationStep>, AgentError> {
        let core = self.core();
        let response = core
            .ask(
                PromptTemplate::steps_prompt(core.domain(), idea, core.max_steps()),
                context,
            )
            .await?;
        let mut steps = parse_steps(&response, core.domain());
        // Local references only point backwards, so truncation keeps them valid
        steps.truncate(core.max_steps());
        Ok(steps)
    }

    /// Diagram description, or `None` when the model declines one
    async fn describe_diagram(
        &self,
        idea: &Idea,
        context: &[Turn],
    ) -> Result<Option<DiagramSpec>, AgentError> {
        let core = self.core();
        let response = core
            .ask(PromptTemplate::diagram_prompt(core.domain(), idea), context)
            .await?;
        let title = format!("{} view", core.domain().display_name());
        Ok(parse_diagram(&response, &title))
    }
}
