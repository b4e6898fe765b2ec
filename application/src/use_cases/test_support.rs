//! Hand-written collaborators shared by use case tests.

use crate::ports::diagram_renderer::{DiagramRenderer, RenderError};
use crate::ports::idea_store::{HistoryEntry, IdeaStore, StoreError};
use crate::ports::text_generator::{GenerationError, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use ideaforge_domain::{
    ConsensusResult, DiagramSpec, DialogueContext, Domain, Idea, IdeaId, ImageReference,
    PromptTemplate,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// How the generator answers for one domain
#[derive(Debug, Clone)]
pub enum Behavior {
    Respond,
    Fail(&'static str),
    Slow(Duration),
}

/// Text generator that recognizes the calling agent from its system prompt.
///
/// Every domain answers with one shared suggestion plus one of its own, so
/// multi-domain merges always produce a vote-2 item.
pub struct DomainGenerator {
    behaviors: HashMap<Domain, Behavior>,
    classification_answer: Option<String>,
    analysis_calls: Mutex<HashMap<Domain, usize>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl DomainGenerator {
    pub fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            classification_answer: None,
            analysis_calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_behavior(mut self, domain: Domain, behavior: Behavior) -> Self {
        self.behaviors.insert(domain, behavior);
        self
    }

    pub fn with_classification_answer(mut self, answer: &str) -> Self {
        self.classification_answer = Some(answer.to_string());
        self
    }

    pub fn analysis_calls(&self, domain: Domain) -> usize {
        self.analysis_calls
            .lock()
            .unwrap()
            .get(&domain)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn domain_of(request: &GenerationRequest) -> Option<Domain> {
        Domain::ALL
            .into_iter()
            .find(|d| request.system_prompt == PromptTemplate::domain_system(*d))
    }
}

#[async_trait]
impl TextGenerator for DomainGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());

        if request.system_prompt == PromptTemplate::classification_system() {
            return self
                .classification_answer
                .clone()
                .ok_or_else(|| GenerationError::Unavailable("no classifier".to_string()));
        }

        let Some(domain) = Self::domain_of(request) else {
            return Err(GenerationError::Rejected("unknown persona".to_string()));
        };
        let d = domain.as_str();

        if request.prompt.contains("RELATED_CONCEPTS:") {
            *self.analysis_calls.lock().unwrap().entry(domain).or_default() += 1;
        }

        match self.behaviors.get(&domain).cloned().unwrap_or(Behavior::Respond) {
            Behavior::Respond => {}
            Behavior::Fail(cause) => return Err(GenerationError::Unavailable(cause.to_string())),
            Behavior::Slow(delay) => tokio::time::sleep(delay).await,
        }

        if request.prompt.contains("RELATED_CONCEPTS:") {
            Ok(format!(
                "SUGGESTIONS:\n- shared idea\n- {d} idea\nQUESTIONS:\n- {d} question?\n"
            ))
        } else if request.prompt.contains("implementation steps") {
            Ok(format!("1. {d} first\n2. {d} second (depends on step 1)"))
        } else {
            Ok(format!("TITLE: {d} flow\n{d} -> result"))
        }
    }
}

/// Store backed by maps under one lock
#[derive(Default)]
pub struct MemoryStore {
    ideas: Mutex<HashMap<IdeaId, Idea>>,
    contexts: Mutex<HashMap<IdeaId, DialogueContext>>,
    history: Mutex<HashMap<IdeaId, Vec<HistoryEntry>>>,
    fail_context_writes: bool,
}

impl MemoryStore {
    /// Store whose `save_context` always fails with an IO error
    pub fn failing_context_writes() -> Self {
        Self {
            fail_context_writes: true,
            ..Self::default()
        }
    }

    pub fn idea_count(&self) -> usize {
        self.ideas.lock().unwrap().len()
    }
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn load_idea(&self, id: &IdeaId) -> Result<Option<Idea>, StoreError> {
        Ok(self.ideas.lock().unwrap().get(id).cloned())
    }

    async fn save_idea(&self, idea: &Idea) -> Result<(), StoreError> {
        self.ideas
            .lock()
            .unwrap()
            .insert(idea.id().clone(), idea.clone());
        Ok(())
    }

    async fn load_context(&self, id: &IdeaId) -> Result<Option<DialogueContext>, StoreError> {
        Ok(self.contexts.lock().unwrap().get(id).cloned())
    }

    async fn save_context(&self, id: &IdeaId, context: &DialogueContext) -> Result<(), StoreError> {
        if self.fail_context_writes {
            return Err(std::io::Error::other("disk full").into());
        }
        self.contexts
            .lock()
            .unwrap()
            .insert(id.clone(), context.clone());
        Ok(())
    }

    async fn save_consensus_result(
        &self,
        id: &IdeaId,
        result: &ConsensusResult,
    ) -> Result<(), StoreError> {
        self.history
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .push(HistoryEntry {
                recorded_at_ms: 0,
                result: result.clone(),
            });
        Ok(())
    }

    async fn load_history(&self, id: &IdeaId) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Renderer that names the image after the diagram title
pub struct TitleRenderer;

#[async_trait]
impl DiagramRenderer for TitleRenderer {
    async fn render_diagram(&self, spec: &DiagramSpec) -> Result<ImageReference, RenderError> {
        Ok(ImageReference::new(format!("{}.dot", spec.title)))
    }
}

pub struct BrokenRenderer;

#[async_trait]
impl DiagramRenderer for BrokenRenderer {
    async fn render_diagram(&self, _spec: &DiagramSpec) -> Result<ImageReference, RenderError> {
        Err(RenderError::Failed("disk full".to_string()))
    }
}
