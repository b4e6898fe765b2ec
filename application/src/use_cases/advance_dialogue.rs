//! Advance Dialogue use case
//!
//! One dialogue turn for an idea:
//!
//! ```text
//! user text ─▶ classify ─▶ compose (fan-out) ─▶ merge ─▶ render ─▶ persist
//! ```
//!
//! Turns against the same idea are serialized through a per-idea token, so
//! the idea's [`DialogueContext`] only ever sees whole turns in request
//! order. Nothing is persisted unless the turn produces a consensus.

use crate::agents::AgentRegistry;
use crate::config::OrchestrationParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::diagram_renderer::DiagramRenderer;
use crate::ports::idea_store::{HistoryEntry, IdeaStore, StoreError};
use crate::ports::progress::{NoProgress, Phase, ProgressNotifier};
use crate::ports::text_generator::TextGenerator;
use crate::use_cases::classify_idea::{ClassifyError, ClassifyIdeaUseCase};
use crate::use_cases::compose_agents::{AgentOutcome, ComposeAgentsUseCase, ComposeError};
use crate::use_cases::shared::is_cancelled;
use ideaforge_domain::classify::{resolve_supporting, unknown_domain_warning};
use ideaforge_domain::idea::DEFAULT_KEYWORD_LIMIT;
use ideaforge_domain::{
    ConsensusResult, DialogueContext, Domain, DomainError, ExcludedDomain, Idea, IdeaId, Turn,
    extract_keywords, merge,
};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AdvanceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("All agents failed: {}", describe_exclusions(.excluded))]
    AllAgentsFailed { excluded: Vec<ExcludedDomain> },

    #[error("Idea {0} is archived")]
    IdeaArchived(IdeaId),

    #[error("Idea {0} not found")]
    IdeaNotFound(IdeaId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AdvanceError {
    /// Whether an explicit primary domain would let the request succeed
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, AdvanceError::Domain(DomainError::ClassificationAmbiguous))
    }
}

impl From<ClassifyError> for AdvanceError {
    fn from(e: ClassifyError) -> Self {
        match e {
            ClassifyError::Domain(e) => AdvanceError::Domain(e),
        }
    }
}

impl From<ComposeError> for AdvanceError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::Domain(e) => AdvanceError::Domain(e),
            ComposeError::Cancelled => AdvanceError::Cancelled,
        }
    }
}

fn describe_exclusions(excluded: &[ExcludedDomain]) -> String {
    excluded
        .iter()
        .map(|e| format!("{} ({})", e.domain, e.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Caller request for one dialogue turn
#[derive(Debug, Clone, Default)]
pub struct AdvanceRequest {
    /// Continue this idea; a new one is created when absent or unknown
    pub idea_id: Option<IdeaId>,
    pub text: String,
    pub primary: Option<String>,
    pub supporting: Option<Vec<String>>,
}

impl AdvanceRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn for_idea(mut self, id: impl Into<IdeaId>) -> Self {
        self.idea_id = Some(id.into());
        self
    }

    pub fn with_primary(mut self, primary: impl Into<String>) -> Self {
        self.primary = Some(primary.into());
        self
    }

    pub fn with_supporting<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.supporting = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// Result of one dialogue turn
#[derive(Debug, Clone)]
pub struct AdvanceOutput {
    /// The idea after the turn
    pub idea: Idea,
    /// Merged response; its `warnings` carry every non-fatal note
    pub consensus: ConsensusResult,
    /// Whether this turn created the idea
    pub created: bool,
}

/// Session controller: owns the per-idea dialogue and its persistence
pub struct DialogueController {
    store: Arc<dyn IdeaStore>,
    classifier: ClassifyIdeaUseCase,
    composer: ComposeAgentsUseCase,
    renderer: Option<Arc<dyn DiagramRenderer>>,
    logger: Arc<dyn ConversationLogger>,
    params: OrchestrationParams,
    cancellation_token: Option<CancellationToken>,
    locks: Mutex<HashMap<IdeaId, Arc<tokio::sync::Mutex<()>>>>,
}

impl DialogueController {
    pub fn new(
        store: Arc<dyn IdeaStore>,
        generator: Arc<dyn TextGenerator>,
        params: OrchestrationParams,
    ) -> Self {
        let mut classifier = ClassifyIdeaUseCase::new(params.classifier.clone());
        if params.classification_fallback {
            classifier = classifier.with_fallback(Arc::clone(&generator));
        }
        let composer = ComposeAgentsUseCase::new(Arc::new(AgentRegistry::new(generator)))
            .with_agent_timeout(params.agent_timeout)
            .with_request_timeout(params.request_timeout);

        Self {
            store,
            classifier,
            composer,
            renderer: None,
            logger: Arc::new(NoConversationLogger),
            params,
            cancellation_token: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.composer = self.composer.with_cancellation(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &OrchestrationParams {
        &self.params
    }

    /// Token serializing turns of one idea.
    ///
    /// Tokens nobody holds are dropped from the table on each lookup.
    fn idea_lock(&self, id: &IdeaId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(id.clone()).or_default())
    }

    pub async fn advance(&self, request: AdvanceRequest) -> Result<AdvanceOutput, AdvanceError> {
        self.advance_with_progress(request, &NoProgress).await
    }

    /// Run one dialogue turn.
    ///
    /// Classification errors on a new idea surface before any agent runs.
    /// On a continuation, an ambiguous classification keeps the idea's
    /// current domains.
    pub async fn advance_with_progress(
        &self,
        request: AdvanceRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<AdvanceOutput, AdvanceError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(AdvanceError::InvalidInput("idea text is empty".to_string()));
        }

        let id = request
            .idea_id
            .clone()
            .unwrap_or_else(|| IdeaId::new(Uuid::new_v4().to_string()));
        let lock = self.idea_lock(&id);
        let _guard = lock.lock().await;

        let existing = self.store.load_idea(&id).await?;
        if let Some(idea) = &existing
            && idea.stage().is_archived()
        {
            return Err(AdvanceError::IdeaArchived(id));
        }

        progress.on_phase_start(Phase::Classify, 1);
        let classified = self
            .classifier
            .execute(text, request.primary.as_deref(), request.supporting.as_deref())
            .await;
        progress.on_phase_complete(Phase::Classify);

        let created = existing.is_none();
        let (mut idea, warnings) = match (existing, classified) {
            (None, Ok(classification)) => {
                let idea = Idea::new(id.clone(), text, classification.primary)?
                    .with_supporting(classification.supporting.iter().copied())
                    .with_keywords(extract_keywords(text, DEFAULT_KEYWORD_LIMIT));
                (idea, classification.warnings)
            }
            (Some(mut idea), Ok(classification)) => {
                idea.reassign_domains(
                    classification.primary,
                    classification.supporting.iter().copied(),
                );
                (idea, classification.warnings)
            }
            (Some(mut idea), Err(e)) if e.is_ambiguous() => {
                let mut warnings = Vec::new();
                if let Some(primary) = &request.primary {
                    warnings.push(unknown_domain_warning(primary));
                }
                if let Some(ids) = &request.supporting {
                    let primary = idea.primary();
                    let supporting = resolve_supporting(ids, primary, &mut warnings);
                    idea.reassign_domains(primary, supporting);
                }
                (idea, warnings)
            }
            (_, Err(e)) => return Err(e.into()),
        };

        let domains = idea.selected_domains();
        info!(idea = %id, created, domains = ?domains, "Advancing dialogue");
        self.logger.log(ConversationEvent::new(
            "classification",
            json!({
                "idea_id": id.as_str(),
                "primary": idea.primary().as_str(),
                "supporting": idea.supporting().iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                "warnings": &warnings,
            }),
        ));

        let mut context = self
            .store
            .load_context(&id)
            .await?
            .unwrap_or_default()
            .with_max_turns(self.params.max_context_turns);
        context.push(Turn::user(text));

        let composition = self
            .composer
            .execute_with_progress(&idea, &domains, &context.to_vec(), progress)
            .await?;
        self.log_outcomes(&id, composition.outcomes());

        let (results, excluded) = composition.into_parts();
        if results.is_empty() {
            warn!(idea = %id, "Every agent failed");
            return Err(AdvanceError::AllAgentsFailed { excluded });
        }

        progress.on_phase_start(Phase::Merge, 1);
        let mut consensus = merge(&idea, &results)?
            .with_exclusions(excluded)
            .with_warnings(warnings);
        progress.on_phase_complete(Phase::Merge);
        self.logger.log(ConversationEvent::new(
            "consensus_merged",
            json!({
                "idea_id": id.as_str(),
                "contributing": consensus.contributing.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                "excluded": &consensus.excluded,
                "suggestions": consensus.suggestions.len(),
                "questions": consensus.questions.len(),
                "steps": consensus.steps.len(),
            }),
        ));

        self.render(&id, &mut consensus, progress).await;

        for domain in &consensus.contributing {
            if let Some(result) = results.get(domain) {
                context.push(Turn::agent(*domain, result.summary()));
            }
        }
        idea.mark_developing();

        if is_cancelled(&self.cancellation_token) {
            return Err(AdvanceError::Cancelled);
        }

        // Writes are not atomic. The idea record goes last so a failed turn
        // never leaves an idea whose stage runs ahead of its history.
        self.store.save_consensus_result(&id, &consensus).await?;
        self.store.save_context(&id, &context).await?;
        self.store.save_idea(&idea).await?;

        info!(
            idea = %id,
            contributing = consensus.contributing.len(),
            excluded = consensus.excluded.len(),
            "Dialogue turn stored"
        );
        Ok(AdvanceOutput {
            idea,
            consensus,
            created,
        })
    }

    fn log_outcomes(
        &self,
        id: &IdeaId,
        outcomes: &BTreeMap<Domain, AgentOutcome>,
    ) {
        for (domain, outcome) in outcomes {
            let event = match outcome {
                AgentOutcome::Completed(result) => ConversationEvent::new(
                    "agent_completed",
                    json!({
                        "idea_id": id.as_str(),
                        "domain": domain.as_str(),
                        "suggestions": result.suggestions.len(),
                        "questions": result.questions.len(),
                        "steps": result.steps.len(),
                        "diagram": result.diagram.is_some(),
                    }),
                ),
                AgentOutcome::Failed(e) => ConversationEvent::new(
                    "agent_failed",
                    json!({
                        "idea_id": id.as_str(),
                        "domain": domain.as_str(),
                        "error": e.to_string(),
                    }),
                ),
                AgentOutcome::TimedOut => ConversationEvent::new(
                    "agent_failed",
                    json!({
                        "idea_id": id.as_str(),
                        "domain": domain.as_str(),
                        "error": "timed out",
                    }),
                ),
            };
            self.logger.log(event);
        }
    }

    /// Best effort: failures leave the description and add a warning
    async fn render(
        &self,
        id: &IdeaId,
        consensus: &mut ConsensusResult,
        progress: &dyn ProgressNotifier,
    ) {
        let Some(renderer) = &self.renderer else {
            return;
        };
        let Some(diagram) = &consensus.diagram else {
            return;
        };
        let spec = diagram.spec.clone();
        let domain = diagram.domain;

        progress.on_phase_start(Phase::Render, 1);
        match renderer.render_diagram(&spec).await {
            Ok(image) => {
                self.logger.log(ConversationEvent::new(
                    "diagram_rendered",
                    json!({
                        "idea_id": id.as_str(),
                        "domain": domain.as_str(),
                        "image": image.as_str(),
                    }),
                ));
                consensus.attach_image(image);
            }
            Err(e) => {
                warn!(idea = %id, "Diagram rendering failed: {}", e);
                self.logger.log(ConversationEvent::new(
                    "diagram_render_failed",
                    json!({
                        "idea_id": id.as_str(),
                        "domain": domain.as_str(),
                        "error": e.to_string(),
                    }),
                ));
                consensus
                    .warnings
                    .push(format!("Diagram not rendered ({e}); description only"));
            }
        }
        progress.on_phase_complete(Phase::Render);
    }

    /// Move an idea to the archived stage
    pub async fn archive(&self, id: &IdeaId) -> Result<Idea, AdvanceError> {
        let lock = self.idea_lock(id);
        let _guard = lock.lock().await;

        let mut idea = self
            .store
            .load_idea(id)
            .await?
            .ok_or_else(|| AdvanceError::IdeaNotFound(id.clone()))?;
        idea.archive();
        self.store.save_idea(&idea).await?;
        info!(idea = %id, "Idea archived");
        Ok(idea)
    }

    /// Stored idea with its dialogue context
    pub async fn load(&self, id: &IdeaId) -> Result<(Idea, DialogueContext), AdvanceError> {
        let idea = self
            .store
            .load_idea(id)
            .await?
            .ok_or_else(|| AdvanceError::IdeaNotFound(id.clone()))?;
        let context = self
            .store
            .load_context(id)
            .await?
            .unwrap_or_default()
            .with_max_turns(self.params.max_context_turns);
        Ok((idea, context))
    }

    /// Consensus history of an idea, oldest first
    pub async fn history(&self, id: &IdeaId) -> Result<Vec<HistoryEntry>, AdvanceError> {
        if self.store.load_idea(id).await?.is_none() {
            return Err(AdvanceError::IdeaNotFound(id.clone()));
        }
        Ok(self.store.load_history(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        Behavior, BrokenRenderer, DomainGenerator, MemoryStore, TitleRenderer,
    };
    use ideaforge_domain::{IdeaStage, Speaker};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingLogger {
        events: std::sync::Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for RecordingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn controller(
        generator: Arc<DomainGenerator>,
        store: Arc<MemoryStore>,
        params: OrchestrationParams,
    ) -> DialogueController {
        DialogueController::new(store, generator, params)
    }

    fn code_and_business(text: &str) -> AdvanceRequest {
        AdvanceRequest::new(text)
            .with_primary("code")
            .with_supporting(["business"])
    }

    #[tokio::test]
    async fn test_new_idea_is_merged_and_persisted() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let controller = controller(generator, store.clone(), OrchestrationParams::default())
            .with_renderer(Arc::new(TitleRenderer))
            .with_conversation_logger(logger.clone());

        let output = controller
            .advance(code_and_business("Inventory tracker for bakeries"))
            .await
            .unwrap();

        assert!(output.created);
        assert_eq!(output.idea.stage(), IdeaStage::Developing);
        assert!(!output.idea.keywords().is_empty());

        let consensus = &output.consensus;
        assert_eq!(consensus.contributing, vec![Domain::Code, Domain::Business]);
        assert_eq!(consensus.suggestions[0].text, "shared idea");
        assert_eq!(consensus.suggestions[0].votes, 2);
        assert_eq!(consensus.steps.len(), 4);

        let diagram = consensus.diagram.as_ref().unwrap();
        assert_eq!(diagram.domain, Domain::Code);
        assert_eq!(diagram.image.as_ref().unwrap().as_str(), "code flow.dot");

        let (_, context) = controller.load(output.idea.id()).await.unwrap();
        let speakers: Vec<_> = context.iter().map(|t| t.speaker).collect();
        assert_eq!(speakers, vec![Speaker::User, Speaker::Agent, Speaker::Agent]);
        assert_eq!(controller.history(output.idea.id()).await.unwrap().len(), 1);

        let events = logger.events.lock().unwrap().clone();
        assert_eq!(events[0], "classification");
        assert!(events.contains(&"agent_completed"));
        assert!(events.contains(&"consensus_merged"));
        assert!(events.contains(&"diagram_rendered"));
    }

    #[tokio::test]
    async fn test_continuation_keeps_domains_and_grows_history() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let controller = controller(
            generator,
            store,
            OrchestrationParams::default().with_classification_fallback(false),
        );

        let first = controller
            .advance(code_and_business("Inventory tracker").for_idea("idea-7"))
            .await
            .unwrap();
        let second = controller
            .advance(AdvanceRequest::new("Tell me more").for_idea("idea-7"))
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(
            second.idea.selected_domains(),
            vec![Domain::Code, Domain::Business]
        );

        let id = IdeaId::from("idea-7");
        let (idea, context) = controller.load(&id).await.unwrap();
        assert_eq!(idea.description(), "Inventory tracker");
        assert_eq!(context.len(), 6);
        assert_eq!(context.iter().nth(3).unwrap().text, "Tell me more");
        assert_eq!(controller.history(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ambiguous_new_idea_fails_before_agents_run() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let controller = controller(
            generator.clone(),
            store.clone(),
            OrchestrationParams::default().with_classification_fallback(false),
        );

        let err = controller
            .advance(AdvanceRequest::new("Something nice for my neighbours"))
            .await
            .unwrap_err();

        assert!(err.is_ambiguous());
        assert_eq!(generator.total_calls(), 0);
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_classification_routes_new_idea() {
        let generator = Arc::new(DomainGenerator::new().with_classification_answer("science"));
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store, OrchestrationParams::default());

        let output = controller
            .advance(AdvanceRequest::new("Something nice for my neighbours"))
            .await
            .unwrap();

        assert_eq!(output.idea.primary(), Domain::Science);
        assert_eq!(output.consensus.contributing, vec![Domain::Science]);
    }

    #[tokio::test]
    async fn test_all_agents_failed_persists_nothing() {
        let generator = Arc::new(
            DomainGenerator::new()
                .with_behavior(Domain::Code, Behavior::Fail("down"))
                .with_behavior(Domain::Business, Behavior::Fail("down")),
        );
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store.clone(), OrchestrationParams::default());

        let err = controller
            .advance(code_and_business("Inventory tracker"))
            .await
            .unwrap_err();

        match err {
            AdvanceError::AllAgentsFailed { excluded } => assert_eq!(excluded.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported() {
        let generator = Arc::new(
            DomainGenerator::new().with_behavior(Domain::Business, Behavior::Fail("quota")),
        );
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store, OrchestrationParams::default());

        let output = controller
            .advance(code_and_business("Inventory tracker").with_supporting(["business", "astrology"]))
            .await
            .unwrap();

        let consensus = output.consensus;
        assert_eq!(consensus.contributing, vec![Domain::Code]);
        assert_eq!(consensus.excluded.len(), 1);
        assert_eq!(consensus.excluded[0].domain, Domain::Business);
        assert!(consensus.is_degraded());
        assert!(consensus.warnings.iter().any(|w| w.contains("astrology")));
    }

    fn three_domains(text: &str) -> AdvanceRequest {
        AdvanceRequest::new(text)
            .with_primary("code")
            .with_supporting(["business", "science"])
    }

    #[tokio::test]
    async fn test_one_of_three_failing_leaves_two_contributors() {
        let generator = Arc::new(
            DomainGenerator::new().with_behavior(Domain::Science, Behavior::Fail("quota")),
        );
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator.clone(), store.clone(), OrchestrationParams::default());

        let output = controller
            .advance(three_domains("Inventory tracker"))
            .await
            .unwrap();

        let consensus = output.consensus;
        assert_eq!(consensus.contributing.len(), 2);
        assert!(consensus.contributing.contains(&Domain::Code));
        assert!(consensus.contributing.contains(&Domain::Business));
        assert_eq!(consensus.excluded.len(), 1);
        assert_eq!(consensus.excluded[0].domain, Domain::Science);
        assert_eq!(consensus.suggestions[0].votes, 2);
        assert!(consensus.is_degraded());
        assert_eq!(generator.analysis_calls(Domain::Science), 1);
        assert_eq!(store.idea_count(), 1);
    }

    #[tokio::test]
    async fn test_three_of_three_failing_is_all_agents_failed() {
        let generator = Arc::new(
            DomainGenerator::new()
                .with_behavior(Domain::Code, Behavior::Fail("down"))
                .with_behavior(Domain::Business, Behavior::Fail("down"))
                .with_behavior(Domain::Science, Behavior::Fail("down")),
        );
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store.clone(), OrchestrationParams::default());

        let err = controller
            .advance(three_domains("Inventory tracker"))
            .await
            .unwrap_err();

        match err {
            AdvanceError::AllAgentsFailed { excluded } => {
                let domains: Vec<Domain> = excluded.iter().map(|e| e.domain).collect();
                assert_eq!(domains.len(), 3);
                assert!(domains.contains(&Domain::Science));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_idea_record() {
        let store = Arc::new(MemoryStore::failing_context_writes());
        let controller = controller(
            Arc::new(DomainGenerator::new()),
            store.clone(),
            OrchestrationParams::default(),
        );

        let err = controller
            .advance(code_and_business("Inventory tracker"))
            .await
            .unwrap_err();

        assert!(matches!(err, AdvanceError::Store(StoreError::Io(_))));
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_archived_idea_is_rejected() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store, OrchestrationParams::default());

        controller
            .advance(code_and_business("Inventory tracker").for_idea("idea-9"))
            .await
            .unwrap();
        let archived = controller.archive(&IdeaId::from("idea-9")).await.unwrap();
        assert_eq!(archived.stage(), IdeaStage::Archived);

        let err = controller
            .advance(AdvanceRequest::new("More").for_idea("idea-9"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvanceError::IdeaArchived(_)));

        let missing = controller.archive(&IdeaId::from("nope")).await.unwrap_err();
        assert!(matches!(missing, AdvanceError::IdeaNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_turns_on_one_idea_are_serialized() {
        let generator = Arc::new(
            DomainGenerator::new()
                .with_behavior(Domain::Code, Behavior::Slow(Duration::from_millis(50))),
        );
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store, OrchestrationParams::default());

        let (a, b) = tokio::join!(
            controller.advance(code_and_business("first turn").for_idea("shared")),
            controller.advance(code_and_business("second turn").for_idea("shared")),
        );
        a.unwrap();
        b.unwrap();

        let (_, context) = controller.load(&IdeaId::from("shared")).await.unwrap();
        let speakers: Vec<_> = context.iter().map(|t| t.speaker).collect();
        assert_eq!(
            speakers,
            vec![
                Speaker::User,
                Speaker::Agent,
                Speaker::Agent,
                Speaker::User,
                Speaker::Agent,
                Speaker::Agent,
            ]
        );
        assert!(controller.locks.lock().unwrap().len() <= 1);
    }

    #[tokio::test]
    async fn test_context_window_drops_oldest_turns() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let controller = controller(
            generator,
            store,
            OrchestrationParams::default().with_max_context_turns(4),
        );

        for text in ["opening text", "follow up"] {
            controller
                .advance(code_and_business(text).for_idea("window"))
                .await
                .unwrap();
        }

        let (_, context) = controller.load(&IdeaId::from("window")).await.unwrap();
        assert_eq!(context.len(), 4);
        assert!(context.iter().all(|t| t.text != "opening text"));
        assert_eq!(context.iter().nth(1).unwrap().text, "follow up");
        assert_eq!(context.last().unwrap().speaker, Speaker::Agent);
    }

    #[tokio::test]
    async fn test_render_failure_keeps_description() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let controller = controller(generator, store, OrchestrationParams::default())
            .with_renderer(Arc::new(BrokenRenderer));

        let output = controller
            .advance(code_and_business("Inventory tracker"))
            .await
            .unwrap();

        let diagram = output.consensus.diagram.as_ref().unwrap();
        assert!(diagram.image.is_none());
        assert!(
            output
                .consensus
                .warnings
                .iter()
                .any(|w| w.contains("description only"))
        );
    }

    #[tokio::test]
    async fn test_cancelled_turn_is_not_persisted() {
        let generator = Arc::new(DomainGenerator::new());
        let store = Arc::new(MemoryStore::default());
        let token = CancellationToken::new();
        token.cancel();
        let controller = controller(generator, store.clone(), OrchestrationParams::default())
            .with_cancellation(token);

        let err = controller
            .advance(code_and_business("Inventory tracker"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvanceError::Cancelled));
        assert_eq!(store.idea_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let controller = controller(
            Arc::new(DomainGenerator::new()),
            Arc::new(MemoryStore::default()),
            OrchestrationParams::default(),
        );
        let err = controller.advance(AdvanceRequest::new("   ")).await.unwrap_err();
        assert!(matches!(err, AdvanceError::InvalidInput(_)));
    }
}
