//! Application layer for ideaforge
//!
//! This crate contains the domain agents, use cases, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use agents::{Agent, AgentError, AgentRegistry, DomainAgent};
pub use config::OrchestrationParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    diagram_renderer::{DiagramRenderer, RenderError},
    idea_store::{HistoryEntry, IdeaStore, StoreError},
    progress::{NoProgress, Phase, ProgressNotifier},
    text_generator::{GenerationError, GenerationRequest, TextGenerator},
};
pub use use_cases::advance_dialogue::{
    AdvanceError, AdvanceOutput, AdvanceRequest, DialogueController,
};
pub use use_cases::classify_idea::{ClassifyError, ClassifyIdeaUseCase};
pub use use_cases::compose_agents::{
    AgentOutcome, ComposeAgentsUseCase, ComposeError, Composition,
};
