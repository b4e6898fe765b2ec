//! Domain layer for ideaforge
//!
//! This crate contains the core types and algorithms. It has no dependencies
//! on infrastructure or presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Domains and agents
//!
//! An idea is routed to one or more of four fixed expert domains
//! (business, code, science, technology). Each domain's agent produces an
//! [`AgentResult`]: suggestions, questions, related concepts, implementation
//! steps and an optional diagram description.
//!
//! ## Consensus
//!
//! [`merge`] combines several agent results into one [`ConsensusResult`]:
//! items are grouped by a similarity key and ranked by votes, steps are
//! topologically interleaved, and a single diagram is selected. The merge is
//! deterministic, so equal inputs produce byte-identical output.
//!
//! ## Dialogue
//!
//! A [`DialogueContext`] holds the bounded turn history of an [`Idea`] and is
//! fed back into agents on the next turn.

pub mod analysis;
pub mod classify;
pub mod consensus;
pub mod core;
pub mod dialogue;
pub mod idea;
pub mod prompt;

// Re-export commonly used types
pub use analysis::{
    AgentResult, AnalysisSections, DiagramEdge, DiagramSpec, ImplementationStep, StepRef,
    parse_analysis, parse_diagram, parse_diagram_edges, parse_steps,
};
pub use classify::{Classification, ClassifierConfig, classify, parse_domain_answer};
pub use consensus::{
    ConsensusResult, ExcludedDomain, ExclusionReason, ImageReference, MergedItem, MergedStep,
    SelectedDiagram, merge,
};
pub use core::{domain::Domain, error::DomainError};
pub use dialogue::{DialogueContext, Speaker, Turn};
pub use idea::{Idea, IdeaId, IdeaStage, extract_keywords};
pub use prompt::PromptTemplate;
