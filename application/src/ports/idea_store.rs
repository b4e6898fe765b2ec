//! Persistent store port
//!
//! Stores each idea, its dialogue context and the append-only history of
//! consensus results. Implementations must give read-your-writes
//! consistency per idea; nothing is required across ideas.

use async_trait::async_trait;
use ideaforge_domain::{ConsensusResult, DialogueContext, Idea, IdeaId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record for idea {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// One history entry: a consensus result and when it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub recorded_at_ms: u64,
    pub result: ConsensusResult,
}

#[async_trait]
pub trait IdeaStore: Send + Sync {
    async fn load_idea(&self, id: &IdeaId) -> Result<Option<Idea>, StoreError>;

    async fn save_idea(&self, idea: &Idea) -> Result<(), StoreError>;

    async fn load_context(&self, id: &IdeaId) -> Result<Option<DialogueContext>, StoreError>;

    async fn save_context(&self, id: &IdeaId, context: &DialogueContext) -> Result<(), StoreError>;

    /// Append a result to the idea's history
    async fn save_consensus_result(
        &self,
        id: &IdeaId,
        result: &ConsensusResult,
    ) -> Result<(), StoreError>;

    /// History entries, oldest first
    async fn load_history(&self, id: &IdeaId) -> Result<Vec<HistoryEntry>, StoreError>;
}
