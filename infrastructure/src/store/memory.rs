//! In-memory idea store.
//!
//! Keeps everything for the life of the process. Used when
//! `storage.ephemeral` is set and in tests of the composition root.

use async_trait::async_trait;
use ideaforge_application::ports::idea_store::{HistoryEntry, IdeaStore, StoreError};
use ideaforge_domain::{ConsensusResult, DialogueContext, Idea, IdeaId};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct IdeaRecord {
    idea: Option<Idea>,
    context: Option<DialogueContext>,
    history: Vec<HistoryEntry>,
}

#[derive(Default)]
pub struct InMemoryIdeaStore {
    records: RwLock<HashMap<IdeaId, IdeaRecord>>,
}

impl InMemoryIdeaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdeaStore for InMemoryIdeaStore {
    async fn load_idea(&self, id: &IdeaId) -> Result<Option<Idea>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .and_then(|r| r.idea.clone()))
    }

    async fn save_idea(&self, idea: &Idea) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .entry(idea.id().clone())
            .or_default()
            .idea = Some(idea.clone());
        Ok(())
    }

    async fn load_context(&self, id: &IdeaId) -> Result<Option<DialogueContext>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .and_then(|r| r.context.clone()))
    }

    async fn save_context(&self, id: &IdeaId, context: &DialogueContext) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .context = Some(context.clone());
        Ok(())
    }

    async fn save_consensus_result(
        &self,
        id: &IdeaId,
        result: &ConsensusResult,
    ) -> Result<(), StoreError> {
        let entry = HistoryEntry {
            recorded_at_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            result: result.clone(),
        };
        self.records
            .write()
            .await
            .entry(id.clone())
            .or_default()
            .history
            .push(entry);
        Ok(())
    }

    async fn load_history(&self, id: &IdeaId) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .map(|r| r.history.clone())
            .unwrap_or_default())
    }
}
