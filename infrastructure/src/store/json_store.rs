//! JSON file idea store.
//!
//! Layout under the root directory:
//!
//! ```text
//! ideas/<id>/idea.json       current idea record
//! ideas/<id>/context.json    dialogue context
//! ideas/<id>/history.jsonl   one consensus result per line, oldest first
//! ```
//!
//! Record files are replaced atomically (write to a temp file, then
//! rename). History is append-only.

use async_trait::async_trait;
use ideaforge_application::ports::idea_store::{HistoryEntry, IdeaStore, StoreError};
use ideaforge_domain::{ConsensusResult, DialogueContext, Idea, IdeaId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

const IDEA_FILE: &str = "idea.json";
const CONTEXT_FILE: &str = "context.json";
const HISTORY_FILE: &str = "history.jsonl";

pub struct JsonFileIdeaStore {
    root: PathBuf,
}

impl JsonFileIdeaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn idea_dir(&self, id: &IdeaId) -> PathBuf {
        self.root.join("ideas").join(dir_name(id))
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Directory name for an idea id.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other byte is
/// written as `~xx`, so distinct ids never share a directory.
fn dir_name(id: &IdeaId) -> String {
    let mut name = String::new();
    for byte in id.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("~{:02x}", byte));
        }
    }
    name
}

#[async_trait]
impl IdeaStore for JsonFileIdeaStore {
    async fn load_idea(&self, id: &IdeaId) -> Result<Option<Idea>, StoreError> {
        let idea: Option<Idea> = Self::read_json(&self.idea_dir(id).join(IDEA_FILE)).await?;
        if let Some(idea) = &idea
            && idea.id() != id
        {
            return Err(StoreError::Corrupt {
                id: id.to_string(),
                reason: format!("record belongs to idea {}", idea.id()),
            });
        }
        Ok(idea)
    }

    async fn save_idea(&self, idea: &Idea) -> Result<(), StoreError> {
        let path = self.idea_dir(idea.id()).join(IDEA_FILE);
        Self::write_json(&path, idea).await?;
        debug!(idea = %idea.id(), path = %path.display(), "Idea saved");
        Ok(())
    }

    async fn load_context(&self, id: &IdeaId) -> Result<Option<DialogueContext>, StoreError> {
        Self::read_json(&self.idea_dir(id).join(CONTEXT_FILE)).await
    }

    async fn save_context(&self, id: &IdeaId, context: &DialogueContext) -> Result<(), StoreError> {
        Self::write_json(&self.idea_dir(id).join(CONTEXT_FILE), context).await
    }

    async fn save_consensus_result(
        &self,
        id: &IdeaId,
        result: &ConsensusResult,
    ) -> Result<(), StoreError> {
        let dir = self.idea_dir(id);
        tokio::fs::create_dir_all(&dir).await?;

        let entry = HistoryEntry {
            recorded_at_ms: chrono::Utc::now().timestamp_millis().max(0) as u64,
            result: result.clone(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(HISTORY_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn load_history(&self, id: &IdeaId) -> Result<Vec<HistoryEntry>, StoreError> {
        let text = match tokio::fs::read_to_string(self.idea_dir(id).join(HISTORY_FILE)).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                    id: id.to_string(),
                    reason: format!("history line {}: {}", n + 1, e),
                })
            })
            .collect()
    }
}
