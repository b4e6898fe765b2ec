//! Logging configuration from TOML (`[logging]` section)

use super::storage::expand_home;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw logging configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a JSONL conversation transcript
    pub conversation_log: bool,
    /// Directory for daily-rolling diagnostic logs; stderr only when unset
    pub file_dir: Option<String>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            conversation_log: true,
            file_dir: None,
        }
    }
}

impl FileLoggingConfig {
    pub fn resolve_file_dir(&self) -> Option<PathBuf> {
        self.file_dir.as_deref().map(expand_home)
    }

    /// Transcript location under the data directory
    pub fn conversation_log_path(&self, data_dir: &Path) -> Option<PathBuf> {
        self.conversation_log
            .then(|| data_dir.join("logs").join("conversation.jsonl"))
    }
}
