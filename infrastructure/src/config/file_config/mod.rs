//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types on use.

mod generation;
mod logging;
mod orchestration;
mod output;
mod storage;

pub use generation::FileGenerationConfig;
pub use logging::FileLoggingConfig;
pub use orchestration::FileOrchestrationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use storage::FileStorageConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    ZeroValue { field: &'static str },

    #[error("{field} must be between 0 and 1, got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Text generation service
    pub generation: FileGenerationConfig,
    /// Agent fan-out, context window and classifier settings
    pub orchestration: FileOrchestrationConfig,
    /// Where ideas, history and diagrams are kept
    pub storage: FileStorageConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log sinks
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = self.generation.validate();
        issues.extend(self.orchestration.validate());
        issues
    }
}
