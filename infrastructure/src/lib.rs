//! Infrastructure layer for ideaforge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod generation;
pub mod logging;
pub mod rendering;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig,
    FileOrchestrationConfig, FileOutputConfig, FileOutputFormat, FileStorageConfig,
};
pub use generation::{OpenAiCompatibleGenerator, OpenAiConfig};
pub use logging::JsonlConversationLogger;
pub use rendering::DotDiagramRenderer;
pub use store::{InMemoryIdeaStore, JsonFileIdeaStore};
