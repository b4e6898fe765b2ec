//! Configuration file loading for ideaforge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `IDEAFORGE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./ideaforge.toml` or `./.ideaforge.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/ideaforge/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGenerationConfig, FileLoggingConfig, FileOutputConfig,
    FileOutputFormat, FileOrchestrationConfig, FileStorageConfig,
};
pub use loader::ConfigLoader;
