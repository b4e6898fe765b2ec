//! Application-level configuration.
//!
//! - [`OrchestrationParams`]: dialogue turn control (timeouts, context window, classifier thresholds)

pub mod orchestration_params;

pub use orchestration_params::OrchestrationParams;
