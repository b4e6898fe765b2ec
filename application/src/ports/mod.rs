//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod diagram_renderer;
pub mod idea_store;
pub mod progress;
pub mod text_generator;
