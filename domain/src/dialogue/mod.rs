//! Dialogue domain
//!
//! The per-idea conversation history fed back into agents on each turn.

pub mod context;

pub use context::{DEFAULT_MAX_TURNS, DialogueContext, Speaker, Turn};
