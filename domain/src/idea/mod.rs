//! Idea domain.
//!
//! - [`entities::Idea`]: the persistent subject of a dialogue session
//! - [`keywords::extract_keywords`]: topic keywords for prompts

pub mod entities;
pub mod keywords;

pub use entities::{Idea, IdeaId, IdeaStage};
pub use keywords::{DEFAULT_KEYWORD_LIMIT, extract_keywords};
