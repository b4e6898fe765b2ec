//! Prompt domain
//!
//! Templates for the prompts each domain agent sends to the text generator.

mod template;

pub use template::PromptTemplate;
