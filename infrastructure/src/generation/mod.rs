//! Text generation adapters
//!
//! Implementations of the [`TextGenerator`](ideaforge_application::TextGenerator) port.

mod openai;

pub use openai::{OpenAiCompatibleGenerator, OpenAiConfig};
