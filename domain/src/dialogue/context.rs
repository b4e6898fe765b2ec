//! Bounded dialogue history for an idea

use crate::core::domain::Domain;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default turn window
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Agent => "agent",
        }
    }
}

/// One entry in the dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    /// Domain that produced an agent turn; `None` for user turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            domain: None,
        }
    }

    pub fn agent(domain: Domain, text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
            domain: Some(domain),
        }
    }

    /// Label used when the turn is rendered into a prompt
    pub fn label(&self) -> String {
        match (self.speaker, self.domain) {
            (Speaker::Agent, Some(domain)) => format!("{} agent", domain.as_str()),
            (speaker, _) => speaker.as_str().to_string(),
        }
    }
}

/// Ordered turns of one idea, bounded by a FIFO window.
///
/// Pushing past `max_turns` drops the oldest turn first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueContext {
    max_turns: usize,
    turns: VecDeque<Turn>,
}

impl Default for DialogueContext {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl DialogueContext {
    /// A window of zero is raised to one.
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
            turns: VecDeque::new(),
        }
    }

    /// Change the window, truncating immediately if it shrank
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self.truncate();
        self
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        self.truncate();
    }

    fn truncate(&mut self) {
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Plain-text transcript, one `label: text` line per turn
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.label(), t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
