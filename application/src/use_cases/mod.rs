//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod advance_dialogue;
pub mod classify_idea;
pub mod compose_agents;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;
