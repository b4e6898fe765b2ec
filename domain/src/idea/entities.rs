//! Idea entity and identifiers

use crate::core::domain::Domain;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier of an idea (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaId(String);

impl IdeaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdeaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdeaId {
    fn from(s: &str) -> Self {
        IdeaId::new(s)
    }
}

impl From<String> for IdeaId {
    fn from(s: String) -> Self {
        IdeaId::new(s)
    }
}

/// Development stage of an idea
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaStage {
    /// Created, no consensus produced yet
    #[default]
    Initial,
    /// At least one consensus round completed
    Developing,
    /// Session ended; no further dialogue accepted
    Archived,
}

impl IdeaStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStage::Initial => "initial",
            IdeaStage::Developing => "developing",
            IdeaStage::Archived => "archived",
        }
    }

    pub fn is_archived(&self) -> bool {
        matches!(self, IdeaStage::Archived)
    }
}

impl std::fmt::Display for IdeaStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The subject of a dialogue session (Entity)
///
/// Always has exactly one primary domain; the primary is never also
/// listed among the supporting domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    id: IdeaId,
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
    created_at_ms: u64,
    primary: Domain,
    #[serde(default)]
    supporting: BTreeSet<Domain>,
    #[serde(default)]
    stage: IdeaStage,
}

impl Idea {
    /// Create a new idea in the [`IdeaStage::Initial`] stage.
    ///
    /// Fails if the description is empty or only whitespace.
    pub fn new(
        id: impl Into<IdeaId>,
        description: impl Into<String>,
        primary: Domain,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(DomainError::InvalidIdea(
                "description cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: id.into(),
            description,
            keywords: Vec::new(),
            created_at_ms: current_timestamp(),
            primary,
            supporting: BTreeSet::new(),
            stage: IdeaStage::Initial,
        })
    }

    pub fn with_supporting(mut self, domains: impl IntoIterator<Item = Domain>) -> Self {
        self.supporting = domains.into_iter().filter(|d| *d != self.primary).collect();
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_created_at(mut self, created_at_ms: u64) -> Self {
        self.created_at_ms = created_at_ms;
        self
    }

    pub fn id(&self) -> &IdeaId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    pub fn primary(&self) -> Domain {
        self.primary
    }

    pub fn supporting(&self) -> &BTreeSet<Domain> {
        &self.supporting
    }

    pub fn stage(&self) -> IdeaStage {
        self.stage
    }

    /// Primary domain first, then supporting domains in enumeration order
    pub fn selected_domains(&self) -> Vec<Domain> {
        std::iter::once(self.primary)
            .chain(self.supporting.iter().copied())
            .collect()
    }

    /// Replace the primary and supporting domains
    pub fn reassign_domains(&mut self, primary: Domain, supporting: impl IntoIterator<Item = Domain>) {
        self.primary = primary;
        self.supporting = supporting.into_iter().filter(|d| *d != primary).collect();
    }

    /// Move from `Initial` to `Developing`; later stages are unchanged
    pub fn mark_developing(&mut self) {
        if self.stage == IdeaStage::Initial {
            self.stage = IdeaStage::Developing;
        }
    }

    pub fn archive(&mut self) {
        self.stage = IdeaStage::Archived;
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_description_is_rejected() {
        let err = Idea::new("idea-1", "   ", Domain::Code).unwrap_err();
        assert!(matches!(err, DomainError::InvalidIdea(_)));
    }

    #[test]
    fn test_supporting_never_contains_primary() {
        let idea = Idea::new("idea-1", "A pricing API", Domain::Code)
            .unwrap()
            .with_supporting([Domain::Code, Domain::Business]);

        assert_eq!(idea.primary(), Domain::Code);
        assert_eq!(
            idea.supporting().iter().copied().collect::<Vec<_>>(),
            vec![Domain::Business]
        );
    }

    #[test]
    fn test_selected_domains_primary_first() {
        let idea = Idea::new("idea-1", "Lab automation", Domain::Technology)
            .unwrap()
            .with_supporting([Domain::Science, Domain::Business]);

        assert_eq!(
            idea.selected_domains(),
            vec![Domain::Technology, Domain::Business, Domain::Science]
        );
    }

    #[test]
    fn test_reassign_domains_drops_primary_from_supporting() {
        let mut idea = Idea::new("idea-1", "Idea", Domain::Business)
            .unwrap()
            .with_supporting([Domain::Code]);
        idea.reassign_domains(Domain::Code, [Domain::Code, Domain::Science]);

        assert_eq!(idea.primary(), Domain::Code);
        assert_eq!(idea.selected_domains(), vec![Domain::Code, Domain::Science]);
    }

    #[test]
    fn test_stage_transitions() {
        let mut idea = Idea::new("idea-1", "Idea", Domain::Science).unwrap();
        assert_eq!(idea.stage(), IdeaStage::Initial);

        idea.mark_developing();
        assert_eq!(idea.stage(), IdeaStage::Developing);

        idea.archive();
        idea.mark_developing();
        assert!(idea.stage().is_archived());
    }
}
