//! Domain error types

use super::domain::Domain;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error(
        "Could not determine the idea's domain with enough confidence; choose one of: {}",
        Domain::valid_identifiers()
    )]
    ClassificationAmbiguous,

    #[error("No domain selected")]
    NoDomainSelected,

    #[error("Consensus requires at least one contributing domain")]
    NoContributingDomains,

    #[error("Inconsistent step ordering: dependency cycle through {0}")]
    InconsistentStepOrdering(String),

    #[error("Invalid idea: {0}")]
    InvalidIdea(String),
}

impl DomainError {
    /// Whether the caller can recover by supplying an explicit domain
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DomainError::ClassificationAmbiguous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_error_lists_domains() {
        let message = DomainError::ClassificationAmbiguous.to_string();
        assert!(message.contains("business, code, science, technology"));
    }

    #[test]
    fn test_is_recoverable_check() {
        assert!(DomainError::ClassificationAmbiguous.is_recoverable());
        assert!(!DomainError::NoDomainSelected.is_recoverable());
        assert!(!DomainError::InconsistentStepOrdering("code step 2".into()).is_recoverable());
    }
}
