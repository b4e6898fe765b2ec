//! Domain value object: the fixed set of expert subject areas

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Subject-matter domain handled by exactly one expert agent (Value Object)
///
/// The set is closed. Variant order is the enumeration order used for
/// every deterministic tie-break in classification and consensus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Business,
    Code,
    #[serde(alias = "hard_science")]
    Science,
    #[serde(alias = "tech")]
    Technology,
}

impl Domain {
    /// All domains in enumeration order
    pub const ALL: [Domain; 4] = [
        Domain::Business,
        Domain::Code,
        Domain::Science,
        Domain::Technology,
    ];

    /// Get the string identifier for this domain
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Business => "business",
            Domain::Code => "code",
            Domain::Science => "science",
            Domain::Technology => "technology",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Domain::Business => "Business",
            Domain::Code => "Code",
            Domain::Science => "Science",
            Domain::Technology => "Technology",
        }
    }

    /// Position in enumeration order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Sort key placing `primary` first, then enumeration order.
    pub fn precedence_key(self, primary: Domain) -> (bool, usize) {
        (self != primary, self.index())
    }

    /// Order `domains` by precedence relative to `primary`.
    pub fn sort_by_precedence(domains: &mut [Domain], primary: Domain) {
        domains.sort_by_key(|d| d.precedence_key(primary));
    }

    /// Comma separated list of every valid identifier
    pub fn valid_identifiers() -> String {
        Domain::ALL
            .iter()
            .map(Domain::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Domain::Business),
            "code" => Ok(Domain::Code),
            "science" | "hard_science" => Ok(Domain::Science),
            "technology" | "tech" => Ok(Domain::Technology),
            other => Err(DomainError::UnknownDomain(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_accepts_aliases() {
        assert_eq!("Business".parse::<Domain>().unwrap(), Domain::Business);
        assert_eq!(" CODE ".parse::<Domain>().unwrap(), Domain::Code);
        assert_eq!("hard_science".parse::<Domain>().unwrap(), Domain::Science);
        assert_eq!("tech".parse::<Domain>().unwrap(), Domain::Technology);
    }

    #[test]
    fn test_parse_unknown_domain() {
        let err = "philosophy".parse::<Domain>().unwrap_err();
        assert_eq!(err, DomainError::UnknownDomain("philosophy".to_string()));
    }

    #[test]
    fn test_precedence_puts_primary_first() {
        let mut domains = vec![Domain::Technology, Domain::Business, Domain::Code];
        Domain::sort_by_precedence(&mut domains, Domain::Code);
        assert_eq!(
            domains,
            vec![Domain::Code, Domain::Business, Domain::Technology]
        );
    }

    #[test]
    fn test_serde_roundtrip_uses_lowercase() {
        let json = serde_json::to_string(&Domain::Science).unwrap();
        assert_eq!(json, "\"science\"");
        let parsed: Domain = serde_json::from_str("\"hard_science\"").unwrap();
        assert_eq!(parsed, Domain::Science);
    }
}
