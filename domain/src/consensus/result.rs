//! Consensus result types
//!
//! A [`ConsensusResult`] is the single merged response of one request. It
//! contains no timestamps or other ambient values, so identical agent
//! results always serialize to identical bytes.

use crate::analysis::result::DiagramSpec;
use crate::core::domain::Domain;
use crate::idea::IdeaId;
use serde::{Deserialize, Serialize};

/// Where a rendered diagram can be found (path or URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A de-duplicated suggestion, question, or related concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedItem {
    /// Text as first written by the highest-precedence contributor
    pub text: String,
    /// Number of contributing domains that produced this item
    pub votes: usize,
    /// `votes` divided by the number of contributing domains
    pub confidence: f64,
    /// Contributors in precedence order
    pub domains: Vec<Domain>,
}

impl MergedItem {
    pub fn is_unanimous(&self, contributing: usize) -> bool {
        self.votes == contributing
    }

    /// Visual vote summary, e.g. `[●●○]`
    pub fn vote_summary(&self, contributing: usize) -> String {
        let mut summary = String::from("[");
        for i in 0..contributing {
            summary.push(if i < self.votes { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }
}

/// One entry of the merged implementation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedStep {
    /// 1-based position in the merged plan
    pub sequence: usize,
    pub domain: Domain,
    /// Index of the step within its agent's own steps
    pub source_index: usize,
    pub description: String,
    /// Sequence number of the step this one declared it depends on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<usize>,
}

/// The one diagram chosen for the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDiagram {
    pub domain: Domain,
    pub spec: DiagramSpec,
    /// Set once the renderer produced an image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageReference>,
}

/// Why a selected domain did not contribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    Failed { cause: String },
    TimedOut,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::Failed { cause } => write!(f, "failed: {}", cause),
            ExclusionReason::TimedOut => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedDomain {
    pub domain: Domain,
    pub reason: ExclusionReason,
}

impl ExcludedDomain {
    pub fn failed(domain: Domain, cause: impl Into<String>) -> Self {
        Self {
            domain,
            reason: ExclusionReason::Failed {
                cause: cause.into(),
            },
        }
    }

    pub fn timed_out(domain: Domain) -> Self {
        Self {
            domain,
            reason: ExclusionReason::TimedOut,
        }
    }
}

/// Merged response of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub idea_id: IdeaId,
    pub primary: Domain,
    /// Domains whose results were merged, in precedence order
    pub contributing: Vec<Domain>,
    #[serde(default)]
    pub excluded: Vec<ExcludedDomain>,
    pub suggestions: Vec<MergedItem>,
    pub questions: Vec<MergedItem>,
    pub related_concepts: Vec<MergedItem>,
    pub steps: Vec<MergedStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<SelectedDiagram>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ConsensusResult {
    /// Record excluded domains, kept in enumeration order
    pub fn with_exclusions(mut self, excluded: Vec<ExcludedDomain>) -> Self {
        self.excluded = excluded;
        self.excluded.sort_by_key(|e| e.domain);
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn attach_image(&mut self, image: ImageReference) {
        if let Some(diagram) = self.diagram.as_mut() {
            diagram.image = Some(image);
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.excluded.is_empty()
    }

    /// Counts of items attributed to `domain` as
    /// `(suggestions, questions, steps)`
    pub fn domain_summary(&self, domain: Domain) -> (usize, usize, usize) {
        let suggestions = self
            .suggestions
            .iter()
            .filter(|i| i.domains.contains(&domain))
            .count();
        let questions = self
            .questions
            .iter()
            .filter(|i| i.domains.contains(&domain))
            .count();
        let steps = self.steps.iter().filter(|s| s.domain == domain).count();
        (suggestions, questions, steps)
    }

    /// Stable JSON form; equal results produce equal strings
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, votes: usize, domains: Vec<Domain>) -> MergedItem {
        MergedItem {
            text: text.to_string(),
            votes,
            confidence: votes as f64 / 2.0,
            domains,
        }
    }

    fn result() -> ConsensusResult {
        ConsensusResult {
            idea_id: IdeaId::new("idea-1"),
            primary: Domain::Code,
            contributing: vec![Domain::Code, Domain::Business],
            excluded: Vec::new(),
            suggestions: vec![
                item("add caching layer", 2, vec![Domain::Code, Domain::Business]),
                item("validate pricing model", 1, vec![Domain::Business]),
            ],
            questions: vec![item("who pays?", 1, vec![Domain::Business])],
            related_concepts: Vec::new(),
            steps: vec![MergedStep {
                sequence: 1,
                domain: Domain::Code,
                source_index: 1,
                description: "Set up repo".to_string(),
                after: None,
            }],
            diagram: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_vote_summary() {
        let merged = item("x", 1, vec![Domain::Code]);
        assert_eq!(merged.vote_summary(3), "[●○○]");
        assert!(!merged.is_unanimous(3));
    }

    #[test]
    fn test_domain_summary() {
        let r = result();
        assert_eq!(r.domain_summary(Domain::Business), (2, 1, 0));
        assert_eq!(r.domain_summary(Domain::Code), (1, 0, 1));
    }

    #[test]
    fn test_exclusions_sorted_and_serialized_with_kind() {
        let r = result().with_exclusions(vec![
            ExcludedDomain::timed_out(Domain::Technology),
            ExcludedDomain::failed(Domain::Science, "service unavailable"),
        ]);
        assert!(r.is_degraded());
        assert_eq!(r.excluded[0].domain, Domain::Science);

        let json = serde_json::to_value(&r.excluded).unwrap();
        assert_eq!(json[0]["reason"]["kind"], "failed");
        assert_eq!(json[0]["reason"]["cause"], "service unavailable");
        assert_eq!(json[1]["reason"]["kind"], "timed_out");
    }

    #[test]
    fn test_attach_image_without_diagram_is_noop() {
        let mut r = result();
        r.attach_image(ImageReference::new("/tmp/x.dot"));
        assert!(r.diagram.is_none());
    }
}
