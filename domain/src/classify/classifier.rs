//! Domain classification
//!
//! Determines the primary and supporting domains of an idea from explicit
//! user selection or, failing that, keyword heuristics over the text.

use super::lexicon;
use crate::core::domain::Domain;
use crate::core::error::DomainError;
use crate::core::string::words;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Thresholds for heuristic classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Minimum share of keyword hits the top domain needs
    pub min_confidence: f64,
    /// Minimum share of keyword hits for an inferred supporting domain
    pub supporting_min_confidence: f64,
    /// Infer supporting domains when none are given explicitly
    pub infer_supporting: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            supporting_min_confidence: 0.25,
            infer_supporting: true,
        }
    }
}

/// Outcome of classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub primary: Domain,
    pub supporting: BTreeSet<Domain>,
    /// 1.0 for explicit selection, otherwise the primary's share of hits
    pub confidence: f64,
    /// Whether the primary came from the caller rather than inference
    pub explicit: bool,
    /// Non-fatal notes such as dropped unknown identifiers
    pub warnings: Vec<String>,
}

impl Classification {
    /// Primary first, then supporting domains in enumeration order
    pub fn domains(&self) -> Vec<Domain> {
        std::iter::once(self.primary)
            .chain(self.supporting.iter().copied())
            .collect()
    }
}

/// Per-domain keyword hit counts, indexed by [`Domain::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainScores([usize; 4]);

impl DomainScores {
    pub fn of(text: &str) -> Self {
        let mut scores = [0usize; 4];
        for word in words(text) {
            for domain in Domain::ALL {
                if lexicon::matches(domain, &word) {
                    scores[domain.index()] += 1;
                }
            }
        }
        Self(scores)
    }

    pub fn get(&self, domain: Domain) -> usize {
        self.0[domain.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Share of all hits that went to `domain`
    pub fn share(&self, domain: Domain) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(domain) as f64 / total as f64,
        }
    }

    /// Every domain sharing the top score, in enumeration order; empty when
    /// nothing scored.
    pub fn leaders(&self) -> Vec<Domain> {
        let best = self.0.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return Vec::new();
        }
        Domain::ALL
            .into_iter()
            .filter(|d| self.get(*d) == best)
            .collect()
    }

    /// The highest-scoring domain; ties go to enumeration order.
    pub fn leader(&self) -> Option<Domain> {
        self.leaders().into_iter().next()
    }
}

/// Warning text for a dropped identifier
pub fn unknown_domain_warning(identifier: &str) -> String {
    format!(
        "Unknown domain '{}' ignored (valid: {})",
        identifier,
        Domain::valid_identifiers()
    )
}

/// Classify an idea.
///
/// A valid `explicit_primary` always wins. An unknown one is dropped with a
/// warning and inference runs instead, failing with
/// [`DomainError::ClassificationAmbiguous`] when no domain reaches
/// `config.min_confidence`. Tied leaders resolve to the first in
/// enumeration order; the others become supporting domains when supporting
/// domains are inferred.
///
/// `explicit_supporting`, when given, replaces inference of supporting
/// domains; unknown identifiers are dropped with a warning and the primary
/// is removed.
pub fn classify(
    text: &str,
    explicit_primary: Option<&str>,
    explicit_supporting: Option<&[String]>,
    config: &ClassifierConfig,
) -> Result<Classification, DomainError> {
    let mut warnings = Vec::new();

    let explicit = explicit_primary.and_then(|id| match id.parse::<Domain>() {
        Ok(domain) => Some(domain),
        Err(_) => {
            warnings.push(unknown_domain_warning(id));
            None
        }
    });

    let scores = DomainScores::of(text);

    let (primary, confidence) = match explicit {
        Some(domain) => (domain, 1.0),
        None => {
            let leader = scores.leader().ok_or(DomainError::ClassificationAmbiguous)?;
            let confidence = scores.share(leader);
            if confidence < config.min_confidence {
                return Err(DomainError::ClassificationAmbiguous);
            }
            (leader, confidence)
        }
    };

    let supporting = match explicit_supporting {
        Some(ids) => resolve_supporting(ids, primary, &mut warnings),
        None if config.infer_supporting => Domain::ALL
            .into_iter()
            .filter(|d| *d != primary)
            .filter(|d| {
                let co_leader = explicit.is_none() && scores.leaders().contains(d);
                co_leader
                    || (scores.get(*d) > 0
                        && scores.share(*d) >= config.supporting_min_confidence)
            })
            .collect(),
        None => BTreeSet::new(),
    };

    Ok(Classification {
        primary,
        supporting,
        confidence,
        explicit: explicit.is_some(),
        warnings,
    })
}

/// Intersect explicit supporting identifiers with the domain set minus
/// `primary`.
pub fn resolve_supporting(
    ids: &[String],
    primary: Domain,
    warnings: &mut Vec<String>,
) -> BTreeSet<Domain> {
    let mut supporting = BTreeSet::new();
    for id in ids {
        match id.parse::<Domain>() {
            Ok(domain) if domain != primary => {
                supporting.insert(domain);
            }
            Ok(_) => {}
            Err(_) => warnings.push(unknown_domain_warning(id)),
        }
    }
    supporting
}

/// Extract a domain from a free-form classification answer.
///
/// Takes the first word that names a domain.
pub fn parse_domain_answer(answer: &str) -> Option<Domain> {
    words(answer).find_map(|w| w.parse::<Domain>().ok())
}
