//! Consensus merge
//!
//! Deterministic grouping and ranking of per-agent results:
//!
//! 1. Contributing domains are ordered by precedence (primary first, then
//!    enumeration order).
//! 2. Suggestions, questions and related concepts are grouped by
//!    [`similarity_key`]. Each group gets one vote per contributing domain.
//!    Groups are ranked by votes, descending; ties keep first-appearance
//!    order, which follows domain precedence.
//! 3. Steps are interleaved by [`interleave_steps`].
//! 4. The diagram of the highest-precedence domain that proposed one is
//!    selected.
//!
//! With a single contributing domain every list passes through unchanged.

use super::plan::interleave_steps;
use super::result::{ConsensusResult, MergedItem, SelectedDiagram};
use crate::analysis::result::AgentResult;
use crate::core::domain::Domain;
use crate::core::error::DomainError;
use crate::core::string::similarity_key;
use crate::idea::Idea;
use std::collections::{BTreeMap, HashMap};

/// Merge the results of every contributing domain into one response.
///
/// Excluded domains are not known here; callers attach them with
/// [`ConsensusResult::with_exclusions`].
pub fn merge(
    idea: &Idea,
    results: &BTreeMap<Domain, AgentResult>,
) -> Result<ConsensusResult, DomainError> {
    if results.is_empty() {
        return Err(DomainError::NoContributingDomains);
    }

    let primary = idea.primary();
    let mut contributing: Vec<Domain> = results.keys().copied().collect();
    Domain::sort_by_precedence(&mut contributing, primary);

    let ordered: Vec<&AgentResult> = contributing
        .iter()
        .filter_map(|d| results.get(d))
        .collect();

    let suggestions = merge_field(&ordered, |r| r.suggestions.as_slice());
    let questions = merge_field(&ordered, |r| r.questions.as_slice());
    let related_concepts = merge_field(&ordered, |r| r.related_concepts.as_slice());

    let (steps, warnings) = interleave_steps(&ordered)?;

    let diagram = ordered.iter().find_map(|r| {
        r.diagram.as_ref().map(|spec| SelectedDiagram {
            domain: r.domain,
            spec: spec.clone(),
            image: None,
        })
    });

    Ok(ConsensusResult {
        idea_id: idea.id().clone(),
        primary,
        contributing,
        excluded: Vec::new(),
        suggestions,
        questions,
        related_concepts,
        steps,
        diagram,
        warnings,
    })
}

fn merge_field<F>(ordered: &[&AgentResult], select: F) -> Vec<MergedItem>
where
    F: for<'r> Fn(&'r AgentResult) -> &'r [String],
{
    let lists: Vec<(Domain, &[String])> = ordered.iter().map(|r| (r.domain, select(r))).collect();
    match lists.as_slice() {
        [(domain, items)] => pass_through(*domain, items),
        _ => group_items(&lists),
    }
}

fn pass_through(domain: Domain, items: &[String]) -> Vec<MergedItem> {
    items
        .iter()
        .map(|text| MergedItem {
            text: text.clone(),
            votes: 1,
            confidence: 1.0,
            domains: vec![domain],
        })
        .collect()
}

fn group_items(lists: &[(Domain, &[String])]) -> Vec<MergedItem> {
    let total = lists.len();
    let mut groups: Vec<MergedItem> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (domain, items) in lists {
        for text in items.iter() {
            let key = similarity_key(text);
            if key.is_empty() {
                continue;
            }
            match by_key.get(&key) {
                Some(&i) => {
                    let group = &mut groups[i];
                    if !group.domains.contains(domain) {
                        group.domains.push(*domain);
                        group.votes += 1;
                    }
                }
                None => {
                    by_key.insert(key, groups.len());
                    groups.push(MergedItem {
                        text: text.trim().to_string(),
                        votes: 1,
                        confidence: 0.0,
                        domains: vec![*domain],
                    });
                }
            }
        }
    }

    for group in &mut groups {
        group.confidence = group.votes as f64 / total as f64;
    }
    // Stable: equal votes keep first-appearance order
    groups.sort_by(|a, b| b.votes.cmp(&a.votes));
    groups
}
