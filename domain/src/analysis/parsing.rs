//! Agent response parsing.
//!
//! Pure text pattern matching that turns free-form model output into the
//! structured parts of an [`AgentResult`](super::result::AgentResult).
//!
//! | Function | Input shape |
//! |----------|-------------|
//! | [`parse_analysis`] | `SUGGESTIONS:` / `QUESTIONS:` / `RELATED_CONCEPTS:` sections with bullet items |
//! | [`parse_steps`] | Numbered lines, optionally ending in `(depends on [domain] step N)` |
//! | [`parse_diagram`] | Optional `TITLE:` line followed by `A -> B` lines, or `NONE` |

use super::result::{DiagramEdge, DiagramSpec, ImplementationStep, StepRef};
use crate::core::domain::Domain;
use regex::Regex;
use std::sync::LazyLock;

static DEPENDENCY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[(\[]\s*(?:depends\s+on|after)\s+(?:([a-z_]+)(?:'s)?\s+)?step\s+#?(\d+)\s*[)\]]",
    )
    .expect("DEPENDENCY_HINT is a compile-time constant")
});

static STEP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^step\s+\d+\s*[:.)\-]\s*")
        .expect("STEP_PREFIX is a compile-time constant")
});

/// Sections of an analysis response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisSections {
    pub suggestions: Vec<String>,
    pub questions: Vec<String>,
    pub related_concepts: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Suggestions,
    Questions,
    RelatedConcepts,
}

fn section_header(line: &str) -> Option<Section> {
    let normalized = line
        .trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim_end_matches(':')
        .trim()
        .to_uppercase()
        .replace([' ', '-'], "_");

    match normalized.as_str() {
        "SUGGESTIONS" => Some(Section::Suggestions),
        "QUESTIONS" => Some(Section::Questions),
        "RELATED_CONCEPTS" | "CONCEPTS" => Some(Section::RelatedConcepts),
        _ => None,
    }
}

/// Strip a bullet or numbering marker, returning the item text.
///
/// Returns `None` for lines that are not list items.
fn strip_list_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim();

    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return non_empty(rest);
        }
    }

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return non_empty(rest);
        }
    }

    if let Some(m) = STEP_PREFIX.find(trimmed) {
        return non_empty(&trimmed[m.end()..]);
    }

    None
}

fn non_empty(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

/// Parse an analysis response into its sections.
///
/// Items before any recognized header are treated as suggestions.
pub fn parse_analysis(response: &str) -> AnalysisSections {
    let mut sections = AnalysisSections::default();
    let mut current = Section::Suggestions;

    for line in response.lines() {
        if let Some(section) = section_header(line) {
            current = section;
            continue;
        }
        let Some(item) = strip_list_marker(line) else {
            continue;
        };
        let target = match current {
            Section::Suggestions => &mut sections.suggestions,
            Section::Questions => &mut sections.questions,
            Section::RelatedConcepts => &mut sections.related_concepts,
        };
        target.push(item.to_string());
    }

    sections
}

/// Parse implementation steps produced by the agent for `owner`.
///
/// Steps are numbered 1.. in the order they appear, regardless of the
/// numbers written in the text. Dependency hints naming the owner (or no
/// domain) must point at an earlier step; other hints are dropped. When the
/// response has no list items, every non-empty line becomes a step.
pub fn parse_steps(response: &str, owner: Domain) -> Vec<ImplementationStep> {
    let mut items: Vec<&str> = response.lines().filter_map(strip_list_marker).collect();
    if items.is_empty() {
        items = response
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && section_header(l).is_none())
            .collect();
    }

    items
        .into_iter()
        .map(split_dependency)
        .filter(|(description, _)| !description.is_empty())
        .enumerate()
        .map(|(i, (description, hint))| {
            let index = i + 1;
            let depends_on = hint.and_then(|(domain, target)| match domain {
                Some(d) if d != owner => Some(StepRef::in_domain(d, target)),
                _ if target < index => Some(StepRef::local(target)),
                _ => None,
            });
            ImplementationStep {
                index,
                description,
                depends_on,
            }
        })
        .collect()
}

/// Remove a dependency hint from `item`.
///
/// Returns the cleaned description and, when the hint names a known domain
/// (or none) and a positive step number, the raw `(domain, step)` pair.
fn split_dependency(item: &str) -> (String, Option<(Option<Domain>, usize)>) {
    let Some(captures) = DEPENDENCY_HINT.captures(item) else {
        return (item.trim().to_string(), None);
    };

    let whole = captures.get(0).map(|m| m.range()).unwrap_or(0..0);
    let mut description = String::with_capacity(item.len());
    description.push_str(&item[..whole.start]);
    description.push_str(&item[whole.end..]);
    let description = description.trim().to_string();

    let target = captures
        .get(2)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|n| *n > 0);
    let domain = match captures.get(1) {
        Some(name) => match name.as_str().parse::<Domain>() {
            Ok(domain) => Some(Some(domain)),
            Err(_) => None,
        },
        None => Some(None),
    };

    let hint = match (domain, target) {
        (Some(domain), Some(target)) => Some((domain, target)),
        _ => None,
    };
    (description, hint)
}

/// Parse diagram edges from `A -> B` lines.
///
/// Chains such as `A -> B -> C` produce one edge per hop. Self-loops and
/// repeated edges are dropped.
pub fn parse_diagram_edges(response: &str) -> Vec<DiagramEdge> {
    let mut edges: Vec<DiagramEdge> = Vec::new();

    for line in response.lines() {
        let line = strip_list_marker(line).unwrap_or_else(|| line.trim());
        if !line.contains("->") {
            continue;
        }
        let nodes: Vec<&str> = line
            .split("->")
            .map(|n| n.trim().trim_matches(|c: char| c == '"' || c == '`' || c == '\''))
            .collect();
        if nodes.iter().any(|n| n.is_empty()) {
            continue;
        }
        for pair in nodes.windows(2) {
            if pair[0] == pair[1] {
                continue;
            }
            let edge = DiagramEdge::new(pair[0], pair[1]);
            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    edges
}

/// Parse a diagram description, or `None` when the agent declined one.
pub fn parse_diagram(response: &str, default_title: &str) -> Option<DiagramSpec> {
    let trimmed = response.trim();
    if trimmed.is_empty() || trimmed.to_uppercase().starts_with("NONE") {
        return None;
    }

    let title = trimmed
        .lines()
        .find_map(|l| {
            let l = l.trim();
            l.get(..6)
                .filter(|prefix| prefix.eq_ignore_ascii_case("title:"))
                .map(|_| l[6..].trim().to_string())
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_title.to_string());

    let edges = parse_diagram_edges(trimmed);
    if edges.is_empty() {
        return None;
    }
    Some(DiagramSpec::new(title, edges))
}
