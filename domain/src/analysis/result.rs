//! Per-agent result bundle
//!
//! An [`AgentResult`] is produced by exactly one agent for one request and
//! is never mutated after the agent returns it.

use crate::core::domain::Domain;
use serde::{Deserialize, Serialize};

/// Reference from one step to the step it waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRef {
    /// Owning domain of the referenced step; `None` means the same agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    /// 1-based index within the referenced agent's steps
    pub index: usize,
}

impl StepRef {
    pub fn local(index: usize) -> Self {
        Self {
            domain: None,
            index,
        }
    }

    pub fn in_domain(domain: Domain, index: usize) -> Self {
        Self {
            domain: Some(domain),
            index,
        }
    }

    /// Domain the reference points into, given the owner of the step
    pub fn target_domain(&self, owner: Domain) -> Domain {
        self.domain.unwrap_or(owner)
    }
}

/// One action item produced by an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationStep {
    /// 1-based position within the producing agent's steps
    pub index: usize,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<StepRef>,
}

impl ImplementationStep {
    pub fn new(index: usize, description: impl Into<String>) -> Self {
        Self {
            index,
            description: description.into(),
            depends_on: None,
        }
    }

    pub fn depends_on(mut self, reference: StepRef) -> Self {
        self.depends_on = Some(reference);
        self
    }
}

/// Directed edge of a diagram
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
}

impl DiagramEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Structured diagram description handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub title: String,
    pub edges: Vec<DiagramEdge>,
}

impl DiagramSpec {
    pub fn new(title: impl Into<String>, edges: Vec<DiagramEdge>) -> Self {
        Self {
            title: title.into(),
            edges,
        }
    }

    /// Node labels in first-appearance order
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = Vec::new();
        for edge in &self.edges {
            for label in [edge.from.as_str(), edge.to.as_str()] {
                if !nodes.contains(&label) {
                    nodes.push(label);
                }
            }
        }
        nodes
    }

    /// `A -> B` lines, the textual form agents produce
    pub fn to_edge_list(&self) -> String {
        self.edges
            .iter()
            .map(|e| format!("{} -> {}", e.from, e.to))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Everything one agent produced for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub domain: Domain,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub related_concepts: Vec<String>,
    #[serde(default)]
    pub steps: Vec<ImplementationStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<DiagramSpec>,
}

impl AgentResult {
    /// An empty but valid result
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            suggestions: Vec::new(),
            questions: Vec::new(),
            related_concepts: Vec::new(),
            steps: Vec::new(),
            diagram: None,
        }
    }

    pub fn with_suggestions<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.suggestions = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_questions<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.questions = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_related_concepts<S: Into<String>>(
        mut self,
        items: impl IntoIterator<Item = S>,
    ) -> Self {
        self.related_concepts = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_steps(mut self, steps: Vec<ImplementationStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_diagram(mut self, diagram: Option<DiagramSpec>) -> Self {
        self.diagram = diagram;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
            && self.questions.is_empty()
            && self.related_concepts.is_empty()
            && self.steps.is_empty()
            && self.diagram.is_none()
    }

    /// Short transcript entry for the dialogue context
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(first) = self.suggestions.first() {
            parts.push(format!("suggests: {first}"));
        }
        if let Some(first) = self.questions.first() {
            parts.push(format!("asks: {first}"));
        }
        if !self.steps.is_empty() {
            parts.push(format!("{} steps", self.steps.len()));
        }
        if parts.is_empty() {
            "no findings".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ref_target_domain() {
        assert_eq!(StepRef::local(2).target_domain(Domain::Code), Domain::Code);
        assert_eq!(
            StepRef::in_domain(Domain::Business, 1).target_domain(Domain::Code),
            Domain::Business
        );
    }

    #[test]
    fn test_diagram_nodes_in_first_appearance_order() {
        let spec = DiagramSpec::new(
            "Flow",
            vec![
                DiagramEdge::new("Client", "API"),
                DiagramEdge::new("API", "Cache"),
                DiagramEdge::new("Client", "Cache"),
            ],
        );
        assert_eq!(spec.nodes(), vec!["Client", "API", "Cache"]);
        assert_eq!(
            spec.to_edge_list(),
            "Client -> API\nAPI -> Cache\nClient -> Cache"
        );
    }

    #[test]
    fn test_summary() {
        let result = AgentResult::new(Domain::Code)
            .with_suggestions(["Add caching layer"])
            .with_steps(vec![ImplementationStep::new(1, "Set up repo")]);
        assert_eq!(result.summary(), "suggests: Add caching layer; 1 steps");
        assert_eq!(AgentResult::new(Domain::Code).summary(), "no findings");
        assert!(AgentResult::new(Domain::Science).is_empty());
    }
}
