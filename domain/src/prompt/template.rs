//! Prompt templates for domain agents

use crate::core::domain::Domain;
use crate::idea::Idea;

/// Templates for generating prompts at each agent capability
pub struct PromptTemplate;

impl PromptTemplate {
    /// Expert persona and focus areas for a domain
    pub fn domain_system(domain: Domain) -> &'static str {
        match domain {
            Domain::Business => {
                r#"You are a business strategist and entrepreneurship consultant.
Focus on:
- Market analysis and positioning
- Business model viability
- Revenue streams and pricing
- Growth strategy and scaling
- Competitive advantage"#
            }
            Domain::Code => {
                r#"You are a software architect and development expert.
Focus on:
- Code architecture and design patterns
- Implementation best practices
- Testing and quality assurance
- Performance optimization
- Security considerations"#
            }
            Domain::Science => {
                r#"You are a scientific researcher and methodology expert.
Focus on:
- Experimental design and methodology
- Data collection and analysis
- Empirical evidence and validation
- Research implications and applications
- Scientific rigor and reproducibility"#
            }
            Domain::Technology => {
                r#"You are a technology expert and innovation consultant.
Focus on:
- Technical feasibility and implementation
- System architecture and integration
- Scalability and performance
- User experience and interface design
- Technology stack selection"#
            }
        }
    }

    fn idea_header(idea: &Idea) -> String {
        let mut header = format!("Idea: {}", idea.description());
        if !idea.keywords().is_empty() {
            header.push_str(&format!("\nKeywords: {}", idea.keywords().join(", ")));
        }
        header
    }

    /// User prompt for the analysis capability
    pub fn analysis_prompt(domain: Domain, idea: &Idea, limit: usize) -> String {
        format!(
            r#"{}

Analyze this idea from the {} perspective.
Respond with exactly these sections, each a bullet list of at most {} short items:

SUGGESTIONS:
- concrete recommendations

QUESTIONS:
- probing questions the author should answer

RELATED_CONCEPTS:
- concepts, methods or readings worth exploring"#,
            Self::idea_header(idea),
            domain.display_name(),
            limit
        )
    }

    /// User prompt for the step generation capability
    pub fn steps_prompt(domain: Domain, idea: &Idea, max_steps: usize) -> String {
        format!(
            r#"{}

List at most {} ordered implementation steps from the {} perspective, one per line, numbered "1.", "2.", ...
When a step must wait for an earlier one, end it with "(depends on step N)".
When it must wait for work another expert would do, end it with "(depends on <business|code|science|technology> step N)"."#,
            Self::idea_header(idea),
            max_steps,
            domain.display_name()
        )
    }

    /// User prompt for the diagram description capability
    pub fn diagram_prompt(domain: Domain, idea: &Idea) -> String {
        format!(
            r#"{}

If a diagram would help explain this idea from the {} perspective, describe it as:

TITLE: <short title>
<node> -> <node>
<node> -> <node>

Use one edge per line. If no diagram is warranted, reply with NONE."#,
            Self::idea_header(idea),
            domain.display_name()
        )
    }

    /// System prompt for the classification fallback
    pub fn classification_system() -> &'static str {
        "You route ideas to exactly one expert. Answer with a single word."
    }

    /// User prompt for the classification fallback
    pub fn classification_prompt(text: &str) -> String {
        format!(
            r#"Which single domain best fits this idea?

{}

Choose one of: {}"#,
            text,
            Domain::valid_identifiers()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea() -> Idea {
        Idea::new("idea-1", "Solar-powered soil sensors", Domain::Technology)
            .unwrap()
            .with_keywords(vec!["solar".into(), "soil".into()])
    }

    #[test]
    fn test_domain_system_prompts_are_distinct() {
        let prompts: Vec<&str> = Domain::ALL.iter().map(|d| PromptTemplate::domain_system(*d)).collect();
        for (i, a) in prompts.iter().enumerate() {
            assert!(a.contains("Focus on:"));
            for b in &prompts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_analysis_prompt_includes_idea_and_sections() {
        let prompt = PromptTemplate::analysis_prompt(Domain::Science, &idea(), 5);
        assert!(prompt.contains("Solar-powered soil sensors"));
        assert!(prompt.contains("Keywords: solar, soil"));
        assert!(prompt.contains("RELATED_CONCEPTS:"));
        assert!(prompt.contains("Science perspective"));
    }

    #[test]
    fn test_steps_prompt_describes_dependency_hints() {
        let prompt = PromptTemplate::steps_prompt(Domain::Code, &idea(), 8);
        assert!(prompt.contains("at most 8"));
        assert!(prompt.contains("(depends on step N)"));
    }

    #[test]
    fn test_classification_prompt_lists_domains() {
        let prompt = PromptTemplate::classification_prompt("a thing");
        assert!(prompt.contains("business, code, science, technology"));
    }
}
