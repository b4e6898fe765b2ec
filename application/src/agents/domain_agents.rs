//! The four concrete domain agents and their closed dispatch enum.
//!
//! Each agent differs in its step limit and in when it considers a diagram
//! worth describing:
//!
//! | Agent | Max steps | Diagram when |
//! |-------|-----------|--------------|
//! | Business | 8 | 3 or more steps |
//! | Code | 8 | any step dependency, or 4 or more steps |
//! | Science | 10 | any step dependency |
//! | Technology | 10 | 2 or more steps |

use super::agent::{Agent, AgentCore, AgentError};
use crate::ports::text_generator::TextGenerator;
use async_trait::async_trait;
use ideaforge_domain::{AgentResult, DiagramSpec, Domain, Idea, ImplementationStep, Turn};
use std::sync::Arc;

fn has_dependency(steps: &[ImplementationStep]) -> bool {
    steps.iter().any(|s| s.depends_on.is_some())
}

/// Business strategist
pub struct BusinessAgent {
    core: AgentCore,
}

impl BusinessAgent {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: AgentCore::new(Domain::Business, generator, 8),
        }
    }
}

impl Agent for BusinessAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn warrants_diagram(&self, _idea: &Idea, steps: &[ImplementationStep]) -> bool {
        steps.len() >= 3
    }
}

/// Software architect
pub struct CodeAgent {
    core: AgentCore,
}

impl CodeAgent {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: AgentCore::new(Domain::Code, generator, 8),
        }
    }
}

impl Agent for CodeAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn warrants_diagram(&self, _idea: &Idea, steps: &[ImplementationStep]) -> bool {
        has_dependency(steps) || steps.len() >= 4
    }
}

/// Scientific researcher
pub struct ScienceAgent {
    core: AgentCore,
}

impl ScienceAgent {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: AgentCore::new(Domain::Science, generator, 10),
        }
    }
}

impl Agent for ScienceAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn warrants_diagram(&self, _idea: &Idea, steps: &[ImplementationStep]) -> bool {
        has_dependency(steps)
    }
}

/// Technology consultant
pub struct TechnologyAgent {
    core: AgentCore,
}

impl TechnologyAgent {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            core: AgentCore::new(Domain::Technology, generator, 10),
        }
    }
}

impl Agent for TechnologyAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn warrants_diagram(&self, _idea: &Idea, steps: &[ImplementationStep]) -> bool {
        steps.len() >= 2
    }
}

/// Closed set of agents, one variant per [`Domain`]
pub enum DomainAgent {
    Business(BusinessAgent),
    Code(CodeAgent),
    Science(ScienceAgent),
    Technology(TechnologyAgent),
}

impl DomainAgent {
    /// Build the agent for `domain`
    pub fn for_domain(domain: Domain, generator: Arc<dyn TextGenerator>) -> Self {
        match domain {
            Domain::Business => DomainAgent::Business(BusinessAgent::new(generator)),
            Domain::Code => DomainAgent::Code(CodeAgent::new(generator)),
            Domain::Science => DomainAgent::Science(ScienceAgent::new(generator)),
            Domain::Technology => DomainAgent::Technology(TechnologyAgent::new(generator)),
        }
    }

    fn inner(&self) -> &dyn Agent {
        match self {
            DomainAgent::Business(a) => a,
            DomainAgent::Code(a) => a,
            DomainAgent::Science(a) => a,
            DomainAgent::Technology(a) => a,
        }
    }
}

#[async_trait]
impl Agent for DomainAgent {
    fn core(&self) -> &AgentCore {
        self.inner().core()
    }

    fn warrants_diagram(&self, idea: &Idea, steps: &[ImplementationStep]) -> bool {
        self.inner().warrants_diagram(idea, steps)
    }

    async fn analyze(&self, idea: &Idea, context: &[Turn]) -> Result<AgentResult, AgentError> {
        self.inner().analyze(idea, context).await
    }

    async fn generate_steps(
        &self,
        idea: &Idea,
        context: &[Turn],
    ) -> Result<Vec<ImplementationStep>, AgentError> {
        self.inner().generate_steps(idea, context).await
    }

    async fn describe_diagram(
        &self,
        idea: &Idea,
        context: &[Turn],
    ) -> Result<Option<DiagramSpec>, AgentError> {
        self.inner().describe_diagram(idea, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::text_generator::{GenerationError, GenerationRequest};
    use ideaforge_domain::StepRef;
    use std::sync::Mutex;

    /// Answers by prompt kind and records every request
    struct ScriptedGenerator {
        analysis: String,
        steps: String,
        diagram: Result<String, GenerationError>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(analysis: &str, steps: &str, diagram: Result<&str, GenerationError>) -> Self {
            Self {
                analysis: analysis.to_string(),
                steps: steps.to_string(),
                diagram: diagram.map(str::to_string),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(request.clone());
            if request.prompt.contains("RELATED_CONCEPTS:") {
                Ok(self.analysis.clone())
            } else if request.prompt.contains("implementation steps") {
                Ok(self.steps.clone())
            } else {
                self.diagram.clone()
            }
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::Unavailable("connection refused".to_string()))
        }
    }

    const ANALYSIS: &str = "SUGGESTIONS:\n- a\n- b\n- c\n- d\n- e\n- f\nQUESTIONS:\n- why?\n";

    fn idea() -> Idea {
        Idea::new("idea-1", "Inventory app for bakeries", Domain::Code).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_builds_full_result() {
        let generator = Arc::new(ScriptedGenerator::new(
            ANALYSIS,
            "1. Model data\n2. Build API (depends on step 1)",
            Ok("TITLE: Flow\nUI -> API\nAPI -> DB"),
        ));
        let agent = CodeAgent::new(generator.clone());
        let context = vec![Turn::user("earlier idea text")];

        let result = agent.analyze(&idea(), &context).await.unwrap();

        assert_eq!(result.domain, Domain::Code);
        assert_eq!(result.suggestions.len(), 5);
        assert_eq!(result.questions, vec!["why?"]);
        assert_eq!(result.steps[1].depends_on, Some(StepRef::local(1)));
        assert_eq!(result.diagram.unwrap().title, "Flow");
        assert_eq!(generator.request_count(), 3);

        let requests = generator.requests.lock().unwrap();
        assert!(requests.iter().all(|r| r.context == context));
        assert!(requests[0].system_prompt.contains("software architect"));
    }

    #[tokio::test]
    async fn test_diagram_skipped_when_not_warranted() {
        let generator = Arc::new(ScriptedGenerator::new(ANALYSIS, "1. Only step", Ok("A -> B")));
        let agent = ScienceAgent::new(generator.clone());

        let result = agent.analyze(&idea(), &[]).await.unwrap();

        assert!(result.diagram.is_none());
        assert_eq!(generator.request_count(), 2);
    }

    #[tokio::test]
    async fn test_diagram_failure_degrades_to_none() {
        let generator = Arc::new(ScriptedGenerator::new(
            ANALYSIS,
            "1. a\n2. b",
            Err(GenerationError::Rejected("policy".to_string())),
        ));
        let agent = TechnologyAgent::new(generator);

        let result = agent.analyze(&idea(), &[]).await.unwrap();
        assert_eq!(result.steps.len(), 2);
        assert!(result.diagram.is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates_with_domain() {
        let agent = BusinessAgent::new(Arc::new(FailingGenerator));

        let err = agent.analyze(&idea(), &[]).await.unwrap_err();
        assert_eq!(
            err,
            AgentError::InvocationFailed {
                domain: Domain::Business,
                cause: GenerationError::Unavailable("connection refused".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_steps_are_capped() {
        let many = (1..=15).map(|i| format!("{i}. step {i}")).collect::<Vec<_>>().join("\n");
        let generator = Arc::new(ScriptedGenerator::new(ANALYSIS, &many, Ok("NONE")));
        let agent = BusinessAgent::new(generator);

        let steps = agent.generate_steps(&idea(), &[]).await.unwrap();
        assert_eq!(steps.len(), 8);
    }

    #[test]
    fn test_diagram_judgment_per_agent() {
        let generator: Arc<dyn TextGenerator> = Arc::new(FailingGenerator);
        let idea = idea();
        let two = vec![
            ImplementationStep::new(1, "a"),
            ImplementationStep::new(2, "b"),
        ];
        let linked = vec![
            ImplementationStep::new(1, "a"),
            ImplementationStep::new(2, "b").depends_on(StepRef::local(1)),
        ];

        let business = DomainAgent::for_domain(Domain::Business, generator.clone());
        let code = DomainAgent::for_domain(Domain::Code, generator.clone());
        let science = DomainAgent::for_domain(Domain::Science, generator.clone());
        let technology = DomainAgent::for_domain(Domain::Technology, generator);

        assert!(!business.warrants_diagram(&idea, &two));
        assert!(!code.warrants_diagram(&idea, &two));
        assert!(code.warrants_diagram(&idea, &linked));
        assert!(!science.warrants_diagram(&idea, &two));
        assert!(science.warrants_diagram(&idea, &linked));
        assert!(technology.warrants_diagram(&idea, &two));
        assert_eq!(technology.domain(), Domain::Technology);
    }
}
