//! Console output formatter for consensus results

use colored::Colorize;
use ideaforge_application::{AdvanceOutput, HistoryEntry};
use ideaforge_domain::{ConsensusResult, Idea, IdeaStage, MergedItem};
use serde::Serialize;

use crate::cli::commands::OutputFormat;

/// Number of suggestions shown by the summary format
const SUMMARY_SUGGESTIONS: usize = 3;

/// Shape of `-o json` output
#[derive(Serialize)]
struct JsonOutput<'a> {
    idea_id: &'a str,
    stage: IdeaStage,
    created: bool,
    consensus: &'a ConsensusResult,
}

/// Formats consensus results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a dialogue turn in the requested format
    pub fn render(output: &AdvanceOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(&output.idea, &output.consensus),
            OutputFormat::Summary => Self::format_summary(&output.idea, &output.consensus),
            OutputFormat::Json => Self::format_json(output),
        }
    }

    /// Format every merged section
    pub fn format(idea: &Idea, result: &ConsensusResult) -> String {
        let mut output = String::new();
        let n = result.contributing.len();

        output.push_str(&Self::header("Idea Consensus"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Idea:".cyan().bold(),
            idea.description()
        ));
        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), idea.id()));
        output.push_str(&format!(
            "{} {}\n",
            "Domains:".cyan().bold(),
            Self::domain_list(result)
        ));

        if !result.excluded.is_empty() {
            let excluded: Vec<String> = result
                .excluded
                .iter()
                .map(|e| format!("{} ({})", e.domain, e.reason))
                .collect();
            output.push_str(&format!(
                "{} {}\n",
                "Excluded:".red().bold(),
                excluded.join(", ")
            ));
        }

        Self::push_items(&mut output, "Suggestions", &result.suggestions, n);
        Self::push_items(&mut output, "Questions", &result.questions, n);
        Self::push_items(&mut output, "Related Concepts", &result.related_concepts, n);

        if !result.steps.is_empty() {
            output.push_str(&Self::section_header("Implementation Plan"));
            for step in &result.steps {
                let after = step
                    .after
                    .map(|a| format!(" {}", format!("(after {})", a).dimmed()))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  {:>2}. {} {}{}\n",
                    step.sequence,
                    format!("[{}]", step.domain).yellow(),
                    step.description,
                    after
                ));
            }
        }

        if let Some(diagram) = &result.diagram {
            output.push_str(&Self::section_header(&format!(
                "Diagram: {} ({})",
                diagram.spec.title, diagram.domain
            )));
            output.push_str(&Self::indent(&diagram.spec.to_edge_list(), "  "));
            output.push('\n');
            if let Some(image) = &diagram.image {
                output.push_str(&format!("  {} {}\n", "Rendered:".green(), image));
            }
        }

        Self::push_warnings(&mut output, result);
        output.push_str(&Self::footer());

        output
    }

    /// Format top suggestions and the plan (concise output)
    pub fn format_summary(idea: &Idea, result: &ConsensusResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Idea Consensus ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n", "Idea:".bold(), idea.description()));
        output.push_str(&format!(
            "{} {}\n\n",
            "Experts consulted:".dimmed(),
            Self::domain_list(result)
        ));

        let n = result.contributing.len();
        for item in result.suggestions.iter().take(SUMMARY_SUGGESTIONS) {
            output.push_str(&format!("  {} {}\n", item.vote_summary(n), item.text));
        }

        if !result.steps.is_empty() {
            output.push_str(&format!("\n{}\n", "Plan:".bold()));
            for step in &result.steps {
                output.push_str(&format!("  {}. {}\n", step.sequence, step.description));
            }
        }

        if let Some(image) = result.diagram.as_ref().and_then(|d| d.image.as_ref()) {
            output.push_str(&format!("\n{} {}\n", "Diagram:".bold(), image));
        }

        Self::push_warnings(&mut output, result);
        output
    }

    /// Format as JSON
    pub fn format_json(output: &AdvanceOutput) -> String {
        let json = JsonOutput {
            idea_id: output.idea.id().as_str(),
            stage: output.idea.stage(),
            created: output.created,
            consensus: &output.consensus,
        };
        serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format an idea's consensus history, oldest first
    pub fn format_history(idea: &Idea, entries: &[HistoryEntry]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Idea History"));
        output.push('\n');
        output.push_str(&format!(
            "{} {} [{}]\n",
            "Idea:".cyan().bold(),
            idea.description(),
            idea.stage()
        ));

        if entries.is_empty() {
            output.push_str(&format!("\n{}\n", "No consensus recorded yet.".dimmed()));
        }

        for (i, entry) in entries.iter().enumerate() {
            let result = &entry.result;
            let when = chrono::DateTime::from_timestamp_millis(entry.recorded_at_ms as i64)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| entry.recorded_at_ms.to_string());

            output.push_str(&format!(
                "\n{} {}  {}\n",
                format!("#{}", i + 1).yellow().bold(),
                when.dimmed(),
                Self::domain_list(result)
            ));
            if let Some(top) = result.suggestions.first() {
                output.push_str(&format!(
                    "  {} {}\n",
                    top.vote_summary(result.contributing.len()),
                    top.text
                ));
            }
            output.push_str(&format!(
                "  {} suggestions, {} questions, {} steps\n",
                result.suggestions.len(),
                result.questions.len(),
                result.steps.len()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    fn domain_list(result: &ConsensusResult) -> String {
        result
            .contributing
            .iter()
            .map(|d| {
                if *d == result.primary {
                    format!("{} (primary)", d)
                } else {
                    d.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn push_items(output: &mut String, title: &str, items: &[MergedItem], contributing: usize) {
        if items.is_empty() {
            return;
        }
        output.push_str(&Self::section_header(title));
        for item in items {
            let domains: Vec<&str> = item.domains.iter().map(|d| d.as_str()).collect();
            let votes = if item.is_unanimous(contributing) {
                item.vote_summary(contributing).green()
            } else {
                item.vote_summary(contributing).normal()
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                votes,
                item.text,
                format!("({})", domains.join(", ")).dimmed()
            ));
        }
    }

    fn push_warnings(output: &mut String, result: &ConsensusResult) {
        if result.warnings.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", "Warnings:".yellow().bold()));
        for warning in &result.warnings {
            output.push_str(&format!("  * {}\n", warning));
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideaforge_domain::{
        DiagramEdge, DiagramSpec, Domain, ExcludedDomain, IdeaId, ImageReference, MergedStep,
        SelectedDiagram,
    };

    fn item(text: &str, votes: usize, domains: Vec<Domain>) -> MergedItem {
        MergedItem {
            text: text.to_string(),
            votes,
            confidence: votes as f64 / 2.0,
            domains,
        }
    }

    fn sample() -> (Idea, ConsensusResult) {
        colored::control::set_override(false);
        let idea = Idea::new("idea-1", "Offline-first recipe app", Domain::Code).unwrap();
        let result = ConsensusResult {
            idea_id: IdeaId::new("idea-1"),
            primary: Domain::Code,
            contributing: vec![Domain::Code, Domain::Business],
            excluded: vec![ExcludedDomain::timed_out(Domain::Science)],
            suggestions: vec![
                item("Sync with CRDTs", 2, vec![Domain::Code, Domain::Business]),
                item("Charge per household", 1, vec![Domain::Business]),
            ],
            questions: vec![item("Who curates recipes?", 1, vec![Domain::Business])],
            related_concepts: vec![],
            steps: vec![
                MergedStep {
                    sequence: 1,
                    domain: Domain::Code,
                    source_index: 1,
                    description: "Model recipes".to_string(),
                    after: None,
                },
                MergedStep {
                    sequence: 2,
                    domain: Domain::Business,
                    source_index: 1,
                    description: "Price tiers".to_string(),
                    after: Some(1),
                },
            ],
            diagram: Some(SelectedDiagram {
                domain: Domain::Code,
                spec: DiagramSpec::new("Sync", vec![DiagramEdge::new("Phone", "Server")]),
                image: Some(ImageReference::new("/tmp/sync.dot")),
            }),
            warnings: vec!["Domain science timed out".to_string()],
        };
        (idea, result)
    }

    #[test]
    fn test_full_format_lists_every_section() {
        let (idea, result) = sample();
        let text = ConsoleFormatter::format(&idea, &result);

        assert!(text.contains("Domains: code (primary), business"));
        assert!(text.contains("Excluded: science (timed out)"));
        assert!(text.contains("[●●] Sync with CRDTs (code, business)"));
        assert!(text.contains("[●○] Charge per household (business)"));
        assert!(text.contains("Questions"));
        assert!(!text.contains("Related Concepts"));
        assert!(text.contains(" 2. [business] Price tiers (after 1)"));
        assert!(text.contains("Phone -> Server"));
        assert!(text.contains("Rendered: /tmp/sync.dot"));
        assert!(text.contains("* Domain science timed out"));
    }

    #[test]
    fn test_summary_format_is_concise() {
        let (idea, result) = sample();
        let text = ConsoleFormatter::format_summary(&idea, &result);

        assert!(text.contains("[●●] Sync with CRDTs"));
        assert!(text.contains("1. Model recipes"));
        assert!(text.contains("Diagram: /tmp/sync.dot"));
        assert!(!text.contains("Who curates recipes?"));
    }

    #[test]
    fn test_json_format_wraps_consensus() {
        let (idea, consensus) = sample();
        let output = AdvanceOutput {
            idea,
            consensus,
            created: true,
        };

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::render(&output, OutputFormat::Json)).unwrap();

        assert_eq!(json["idea_id"], "idea-1");
        assert_eq!(json["stage"], "initial");
        assert_eq!(json["created"], true);
        assert_eq!(json["consensus"]["contributing"][0], "code");
        assert_eq!(json["consensus"]["warnings"][0], "Domain science timed out");
    }

    #[test]
    fn test_history_format() {
        let (idea, result) = sample();
        let entries = vec![HistoryEntry {
            recorded_at_ms: 0,
            result,
        }];

        let text = ConsoleFormatter::format_history(&idea, &entries);
        assert!(text.contains("#1 1970-01-01 00:00:00"));
        assert!(text.contains("2 suggestions, 1 questions, 2 steps"));

        let empty = ConsoleFormatter::format_history(&idea, &[]);
        assert!(empty.contains("No consensus recorded yet."));
    }
}
