//! REPL (Read-Eval-Print Loop) for interactive dialogue

use crate::ConsoleFormatter;
use crate::OutputFormat;
use crate::{ProgressReporter, SimpleProgress};
use colored::Colorize;
use ideaforge_application::{AdvanceError, AdvanceRequest, DialogueController, NoProgress};
use ideaforge_domain::{Domain, IdeaId};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

/// A parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    New,
    Domains,
    Primary(Domain),
    Support(Vec<Domain>),
    History,
    Archive,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a line starting with `/`
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match name {
            "/new" => Ok(ReplCommand::New),
            "/domains" => Ok(ReplCommand::Domains),
            "/primary" => {
                if arg.is_empty() {
                    return Err("Usage: /primary <domain>".to_string());
                }
                arg.parse().map(ReplCommand::Primary).map_err(|e| {
                    format!("{} (valid: {})", e, Domain::valid_identifiers())
                })
            }
            "/support" => {
                if arg.is_empty() {
                    return Err("Usage: /support <domain,...>".to_string());
                }
                arg.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<Domain>())
                    .collect::<Result<Vec<_>, _>>()
                    .map(ReplCommand::Support)
                    .map_err(|e| format!("{} (valid: {})", e, Domain::valid_identifiers()))
            }
            "/history" => Ok(ReplCommand::History),
            "/archive" => Ok(ReplCommand::Archive),
            "/help" | "/h" | "/?" => Ok(ReplCommand::Help),
            "/quit" | "/exit" | "/q" => Ok(ReplCommand::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

/// Interactive dialogue REPL
///
/// Keeps one idea across turns until `/new` or `/archive`.
pub struct ChatRepl {
    controller: Arc<DialogueController>,
    format: OutputFormat,
    show_progress: bool,
    history_file: Option<PathBuf>,
    current: Option<IdeaId>,
    primary: Option<Domain>,
    supporting: Option<Vec<Domain>>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(controller: Arc<DialogueController>) -> Self {
        Self {
            controller,
            format: OutputFormat::Summary,
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("ideaforge").join("repl_history.txt")),
            current: None,
            primary: None,
            supporting: None,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_history_file(mut self, path: PathBuf) -> Self {
        self.history_file = Some(path);
        self
    }

    /// Continue an existing idea instead of starting fresh
    pub fn with_idea(mut self, id: IdeaId) -> Self {
        self.current = Some(id);
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let prompt = if self.current.is_some() { "idea> " } else { "new> " };

            match rl.readline(prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match ReplCommand::parse(line) {
                            Ok(command) => {
                                if self.handle_command(command).await {
                                    break;
                                }
                            }
                            Err(message) => {
                                println!("{}", message);
                                println!("Type /help for available commands");
                            }
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_turn(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          ideaforge - Dialogue Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Describe an idea, then keep refining it turn by turn.");
        if let Some(id) = &self.current {
            println!("Continuing idea {}", id);
        }
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /new               - Start a new idea");
        println!("  /domains           - Show the current domains");
        println!("  /primary <d>       - Set the primary domain for the next turn");
        println!("  /support <d,...>   - Set supporting domains for the next turn");
        println!("  /history           - Show the idea's consensus history");
        println!("  /archive           - Archive the idea and start fresh");
        println!("  /help, /h, /?      - Show this help");
        println!("  /quit, /exit, /q   - Exit");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::New => {
                self.reset();
                println!("Starting a new idea.");
            }
            ReplCommand::Primary(domain) => {
                self.primary = Some(domain);
                println!("Primary domain for the next turn: {}", domain);
            }
            ReplCommand::Support(domains) => {
                let names: Vec<&str> = domains.iter().map(Domain::as_str).collect();
                println!("Supporting domains for the next turn: {}", names.join(", "));
                self.supporting = Some(domains);
            }
            ReplCommand::Domains => self.show_domains().await,
            ReplCommand::History => {
                let Some(id) = self.current.clone() else {
                    println!("No idea yet.");
                    return false;
                };
                match self.controller.load(&id).await {
                    Ok((idea, _)) => match self.controller.history(&id).await {
                        Ok(entries) => {
                            println!("{}", ConsoleFormatter::format_history(&idea, &entries))
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    },
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            ReplCommand::Archive => {
                let Some(id) = self.current.clone() else {
                    println!("No idea yet.");
                    return false;
                };
                match self.controller.archive(&id).await {
                    Ok(_) => {
                        println!("Archived idea {}.", id);
                        self.reset();
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        false
    }

    async fn show_domains(&self) {
        println!();
        if let Some(id) = &self.current {
            match self.controller.load(id).await {
                Ok((idea, _)) => {
                    println!("Primary:    {}", idea.primary());
                    let supporting: Vec<&str> =
                        idea.supporting().iter().map(Domain::as_str).collect();
                    println!("Supporting: {}", supporting.join(", "));
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
        if let Some(primary) = self.primary {
            println!("Next turn primary:    {}", primary);
        }
        if let Some(supporting) = &self.supporting {
            let names: Vec<&str> = supporting.iter().map(Domain::as_str).collect();
            println!("Next turn supporting: {}", names.join(", "));
        }
        println!("Available: {}", Domain::valid_identifiers());
        println!();
    }

    fn reset(&mut self) {
        self.current = None;
        self.primary = None;
        self.supporting = None;
    }

    fn request(&self, text: &str) -> AdvanceRequest {
        let mut request = AdvanceRequest::new(text);
        if let Some(id) = &self.current {
            request = request.for_idea(id.clone());
        }
        if let Some(primary) = self.primary {
            request = request.with_primary(primary.as_str());
        }
        if let Some(supporting) = &self.supporting {
            request = request.with_supporting(supporting.iter().map(Domain::as_str));
        }
        request
    }

    async fn process_turn(&mut self, text: &str) {
        println!();

        let request = self.request(text);
        let result = if !self.show_progress {
            self.controller
                .advance_with_progress(request, &NoProgress)
                .await
        } else if std::io::stderr().is_terminal() {
            let progress = ProgressReporter::new();
            self.controller.advance_with_progress(request, &progress).await
        } else {
            self.controller
                .advance_with_progress(request, &SimpleProgress)
                .await
        };

        match result {
            Ok(output) => {
                println!("{}", ConsoleFormatter::render(&output, self.format));
                self.current = Some(output.idea.id().clone());
                self.primary = None;
                self.supporting = None;
            }
            Err(e) if e.is_ambiguous() => {
                eprintln!("{}", e);
                eprintln!("Pick one with /primary <domain> and send the idea again.");
            }
            Err(AdvanceError::IdeaArchived(id)) => {
                eprintln!("Idea {} is archived. Use /new to start another.", id);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ReplCommand::parse("/new"), Ok(ReplCommand::New));
        assert_eq!(ReplCommand::parse("/domains"), Ok(ReplCommand::Domains));
        assert_eq!(ReplCommand::parse("/history"), Ok(ReplCommand::History));
        assert_eq!(ReplCommand::parse("/archive"), Ok(ReplCommand::Archive));
        assert_eq!(ReplCommand::parse("/?"), Ok(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/exit"), Ok(ReplCommand::Quit));
    }

    #[test]
    fn test_parse_primary() {
        assert_eq!(
            ReplCommand::parse("/primary Tech"),
            Ok(ReplCommand::Primary(Domain::Technology))
        );

        let err = ReplCommand::parse("/primary astrology").unwrap_err();
        assert!(err.contains("astrology"));
        assert!(err.contains("business, code, science, technology"));

        assert!(ReplCommand::parse("/primary").is_err());
    }

    #[test]
    fn test_parse_support_list() {
        assert_eq!(
            ReplCommand::parse("/support business, hard_science"),
            Ok(ReplCommand::Support(vec![Domain::Business, Domain::Science]))
        );
        assert!(ReplCommand::parse("/support code,nope").is_err());
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = ReplCommand::parse("/models").unwrap_err();
        assert_eq!(err, "Unknown command: /models");
    }
}
