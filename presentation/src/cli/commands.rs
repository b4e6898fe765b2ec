//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for consensus results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every merged section with votes and contributing domains
    Full,
    /// Top suggestions and the plan
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for ideaforge
#[derive(Parser, Debug)]
#[command(name = "ideaforge")]
#[command(author, version, about = "Develop ideas with a panel of domain experts")]
#[command(long_about = r#"
ideaforge routes an idea to business, code, science and technology experts,
runs them side by side and merges their answers into one consensus:
ranked suggestions, open questions, related concepts, an interleaved
implementation plan and at most one diagram.

Configuration files are loaded from (in priority order):
1. IDEAFORGE_<SECTION>__<KEY> environment variables
2. --config <path>        Explicit config file
3. ./ideaforge.toml       Project-level config
4. ~/.config/ideaforge/config.toml   Global config

Example:
  ideaforge "A subscription box for rare houseplants"
  ideaforge --primary code --support business "Offline-first recipe app"
  ideaforge --idea-id 4f1c... "What about pricing?"
  ideaforge --chat
"#)]
pub struct Cli {
    /// The idea to develop (not required in chat mode)
    pub idea: Option<String>,

    /// Continue an existing idea
    #[arg(long, value_name = "ID")]
    pub idea_id: Option<String>,

    /// Primary domain (business, code, science, technology)
    #[arg(short, long, value_name = "DOMAIN")]
    pub primary: Option<String>,

    /// Supporting domains (can be specified multiple times)
    #[arg(short, long = "support", value_name = "DOMAIN")]
    pub support: Vec<String>,

    /// Start interactive dialogue mode
    #[arg(short, long)]
    pub chat: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Archive an idea and exit
    #[arg(long, value_name = "ID", conflicts_with_all = ["history", "chat"])]
    pub archive: Option<String>,

    /// Print the consensus history of an idea and exit
    #[arg(long, value_name = "ID", conflicts_with = "chat")]
    pub history: Option<String>,
}

impl Cli {
    /// Explicit supporting domains; `None` lets the classifier infer them
    pub fn supporting(&self) -> Option<Vec<String>> {
        if self.support.is_empty() {
            None
        } else {
            Some(
                self.support
                    .iter()
                    .flat_map(|s| s.split(','))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            )
        }
    }
}
