//! CLI entrypoint for ideaforge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use ideaforge_application::{
    AdvanceError, AdvanceRequest, DialogueController, IdeaStore, NoProgress, TextGenerator,
};
use ideaforge_domain::{Domain, IdeaId};
use ideaforge_infrastructure::{
    ConfigLoader, DotDiagramRenderer, FileConfig, FileLoggingConfig, FileOutputFormat,
    InMemoryIdeaStore, JsonFileIdeaStore, JsonlConversationLogger, OpenAiCompatibleGenerator,
    OpenAiConfig,
};
use ideaforge_presentation::{
    ChatRepl, Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let lines: Vec<String> = issues.iter().map(|i| format!("  - {}", i)).collect();
        bail!("Invalid configuration:\n{}", lines.join("\n"));
    }

    let _log_guard = init_tracing(cli.verbose, &config.logging);
    info!("Starting ideaforge");

    if !config.output.color {
        colored::control::set_override(false);
    }

    let cancellation = CancellationToken::new();
    let controller = Arc::new(build_controller(&config, cancellation.clone())?);

    if let Some(id) = &cli.archive {
        let idea = controller.archive(&IdeaId::new(id.as_str())).await?;
        println!("Archived idea {} ({})", idea.id(), idea.description());
        return Ok(());
    }

    if let Some(id) = &cli.history {
        let id = IdeaId::new(id.as_str());
        let (idea, _) = controller.load(&id).await?;
        let entries = controller.history(&id).await?;
        println!("{}", ConsoleFormatter::format_history(&idea, &entries));
        return Ok(());
    }

    let format = cli.output.or(config.output.format.map(output_format));

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(controller).with_progress(!cli.quiet);
        if let Some(format) = format {
            repl = repl.with_format(format);
        }
        if let Some(id) = &cli.idea_id {
            repl = repl.with_idea(IdeaId::new(id.as_str()));
        }
        repl.run().await?;
        return Ok(());
    }

    // Single-shot mode - idea is required
    let text = match &cli.idea {
        Some(text) => text.clone(),
        None => bail!("An idea is required. Use --chat for interactive mode."),
    };

    let mut request = AdvanceRequest::new(text);
    if let Some(id) = &cli.idea_id {
        request = request.for_idea(id.as_str());
    }
    if let Some(primary) = &cli.primary {
        request = request.with_primary(primary.as_str());
    }
    if let Some(supporting) = cli.supporting() {
        request = request.with_supporting(supporting);
    }

    tokio::spawn(cancel_on_ctrl_c(cancellation));

    let result = if cli.quiet {
        controller.advance_with_progress(request, &NoProgress).await
    } else if std::io::stderr().is_terminal() {
        let progress = ProgressReporter::new();
        controller.advance_with_progress(request, &progress).await
    } else {
        controller
            .advance_with_progress(request, &SimpleProgress)
            .await
    };

    let output = match result {
        Ok(output) => output,
        Err(e) if e.is_ambiguous() => bail!(
            "Could not tell which domain this idea belongs to.\n\
             Re-run with --primary <domain>, one of: {}",
            Domain::valid_identifiers()
        ),
        Err(AdvanceError::Cancelled) => bail!("Interrupted; nothing was saved"),
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}",
        ConsoleFormatter::render(&output, format.unwrap_or(OutputFormat::Full))
    );
    if output.created && !cli.quiet && format != Some(OutputFormat::Json) {
        eprintln!("Continue with: ideaforge --idea-id {} \"...\"", output.idea.id());
    }

    Ok(())
}

/// Wire adapters from configuration into the dialogue controller
fn build_controller(config: &FileConfig, cancellation: CancellationToken) -> Result<DialogueController> {
    let generator: Arc<dyn TextGenerator> = Arc::new(
        OpenAiCompatibleGenerator::new(OpenAiConfig::from_file_config(&config.generation))
            .context("Failed to create text generator")?,
    );
    if config.generation.api_key().is_none() {
        info!(
            env = %config.generation.api_key_env,
            "No API key set; sending unauthenticated requests"
        );
    }

    let params = config.orchestration.to_params();

    if config.storage.ephemeral {
        info!("Ephemeral storage: ideas are kept in memory only");
        let store: Arc<dyn IdeaStore> = Arc::new(InMemoryIdeaStore::new());
        return Ok(DialogueController::new(store, generator, params).with_cancellation(cancellation));
    }

    let data_dir = config.storage.resolve_data_dir();
    info!(data_dir = %data_dir.display(), "Using persistent storage");

    let store: Arc<dyn IdeaStore> = Arc::new(JsonFileIdeaStore::new(data_dir.clone()));
    let mut controller = DialogueController::new(store, generator, params)
        .with_renderer(Arc::new(DotDiagramRenderer::in_data_dir(data_dir.clone())))
        .with_cancellation(cancellation);

    if let Some(path) = config.logging.conversation_log_path(&data_dir) {
        match JsonlConversationLogger::open(&path) {
            Some(logger) => controller = controller.with_conversation_logger(Arc::new(logger)),
            None => warn!(path = %path.display(), "Conversation log unavailable"),
        }
    }

    Ok(controller)
}

/// Initialize tracing: stderr always, plus a daily file when configured.
///
/// `RUST_LOG` overrides the `-v` level. The returned guard flushes the
/// file writer on drop.
fn init_tracing(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match logging.resolve_file_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ideaforge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Received Ctrl+C, cancelling request");
        token.cancel();
    }
}

fn output_format(format: FileOutputFormat) -> OutputFormat {
    match format {
        FileOutputFormat::Full => OutputFormat::Full,
        FileOutputFormat::Summary => OutputFormat::Summary,
        FileOutputFormat::Json => OutputFormat::Json,
    }
}
