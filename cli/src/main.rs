//! CLI entrypoint for LexiQuest
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use lexiquest_application::{ConversationLogger, RunTurnUseCase, SessionStore};
use lexiquest_domain::SubtaskRegistry;
use lexiquest_infrastructure::{
    ConfigLoader, FileConfig, InMemorySessionStore, JsonFileSessionStore, JsonlConversationLogger,
    OpenAiCompatConfig, OpenAiCompatGateway, WordListGuard,
};
use lexiquest_presentation::{Cli, StoryRepl, new_session_id};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Provider keys may live in a local .env file
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    info!("Starting LexiQuest");

    let mut config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if let Some(model) = &cli.model {
        config.models.override_all(model);
    }
    if let Some(dir) = &cli.state_dir {
        config.session.state_dir = Some(dir.clone());
    }

    let registry = SubtaskRegistry::builtin();
    config
        .validate(&registry)
        .context("Invalid configuration")?;

    // === Dependency Injection ===
    let gateway = Arc::new(OpenAiCompatGateway::new(OpenAiCompatConfig::from_file(
        &config.provider,
    ))?);

    let store: Arc<dyn SessionStore> = if cli.ephemeral {
        info!("Sessions are kept in memory only");
        Arc::new(InMemorySessionStore::new())
    } else {
        let dir = config.session.resolve_state_dir();
        info!("Session checkpoints in {}", dir.display());
        Arc::new(JsonFileSessionStore::new(dir))
    };

    let guard = WordListGuard::new(config.guard.blocked_terms.as_slice())
        .context("Invalid entry in guard.blocked_terms")?;

    let mut use_case = RunTurnUseCase::new(
        gateway,
        config.model_config()?,
        store,
        config.session_config(),
    )
    .with_guard(Arc::new(guard))
    .with_registry(registry);

    if let Some(path) = &config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Some(logger) => {
                info!("Conversation log: {}", logger.path().display());
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                use_case = use_case.with_conversation_logger(logger);
            }
            None => warn!("Conversation logging disabled"),
        }
    }

    use_case.validate()?;

    let session_id = cli.session.clone().unwrap_or_else(new_session_id);

    let mut repl = StoryRepl::new(use_case, session_id)
        .with_progress(!cli.quiet)
        .with_plain_progress(cli.no_spinner);

    repl.run().await?;

    info!("Session {} closed", repl.session_id());
    Ok(())
}
