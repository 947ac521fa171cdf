use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use journey_builder::catalog::{BuiltinCatalog, CatalogProvider, FileCatalog};
use journey_builder::cli::{Cli, Command, OutputFormat};
use journey_builder::config::Config;
use journey_builder::conversation::ConversationEngine;
use journey_builder::domain::JourneyDocument;
use journey_builder::reconcile::{Reconciler, Validator};
use journey_builder::session::SessionStore;
use journey_builder::{llm, server};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());
    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).context("Failed to create log directory")?;
            }
            let file = fs::File::create(path).context("Failed to create log file")?;
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(
        cli.log_level.as_deref(),
        config.log_level.as_deref(),
        cli.log_file.as_deref(),
    )
    .context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Serve { host, port }) => cmd_serve(config, host, port).await,
        Some(Command::Catalog { format }) => cmd_catalog(&config, format).await,
        Some(Command::Validate { file, full }) => cmd_validate(&config, &file, full).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

fn catalog_provider(config: &Config) -> Arc<dyn CatalogProvider> {
    match &config.catalog.path {
        Some(path) => {
            info!(path = %path.display(), "Using file catalog");
            Arc::new(FileCatalog::new(path))
        }
        None => Arc::new(BuiltinCatalog),
    }
}

async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    debug!(?host, ?port, "cmd_serve: called");
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    let catalog = catalog_provider(&config);
    // The catalog must load before serving
    let snapshot = catalog.snapshot().await.context("Failed to load component catalog")?;
    info!(components = snapshot.entries().len(), "Component catalog available");

    let llm = llm::create_client(&config.llm).context("Failed to create LLM client")?;
    info!(provider = %config.llm.provider, model = %llm.model(), "LLM client ready");

    let sessions = SessionStore::spawn();
    let engine = Arc::new(ConversationEngine::from_config(&config, sessions.clone(), catalog, llm)?);

    server::serve(engine, &config.server, shutdown_signal()).await?;

    let _ = sessions.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => warn!("SIGINT received"),
                    _ = sigterm.recv() => warn!("SIGTERM received"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("Shutting down...");
}

async fn cmd_catalog(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_catalog: called");
    let catalog = catalog_provider(config).snapshot().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog.entries())?),
        OutputFormat::Text => {
            for entry in catalog.entries() {
                println!("{} (ID {})", entry.screen_component_name, entry.screen_component_id);
                for field in &entry.field_components {
                    let trigger = if field.is_trigger_component { "  [trigger]" } else { "" };
                    println!(
                        "    {:>4}  {:<12} {:<24} {}{}",
                        field.field_component_id, field.field_type, field.field_name, field.field_label, trigger
                    );
                }
            }
        }
    }
    Ok(())
}

async fn cmd_validate(config: &Config, file: &Path, full: bool) -> Result<()> {
    debug!(file = %file.display(), full, "cmd_validate: called");
    let catalog = catalog_provider(config).snapshot().await?;

    let content = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut value: serde_json::Value = serde_json::from_str(&content).context("File is not valid JSON")?;
    if let Some(map) = value.as_object_mut() {
        journey_builder::reconcile::normalize_keys(map);
    }
    let doc: JourneyDocument = serde_json::from_value(value).context("File is not a journey document")?;

    let (doc, report) = Reconciler::new(&catalog).reconcile(doc)?;
    let verdict = Validator::new(&catalog).validate(&doc, full);

    println!("{}", if verdict.valid { "VALID" } else { "INCOMPLETE" });
    println!("{}", verdict.message);
    for assignment in &report.auto_assigned {
        println!("auto-assigned trigger {} for {}", assignment.trigger.id, assignment.edge);
    }
    for choice in &report.ambiguous_triggers {
        println!("{}", choice.prompt());
    }
    if report.dropped_edges > 0 {
        println!("dropped {} navigation edge(s)", report.dropped_edges);
    }

    if !verdict.valid {
        std::process::exit(1);
    }
    Ok(())
}
