//! parl-viewer - read-only viewer for tracked parliamentarians
//!
//! `serve` (default) runs the web UI; `report` prints the AI / human
//! comparison matrix and exits.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use parl_common::config::{ConfigOverrides, TomlConfig, ViewerConfig};
use parl_viewer::loader::{DataLocation, HttpSource};
use parl_viewer::report::Report;
use parl_viewer::{build_router, AppState, Catalog};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for parl-viewer
#[derive(Parser, Debug)]
#[command(name = "parl-viewer")]
#[command(about = "Viewer comparing AI and human list classifications of parliamentarians")]
#[command(version)]
struct Args {
    /// Config file (default: ~/.config/parl-viewer/config.toml, then /etc/parl-viewer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the dataset (overrides PARL_DATA_ROOT)
    #[arg(long, global = true)]
    data_root: Option<String>,

    /// Address to bind the HTTP server to
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides PARL_PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the web UI (default)
    Serve,
    /// Print the comparison matrix
    Report {
        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,

        /// Text filter applied before tallying
        #[arg(short = 'q', long = "query", default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_path) =
        TomlConfig::discover(args.config.as_deref()).context("Failed to load config file")?;
    let overrides = ConfigOverrides {
        data_root: args.data_root.clone(),
        bind: args.bind.clone(),
        port: args.port,
    };
    let config = ViewerConfig::resolve(&toml_config, &overrides).context("Invalid configuration")?;

    init_tracing(&config)?;

    // Build identification right after tracing init
    info!(
        "Starting parl-viewer v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("Data root: {}", config.data_root);

    let location = DataLocation::from_config(&config).context("Invalid data location")?;
    let source = Arc::new(HttpSource::new().context("Failed to create HTTP client")?);
    let catalog = Catalog::load(source, &location).await;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, catalog).await,
        Command::Report { json, query } => report(catalog, &query, json).await,
    }
}

fn init_tracing(config: &ViewerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("Invalid log level {:?}", config.log_level))?;

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

async fn serve(config: &ViewerConfig, catalog: Catalog) -> Result<()> {
    catalog.spawn_warmup();
    let app = build_router(AppState::new(catalog));

    let listener = tokio::net::TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", config.bind, config.port))?;

    info!("parl-viewer listening on http://{}:{}", config.bind, config.port);
    info!("Health check: http://{}:{}/health", config.bind, config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn report(catalog: Catalog, query: &str, json: bool) -> Result<()> {
    let session = match &catalog {
        Catalog::Ready(session) => session,
        Catalog::Failed(failure) => bail!("{} ({})", failure.message, failure.details),
    };

    let report = Report::build(session, query).await;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
