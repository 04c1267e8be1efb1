//! stack-router
//!
//! Serves a file-based route tree as nested layout boundaries.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser request          ┌──────────────────────────────────────────────────┐
//!     ────────────────────────▶│  http server ──▶ route manifest ──▶ render       │
//!                              │                    │    ▲             pipeline   │
//!     HTML stream / JSON stack │                    ▼    │                │       │
//!     ◀────────────────────────│              route table │             module     │
//!                              │                         │             registry   │
//!                              │  dev watcher ───────────┘  (notify_file_change)  │
//!                              └──────────────────────────────────────────────────┘
//! ```
//!
//! `dev` reconciles file changes as they happen; `start` scans once.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;

use stack_router::config::validation::validate_config;
use stack_router::config::{load_config, AppConfig, ConfigError, RuntimeMode};
use stack_router::dev::RouteWatcher;
use stack_router::observability::{logging, metrics};
use stack_router::{manifest_from_config, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "stack-router")]
#[command(about = "Server-rendering router for file-based layout stacks", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Application root, overrides `app.root`.
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve with live route reconciliation
    Dev(ServeArgs),
    /// Serve a fixed route tree
    Start(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(short, long)]
    port: Option<u16>,

    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let (mode, serve) = match cli.command {
        Commands::Dev(args) => (RuntimeMode::Dev, args),
        Commands::Start(args) => (RuntimeMode::Prod, args),
    };

    let config = resolve_config(cli.config, cli.root, mode, &serve)?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %config.app.mode,
        root = %config.app.root.display(),
        bind_address = %config.listener.bind_address,
        "stack-router starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let manifest = Arc::new(manifest_from_config(&config));
    let routes = manifest.initialize().await?;
    tracing::info!(
        routes,
        routes_root = %manifest.routes_root().display(),
        "Route manifest ready"
    );

    // Dropping the watcher stops event delivery.
    let _watcher = if mode.is_dev() {
        Some(RouteWatcher::new(Arc::clone(&manifest))?.run()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    HttpServer::new(manifest)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("stack-router stopped");
    Ok(())
}

/// Config file (or defaults), then command-line overrides, then validation.
fn resolve_config(
    path: Option<PathBuf>,
    root: Option<PathBuf>,
    mode: RuntimeMode,
    serve: &ServeArgs,
) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(&path)?,
        None => AppConfig::default(),
    };

    if let Some(root) = root {
        config.app.root = root;
    }
    config.app.mode = mode;

    if serve.port.is_some() || serve.host.is_some() {
        let (current_host, current_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .unwrap_or(("127.0.0.1", "3000"));
        let host = serve.host.as_deref().unwrap_or(current_host);
        let port = serve
            .port
            .map(|p| p.to_string())
            .unwrap_or_else(|| current_port.to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
