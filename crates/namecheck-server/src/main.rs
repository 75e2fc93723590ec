//! namecheck server
//!
//! Serves the name classification pipeline over HTTP. Names failing the
//! deterministic pre-check are answered locally; the rest go to an
//! OpenAI-compatible chat completions API.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

use namecheck_runtime::{NameClassifier, OpenAiProvider};
use namecheck_server::{create_router, AppState, ConfigOverrides, ServerConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "namecheck-server")]
#[command(about = "Realistic-name classification endpoint", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "NAMECHECK_CONFIG", default_value = "namecheck.yaml")]
    config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "NAMECHECK_LISTEN")]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "NAMECHECK_PORT")]
    port: Option<u16>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    /// Model used when a request names none
    #[arg(short, long, env = "NAMECHECK_DEFAULT_MODEL")]
    model: Option<String>,

    /// Bound on each remote call (e.g. "15s")
    #[arg(long, env = "NAMECHECK_TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            listen: self.listen.clone(),
            port: self.port,
            base_url: self.base_url.clone(),
            default_model: self.model.clone(),
            timeout: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_format);

    info!("Starting namecheck server");

    let config = ServerConfig::load(&cli.config, &cli.overrides())
        .with_context(|| format!("Failed to load configuration from {}", cli.config))?;
    info!("Base URL: {}", config.base_url);
    info!("Default model: {}", config.runtime.default_model);
    info!("Allowed models: {:?}", config.runtime.allowed_models);

    let provider = OpenAiProvider::from_env()
        .context("OPENAI_API_KEY must be set to a non-empty value")?
        .with_base_url(config.base_url.as_str());

    let classifier = NameClassifier::new(Arc::new(provider), config.runtime.clone())
        .context("Invalid runtime configuration")?;
    let app = create_router(AppState::new(classifier));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

const DEFAULT_FILTER: &str =
    "namecheck_core=info,namecheck_runtime=info,namecheck_server=info,tower_http=info";
const VERBOSE_FILTER: &str =
    "namecheck_core=debug,namecheck_runtime=debug,namecheck_server=debug,tower_http=debug";

fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(verbose, rust_log.as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// RUST_LOG wins when it parses; otherwise `--verbose` picks debug over info.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }))
}
