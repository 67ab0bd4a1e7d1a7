//! Taxon Server
//!
//! HTTP service ranking leaf categories of a marketplace category tree for
//! free-text service requests.
//!
//! Callers send the category snapshot with every request; the server keeps
//! no category data of its own.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use taxon_classifiers::{FallbackPolicy, Strategy, SuggestionEngine, SuggestionOutcome};
use taxon_core::{CategoryNode, SuggestionRequest};
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "taxon-server")]
#[command(about = "Leaf category suggestions for service requests", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TAXON_CONFIG", default_value = "taxon.yaml", global = true)]
    config: String,

    /// Listen address
    #[arg(short = 'l', long, env = "TAXON_LISTEN", global = true)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "TAXON_PORT", global = true)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    /// Fallback policy override
    #[arg(long, value_enum, global = true)]
    fallback: Option<FallbackArg>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Suggest categories once and print the result as JSON
    Suggest(SuggestArgs),
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// JSON file holding an array of `{id, name, parentId}` categories
    #[arg(long)]
    categories: PathBuf,

    /// Request title
    #[arg(long)]
    title: String,

    /// Request description
    #[arg(long, default_value = "")]
    description: String,

    /// Producer to use
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    strategy: StrategyArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FallbackArg {
    Manual,
    Auto,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(arg: FallbackArg) -> Self {
        match arg {
            FallbackArg::Manual => FallbackPolicy::Manual,
            FallbackArg::Auto => FallbackPolicy::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Auto,
    Model,
    Keyword,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => Strategy::Auto,
            StrategyArg::Model => Strategy::Model,
            StrategyArg::Keyword => Strategy::Keyword,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.log_format);

    let config = resolve_config(&cli)?;

    match cli.command {
        Some(Command::Suggest(args)) => run_suggest(config, args).await,
        Some(Command::Serve) | None => run_server(config).await,
    }
}

/// Load the config file and apply command-line and environment overrides
fn resolve_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(&cli.config)?;
    config.apply_overrides(
        cli.listen.as_deref(),
        cli.port,
        cli.fallback.map(FallbackPolicy::from),
    );
    Ok(config)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting Taxon server");

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let state = state::AppState::new(config, metrics_handle)?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    // Graceful shutdown handler
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

async fn run_suggest(config: ServerConfig, args: SuggestArgs) -> Result<()> {
    let outcome = suggest_once(&config, &args).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn suggest_once(config: &ServerConfig, args: &SuggestArgs) -> Result<SuggestionOutcome> {
    let content = std::fs::read_to_string(&args.categories).with_context(|| {
        format!("Failed to read categories from {}", args.categories.display())
    })?;
    let categories: Vec<CategoryNode> = serde_json::from_str(&content).with_context(|| {
        format!("Invalid categories JSON in {}", args.categories.display())
    })?;

    let engine = SuggestionEngine::from_config(&config.engine)?;
    let request = SuggestionRequest::new(args.title.clone(), args.description.clone());
    Ok(engine
        .suggest_with(&request, &categories, args.strategy.into())
        .await)
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new(
            "taxon_core=debug,taxon_classifiers=debug,taxon_server=debug,tower_http=debug",
        )
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("taxon_core=info,taxon_classifiers=info,taxon_server=info")
        })
    };

    // Logs go to stderr so `suggest` output stays clean on stdout
    match format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "taxon_requests_total",
        "Total number of suggestion requests processed"
    );
    metrics::describe_counter!(
        "taxon_model_failures_total",
        "Model classification failures by kind"
    );
    metrics::describe_counter!(
        "taxon_fallback_total",
        "Requests answered by the keyword scorer after the model returned nothing"
    );
    metrics::describe_counter!(
        "taxon_dropped_candidates_total",
        "Candidate suggestions rejected by validation"
    );
    metrics::describe_histogram!(
        "taxon_model_latency_us",
        metrics::Unit::Microseconds,
        "Remote model call latency in microseconds"
    );
    metrics::describe_histogram!(
        "taxon_suggest_latency_us",
        metrics::Unit::Microseconds,
        "End-to-end suggestion latency in microseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
