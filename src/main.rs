use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::{info, warn};

use sparkd::{
    config::SparkConfig, provider::OpenAiProvider, repository::RestRepository, rest, AppContext,
};

#[derive(Parser)]
#[command(
    name = "sparkd",
    about = "Limmo Spark service — personalized nudges from your own wins",
    version
)]
struct Args {
    /// HTTP server port
    #[arg(long, env = "SPARKD_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 to serve beyond loopback)
    #[arg(long, env = "SPARKD_BIND")]
    bind_address: Option<String>,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "SPARKD_LOG")]
    log: Option<String>,

    /// Path to a TOML config file (default: ./sparkd.toml)
    #[arg(long, env = "SPARKD_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = SparkConfig::new(args.port, args.bind_address, args.log, args.config);

    init_logging(&config.log, &config.log_format);

    info!(version = env!("CARGO_PKG_VERSION"), "starting sparkd");
    if config.provider_api_key.is_none() {
        warn!("no provider API key configured — completion calls will be rejected upstream");
    }

    let repository = RestRepository::new(&config).context("building entries repository client")?;
    let provider = OpenAiProvider::new(&config).context("building completion provider client")?;

    let ctx = Arc::new(AppContext {
        config: Arc::new(config),
        repository: Arc::new(repository),
        provider: Arc::new(provider),
        started_at: Instant::now(),
    });

    rest::start_server(ctx).await
}

fn init_logging(log_level: &str, log_format: &str) {
    use tracing_subscriber::EnvFilter;

    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::new(log_level))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .compact()
            .init();
    }
}
