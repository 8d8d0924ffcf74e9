//! CLI entry point - the composition root.
//!
//! This is the ONLY place where configuration is read from the
//! environment and wired into the server via bootstrap.

use clap::Parser;

use fragrelay_axum::{DEFAULT_UPSTREAM_BASE_URL, ServerConfig, start_server};

/// OpenAI-compatible relay in front of the fragment execution service.
#[derive(Parser, Debug)]
#[command(name = "fragrelay", version, about)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "FRAGRELAY_PORT", default_value_t = 8080)]
    port: u16,

    /// Bearer token clients must present on /v1 routes
    #[arg(long, env = "FRAGRELAY_API_KEY", default_value = "sk-123456")]
    api_key: String,

    /// Base URL of the fragment execution service
    #[arg(long, env = "FRAGRELAY_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_BASE_URL)]
    upstream_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::new(&cli.api_key)
        .with_port(cli.port)
        .with_upstream_base_url(&cli.upstream_url);

    tracing::info!(port = config.port, "starting fragrelay");
    start_server(config).await
}
