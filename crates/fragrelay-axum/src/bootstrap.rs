//! Server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter: registry construction, upstream client, auth
//! material. Configuration is built once here and passed down explicitly;
//! nothing reads ambient globals after startup.

use std::sync::Arc;

use anyhow::Result;

use fragrelay_core::{ChunkPolicy, ModelRegistry};

use crate::upstream::FragmentClient;

/// Fixed base url of the fragment service.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://fragments.e2b.dev";

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Bearer secret clients must present.
    pub api_key: String,
    /// Base url of the fragment service.
    pub upstream_base_url: String,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Chunk sizing and pacing for emulated streaming.
    pub chunk_policy: ChunkPolicy,
}

impl ServerConfig {
    /// Config with defaults for everything but the bearer secret.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            port: 8080,
            api_key: api_key.into(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            cors: CorsConfig::default(),
            chunk_policy: ChunkPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = url.into();
        self
    }
}

/// Application context for the Axum adapter.
///
/// Holds all initialized services for the web server. Everything here is
/// read-only per request; there is no cross-request mutable state.
pub struct AppContext {
    /// Immutable model capability table.
    pub registry: ModelRegistry,
    /// Client for the fragment service.
    pub upstream: FragmentClient,
    /// Pre-built `"Bearer <key>"` value for the auth middleware.
    pub auth_header: Arc<str>,
    /// Chunk sizing and pacing for emulated streaming.
    pub chunk_policy: ChunkPolicy,
}

/// Wire up all services from configuration.
#[must_use]
pub fn bootstrap(config: &ServerConfig) -> AppContext {
    let registry = ModelRegistry::builtin();

    tracing::info!(
        models = registry.len(),
        upstream = %config.upstream_base_url,
        api_key_prefix = mask(&config.api_key),
        "bootstrap complete"
    );

    AppContext {
        registry,
        upstream: FragmentClient::new(config.upstream_base_url.clone()),
        auth_header: Arc::from(format!("Bearer {}", config.api_key)),
        chunk_policy: config.chunk_policy,
    }
}

/// Start the web server on the configured port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("fragrelay listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Shorten the api key for startup logging.
fn mask(key: &str) -> String {
    let shown: String = key.chars().take(8).collect();
    if shown.len() < key.len() {
        format!("{shown}...")
    } else {
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bootstrap_builds_auth_header() {
        let ctx = bootstrap(&ServerConfig::new("sk-test"));
        assert_eq!(ctx.auth_header.as_ref(), "Bearer sk-test");
        assert_eq!(ctx.registry.len(), 12);
    }

    #[test]
    fn test_config_builders() {
        let config = ServerConfig::new("k")
            .with_port(9999)
            .with_upstream_base_url("http://127.0.0.1:1");
        assert_eq!(config.port, 9999);
        assert_eq!(config.upstream_base_url, "http://127.0.0.1:1");
    }
}
