//! Axum web adapter for fragrelay.
//!
//! Exposes the OpenAI-compatible surface (`/v1/chat/completions`,
//! `/v1/models`, `/health`), authenticates bearer credentials, forwards
//! adapted requests to the fragment service and renders the reply either
//! as one completion object or as an emulated SSE token stream.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for test infrastructure
#[cfg(test)]
use tokio_test as _;

pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod sse;
pub mod state;
pub mod upstream;

// Re-export primary types
pub use bootstrap::{
    AppContext, CorsConfig, DEFAULT_UPSTREAM_BASE_URL, ServerConfig, bootstrap, start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
pub use upstream::{FragmentClient, UpstreamError};
