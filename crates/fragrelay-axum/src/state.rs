//! Shared application state type.
//!
//! Defines the `AppState` type used across all handlers and routers.

use crate::bootstrap::AppContext;
use std::sync::Arc;

/// Application state shared across all handlers.
///
/// An Arc-wrapped [`AppContext`] holding the registry, upstream client
/// and per-request policies. Read-only after bootstrap.
pub type AppState = Arc<AppContext>;
