use std::sync::Arc;

use crate::agent::Agent;
use crate::config::Config;
use crate::session_store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable agent backend. Production: `ClaudeAgent`.
    pub agent: Arc<dyn Agent>,
    pub config: Config,
}
