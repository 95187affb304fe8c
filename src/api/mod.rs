pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::{resolve_client_id, AdminSession, ClientId};
pub use routes::*;

use crate::auth::{AuthGuard, SessionStore};
use crate::config::Config;
use crate::search::SearchEngine;
use crate::state::CatalogStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn CatalogStore>,
    pub search: Arc<SearchEngine>,
    pub auth: Arc<AuthGuard>,
    pub sessions: SessionStore,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn CatalogStore>) -> Self {
        let search = Arc::new(SearchEngine::new(config.search.clone()));
        let auth = Arc::new(AuthGuard::new(&config.auth));
        let sessions = SessionStore::new(config.auth.max_sessions, config.auth.session_ttl());

        Self {
            config,
            store,
            search,
            auth,
            sessions,
            started_at: Instant::now(),
        }
    }
}
