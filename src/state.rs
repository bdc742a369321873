//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::db::sqlite::SqliteStore;
use crate::review::generator::ReviewGenerator;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent snippet + review store.
    pub store: Arc<SqliteStore>,
    /// LLM-backed (or mock) review generator.
    pub reviewer: Arc<ReviewGenerator>,
}

#[cfg(test)]
impl AppState {
    /// Full application state over [`Config::mock`]: in-memory store,
    /// mock-mode reviewer.
    pub async fn mock() -> Arc<Self> {
        let cfg = Config::mock();
        let store = SqliteStore::connect(&cfg.database_url)
            .await
            .expect("in-memory store");
        let reviewer = ReviewGenerator::new(&cfg).expect("mock reviewer");
        Arc::new(Self {
            config: Arc::new(cfg),
            store: Arc::new(store),
            reviewer: Arc::new(reviewer),
        })
    }
}
