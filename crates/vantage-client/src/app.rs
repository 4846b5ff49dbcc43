use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use vantage_store::Database;

use crate::api::ApiClient;
use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::navigation::{LogNavigator, Navigator};
use crate::query::QueryCache;
use crate::session::{SessionStore, SqliteSessionStore};
use crate::transport::{ReqwestTransport, Transport};

/// Everything a page needs, built once at the root and passed down by
/// reference.
pub struct AppContext {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub cache: QueryCache,
    pub auth: AuthContext,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let api = ApiClient::new(transport);
        let cache = QueryCache::new();
        let auth = AuthContext::new(api.clone(), cache.clone(), store, navigator.clone());
        Self {
            config,
            api,
            cache,
            auth,
            navigator,
        }
    }

    /// Production wiring: HTTP transport, SQLite session file, logging navigator.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config).context("building HTTP client")?;
        let db = Database::open(&config.session_db)
            .with_context(|| format!("opening session store {}", config.session_db.display()))?;
        info!("API at {}", config.api_url);

        let store = Arc::new(SqliteSessionStore::new(db));
        Ok(Self::new(config, Arc::new(transport), store, Arc::new(LogNavigator)))
    }

    /// The window regained focus.
    pub async fn focus(&self) -> usize {
        self.cache.on_focus().await
    }
}
