//! The locally persisted copy of the signed-in user and its bearer token.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};
use vantage_store::Database;
use vantage_types::models::User;

use crate::api::UnauthorizedHandler;
use crate::navigation::{Navigator, Route};
use crate::query::QueryCache;

pub const CURRENT_USER_KEY: &str = "vantage.current_user";
pub const SESSION_TOKEN_KEY: &str = "vantage.session_token";

/// Where the session survives restarts. Failures are logged, never raised:
/// losing the persisted copy only costs a round trip to `/auth/profile`.
pub trait SessionStore: Send + Sync {
    fn load_user(&self) -> Option<User>;
    fn save_user(&self, user: &User);
    fn load_token(&self) -> Option<String>;
    fn save_token(&self, token: &str);
    fn clear(&self);
}

pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.db.get_value(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) {
        if let Err(e) = self.db.put_value(key, value) {
            warn!("failed to persist {}: {}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.db.remove_value(key) {
            warn!("failed to remove {}: {}", key, e);
        }
    }
}

impl SessionStore for SqliteSessionStore {
    fn load_user(&self) -> Option<User> {
        let raw = self.get(CURRENT_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("discarding unreadable persisted user: {}", e);
                self.remove(CURRENT_USER_KEY);
                None
            }
        }
    }

    fn save_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.put(CURRENT_USER_KEY, &json),
            Err(e) => warn!("failed to encode user {}: {}", user.id, e),
        }
    }

    fn load_token(&self) -> Option<String> {
        self.get(SESSION_TOKEN_KEY)
    }

    fn save_token(&self, token: &str) {
        self.put(SESSION_TOKEN_KEY, token);
    }

    fn clear(&self) {
        self.remove(CURRENT_USER_KEY);
        self.remove(SESSION_TOKEN_KEY);
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
    token: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(user: User, token: impl Into<String>) -> Self {
        Self {
            user: Mutex::new(Some(user)),
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_user(&self) -> Option<User> {
        self.user.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save_user(&self, user: &User) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
    }

    fn load_token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save_token(&self, token: &str) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
    }

    fn clear(&self) {
        *self.user.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Forget everything about the current session and send the user to the
/// login page. Installed as the API client's 401 hook and run by logout.
pub struct SessionTeardown {
    store: Arc<dyn SessionStore>,
    cache: QueryCache,
    navigator: Arc<dyn Navigator>,
}

impl SessionTeardown {
    pub fn new(store: Arc<dyn SessionStore>, cache: QueryCache, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            cache,
            navigator,
        }
    }

    pub fn run(&self) {
        info!("tearing down session");
        self.store.clear();
        self.cache.clear();
        self.navigator.navigate(Route::Login);
    }
}

impl UnauthorizedHandler for SessionTeardown {
    fn on_unauthorized(&self) {
        self.run();
    }
}
