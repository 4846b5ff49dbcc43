//! Who is signed in, and the transitions between signed in and out.
//!
//! The profile lives in the query cache under [`keys::profile`] like any
//! other read. A persisted copy seeds it at startup so the shell can render
//! before the network answers; `reconcile` then confirms it with the server.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tracing::{info, warn};
use vantage_types::api::{LoginRequest, LoginResponse, RegisterRequest};
use vantage_types::models::User;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::navigation::{Navigator, Route};
use crate::query::{QueryCache, QueryObserver, QueryOptions, keys};
use crate::services::auth as service;
use crate::session::{SessionStore, SessionTeardown};

/// The `/auth/profile` fetcher shared by every read of the profile key.
/// Each successful answer also replaces the persisted copy.
fn profile_fetcher(
    api: ApiClient,
    store: Arc<dyn SessionStore>,
) -> impl Fn() -> BoxFuture<'static, Result<User, ApiError>> + Send + Sync + 'static {
    move || {
        let api = api.clone();
        let store = store.clone();
        async move {
            let user = service::profile(&api).await?;
            // Signed out while the request was in flight.
            if api.has_token() {
                store.save_user(&user);
            }
            Ok(user)
        }
        .boxed()
    }
}

pub struct AuthContext {
    api: ApiClient,
    cache: QueryCache,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    teardown: Arc<SessionTeardown>,
}

impl AuthContext {
    /// Also installs the session teardown as the client's 401 hook.
    pub fn new(
        api: ApiClient,
        cache: QueryCache,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let teardown = Arc::new(SessionTeardown::new(store.clone(), cache.clone(), navigator.clone()));
        api.set_unauthorized_handler(teardown.clone());
        Self {
            api,
            cache,
            store,
            navigator,
            teardown,
        }
    }

    /// Restore the persisted session without touching the network.
    pub fn init(&self) {
        let Some(token) = self.store.load_token() else {
            info!("no persisted session");
            return;
        };
        self.api.set_token(Some(token));
        if let Some(user) = self.store.load_user() {
            info!("restored session for {}", user.username);
            self.cache.set_query_data(keys::profile(), user);
        }
    }

    fn profile_options(&self) -> QueryOptions {
        QueryOptions::daily().enabled(self.api.has_token())
    }

    /// Confirm the session with `/auth/profile`. A 401 tears it down through
    /// the client hook before this returns.
    pub async fn reconcile(&self) -> Result<Option<User>, ApiError> {
        let fetch = profile_fetcher(self.api.clone(), self.store.clone());
        let fetched = self
            .cache
            .refetch_query(keys::profile(), self.profile_options(), fetch)
            .await;

        match fetched {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::Disabled) => Ok(None),
            Err(e) => {
                warn!("profile check failed: {}", e);
                Err(e)
            }
        }
    }

    /// Mount the profile for a view (the nav bar, a dashboard header).
    pub fn observe_user(&self) -> QueryObserver<User> {
        let fetch = profile_fetcher(self.api.clone(), self.store.clone());
        self.cache.observe(keys::profile(), self.profile_options(), fetch)
    }

    pub fn user(&self) -> Option<User> {
        self.cache.get_query_data(&keys::profile())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// True only while the first profile fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.user().is_none() && self.cache.is_fetching(&keys::profile())
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<User, ApiError> {
        let resp = service::login(&self.api, req).await?;
        Ok(self.establish(resp))
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ApiError> {
        let resp = service::register(&self.api, req).await?;
        Ok(self.establish(resp))
    }

    fn establish(&self, resp: LoginResponse) -> User {
        let LoginResponse { token, user } = resp;
        info!("signed in as {} ({:?})", user.username, user.primary_role());
        self.api.set_token(Some(token.clone()));
        self.store.save_token(&token);
        self.store.save_user(&user);
        self.cache.set_query_data(keys::profile(), user.clone());
        self.navigator.navigate(Route::Dashboard(user.primary_role()));
        user
    }

    /// Always ends signed out, even if the server call fails.
    pub async fn logout(&self) {
        if let Err(e) = service::logout(&self.api).await {
            warn!("logout request failed, clearing session anyway: {}", e);
        }
        self.api.set_token(None);
        self.teardown.run();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use crate::navigation::RecordingNavigator;
    use crate::session::MemorySessionStore;
    use crate::transport::Method;
    use uuid::Uuid;
    use vantage_types::models::Role;

    fn manager() -> User {
        User {
            id: Uuid::new_v4(),
            username: "mila".into(),
            email: "mila@vantage.test".into(),
            roles: vec![Role::FundManager],
            risk_profile: None,
        }
    }

    struct Harness {
        mock: Arc<MockTransport>,
        store: Arc<MemorySessionStore>,
        nav: Arc<RecordingNavigator>,
        auth: AuthContext,
    }

    fn harness(store: MemorySessionStore) -> Harness {
        let mock = Arc::new(MockTransport::new());
        let store = Arc::new(store);
        let nav = Arc::new(RecordingNavigator::new());
        let auth = AuthContext::new(ApiClient::new(mock.clone()), QueryCache::new(), store.clone(), nav.clone());
        Harness { mock, store, nav, auth }
    }

    #[tokio::test]
    async fn init_seeds_user_without_network() {
        let user = manager();
        let h = harness(MemorySessionStore::with_session(user.clone(), "t0k3n"));
        h.auth.init();
        assert_eq!(h.auth.user(), Some(user));
        assert!(!h.auth.is_loading());
        assert_eq!(h.mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn reconcile_without_token_stays_signed_out() {
        let h = harness(MemorySessionStore::new());
        h.auth.init();
        assert_eq!(h.auth.reconcile().await, Ok(None));
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn mounted_profile_is_persisted() {
        let user = manager();
        let store = MemorySessionStore::new();
        store.save_token("t0k3n");
        let h = harness(store);
        h.auth.init();
        assert_eq!(h.store.load_user(), None);
        h.mock.on(Method::Get, "/auth/profile", MockReply::json(&user));

        let mut observer = h.auth.observe_user();
        assert_eq!(observer.settled().await, crate::query::QueryState::Success(user.clone()));
        assert_eq!(h.store.load_user(), Some(user));
        assert_eq!(h.mock.calls(Method::Get, "/auth/profile"), 1);
    }

    #[tokio::test]
    async fn login_lands_on_role_dashboard() {
        let user = manager();
        let h = harness(MemorySessionStore::new());
        h.mock.on(
            Method::Post,
            "/auth/login",
            MockReply::json(&serde_json::json!({ "token": "fresh", "user": user })),
        );

        let req = LoginRequest { username: "mila".into(), password: "correct-horse".into() };
        assert_eq!(h.auth.login(&req).await, Ok(user.clone()));
        assert!(h.auth.is_authenticated());
        assert_eq!(h.store.load_token().as_deref(), Some("fresh"));
        assert_eq!(h.store.load_user(), Some(user));
        assert_eq!(h.nav.last(), Some(Route::Dashboard(Role::FundManager)));
    }

    #[tokio::test]
    async fn logout_clears_session_even_when_server_fails() {
        let h = harness(MemorySessionStore::with_session(manager(), "t0k3n"));
        h.auth.init();
        h.mock.on(Method::Post, "/auth/logout", MockReply::network_error());

        h.auth.logout().await;
        assert!(!h.auth.is_authenticated());
        assert_eq!(h.store.load_user(), None);
        assert_eq!(h.store.load_token(), None);
        assert_eq!(h.nav.last(), Some(Route::Login));
    }
}
