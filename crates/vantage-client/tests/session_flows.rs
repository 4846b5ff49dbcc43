mod common;

use vantage_client::{ApiError, QueryState};
use vantage_client::mock::MockReply;
use vantage_client::navigation::Route;
use vantage_client::session::SessionStore;
use vantage_client::transport::Method;
use vantage_types::models::Role;

use common::{signed_in, user};

#[tokio::test]
async fn expired_session_is_torn_down_on_profile_401() {
    let ana = user(Role::Investor);
    let h = signed_in(&ana);
    assert_eq!(h.ctx.auth.user(), Some(ana));
    h.mock.on(Method::Get, "/auth/profile", MockReply::status(401));

    assert_eq!(h.ctx.auth.reconcile().await, Err(ApiError::Unauthorized));

    assert_eq!(h.store.load_user(), None);
    assert_eq!(h.store.load_token(), None);
    assert!(!h.ctx.auth.is_authenticated());
    assert!(!h.ctx.api.has_token());
    assert_eq!(h.nav.last(), Some(Route::Login));
}

#[tokio::test]
async fn valid_session_refreshes_persisted_user() {
    let ana = user(Role::Investor);
    let h = signed_in(&ana);
    let mut promoted = ana.clone();
    promoted.roles.push(Role::Representative);
    h.mock.on(Method::Get, "/auth/profile", MockReply::json(&promoted));

    assert_eq!(h.ctx.auth.reconcile().await, Ok(Some(promoted.clone())));
    assert_eq!(h.store.load_user(), Some(promoted.clone()));
    assert_eq!(h.ctx.auth.user(), Some(promoted));
    assert_eq!(h.mock.requests()[0].bearer.as_deref(), Some("persisted-token"));
    assert!(h.nav.history().is_empty());
}

#[tokio::test]
async fn any_401_clears_cached_pages() {
    let ana = user(Role::Admin);
    let h = signed_in(&ana);
    h.mock.on(Method::Get, "/deals", MockReply::status(401));

    // the teardown drops every entry, the failed read included
    let state = h.ctx.deals().settled().await;
    assert_eq!(state, QueryState::Idle);
    assert_eq!(h.ctx.auth.user(), None);
    assert_eq!(h.nav.last(), Some(Route::Login));
}
