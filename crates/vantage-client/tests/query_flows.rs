//! Reads through the cache against a mocked API: sharing, invalidation,
//! empty lists and out-of-order responses.

mod common;

use std::time::Duration;

use vantage_client::query::keys;
use vantage_client::transport::Method;
use vantage_client::mock::MockReply;
use vantage_client::{QueryState, RenderState};
use vantage_types::api::CreateCompanyRequest;
use vantage_types::models::Contact;

use common::{company, deal, harness};

#[tokio::test]
async fn fresh_reads_share_one_request() {
    let h = harness();
    h.mock.on(Method::Get, "/companies", MockReply::json(&vec![company("Northwind", "finance")]));

    // two views mount before the first response lands
    let mut list = h.ctx.companies();
    let mut sidebar = h.ctx.companies();
    list.settled().await;
    sidebar.settled().await;
    drop(sidebar);

    // a later mount inside the freshness window is served from cache
    let again = h.ctx.companies();
    assert!(!again.is_fetching());
    assert_eq!(again.current().into_data().map(|c| c.len()), Some(1));
    assert_eq!(h.mock.calls(Method::Get, "/companies"), 1);
}

#[tokio::test]
async fn create_refreshes_the_mounted_list() {
    let h = harness();
    let northwind = company("Northwind", "finance");
    let aster = company("Aster Health", "healthcare");
    h.mock.on(Method::Get, "/companies", MockReply::json(&vec![northwind.clone()]));
    h.mock.on(Method::Post, "/companies", MockReply::json(&aster));

    let mut list = h.ctx.companies();
    assert_eq!(list.settled().await, QueryState::Success(vec![northwind.clone()]));

    h.mock.replace(Method::Get, "/companies", MockReply::json(&vec![northwind.clone(), aster.clone()]));
    let create = h.ctx.create_company();
    let req = CreateCompanyRequest {
        name: "Aster Health".into(),
        industry: "healthcare".into(),
        description: String::new(),
        contact: Contact::default(),
    };
    assert_eq!(create.run(&h.ctx.cache, req).await, Ok(aster.clone()));

    // refetch was awaited by the mutation
    assert_eq!(list.current(), QueryState::Success(vec![northwind, aster]));
    assert_eq!(h.mock.calls(Method::Get, "/companies"), 2);
}

#[tokio::test]
async fn failed_create_leaves_list_untouched() {
    let h = harness();
    h.mock.on(Method::Get, "/companies", MockReply::json(&vec![company("Northwind", "finance")]));
    h.mock.on(
        Method::Post,
        "/companies",
        MockReply::status(409).with_body(r#"{"message":"company exists"}"#),
    );

    let mut list = h.ctx.companies();
    list.settled().await;

    let create = h.ctx.create_company();
    let req = CreateCompanyRequest {
        name: "Northwind".into(),
        industry: "finance".into(),
        description: String::new(),
        contact: Contact::default(),
    };
    assert!(create.run(&h.ctx.cache, req).await.is_err());
    assert!(!h.ctx.cache.is_stale(&keys::companies()));
    assert_eq!(h.mock.calls(Method::Get, "/companies"), 1);
}

#[tokio::test]
async fn empty_list_renders_empty_state() {
    let h = harness();
    h.mock.on(Method::Get, "/deals", MockReply::json(&Vec::<()>::new()));

    let state = h.ctx.deals().settled().await;
    assert_eq!(state.render_state(), RenderState::Empty);
}

#[tokio::test]
async fn server_error_renders_error_state() {
    let h = harness();
    h.mock.on(Method::Get, "/deals", MockReply::status(500));

    let state = h.ctx.deals().settled().await;
    assert_eq!(state.render_state(), RenderState::Error);
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_overwrites_newer_data() {
    let h = harness();
    let old = vec![deal("Helios Solar")];
    let new = vec![deal("Helios Solar"), deal("Borealis Wind")];
    h.mock
        .on(Method::Get, "/deals", MockReply::json(&old).delayed(Duration::from_millis(100)))
        .on(Method::Get, "/deals", MockReply::json(&new).delayed(Duration::from_millis(10)));

    let list = h.ctx.deals();
    assert!(list.is_fetching());
    // let the mount request go out first
    tokio::task::yield_now().await;
    assert_eq!(h.ctx.cache.invalidate_queries(&keys::deals()).await, 1);
    assert_eq!(list.current(), QueryState::Success(new.clone()));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(list.current(), QueryState::Success(new));
    assert_eq!(h.mock.calls(Method::Get, "/deals"), 2);
}
