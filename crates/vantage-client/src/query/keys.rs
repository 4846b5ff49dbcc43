//! Cache keys for every read the dashboards make.
//!
//! Nested resources share their parent's prefix, so invalidating
//! `company(id)` also covers that company's events and investors.

use uuid::Uuid;
use vantage_types::api::CampaignSearch;

use super::key::QueryKey;

pub fn profile() -> QueryKey {
    QueryKey::new("auth").with("profile")
}

// -- Companies --

pub fn companies() -> QueryKey {
    QueryKey::new("companies")
}

pub fn company(id: Uuid) -> QueryKey {
    companies().with(id)
}

pub fn company_events(id: Uuid) -> QueryKey {
    company(id).with("events")
}

pub fn company_investors(id: Uuid) -> QueryKey {
    company(id).with("investors")
}

// -- Events --

pub fn events() -> QueryKey {
    QueryKey::new("events")
}

pub fn event(id: Uuid) -> QueryKey {
    events().with(id)
}

// -- Investors --

pub fn investors() -> QueryKey {
    QueryKey::new("investors")
}

pub fn investor(id: Uuid) -> QueryKey {
    investors().with(id)
}

pub fn investor_companies(id: Uuid) -> QueryKey {
    investor(id).with("companies")
}

// -- Crowdfunding --

pub fn campaigns() -> QueryKey {
    QueryKey::new("campaigns")
}

/// One page of a server-side search. Search text and category are key parts,
/// so editing either starts a fresh result set.
pub fn campaign_search(search: &CampaignSearch, offset: usize) -> QueryKey {
    campaigns()
        .with("search")
        .with(search.search.as_str())
        .with(search.category.clone())
        .with(offset)
}

pub fn campaign(id: Uuid) -> QueryKey {
    campaigns().with(id)
}

pub fn campaign_contributions(id: Uuid) -> QueryKey {
    campaign(id).with("contributions")
}

pub fn campaign_updates(id: Uuid) -> QueryKey {
    campaign(id).with("updates")
}

// -- Hedge funds --

pub fn funds() -> QueryKey {
    QueryKey::new("funds")
}

pub fn fund(id: Uuid) -> QueryKey {
    funds().with(id)
}

pub fn fund_metrics(id: Uuid) -> QueryKey {
    fund(id).with("metrics")
}

pub fn benchmark() -> QueryKey {
    QueryKey::new("market").with("benchmark")
}

pub fn top_movers() -> QueryKey {
    QueryKey::new("market").with("movers")
}

// -- Deals --

pub fn deals() -> QueryKey {
    QueryKey::new("deals")
}

pub fn deal(id: Uuid) -> QueryKey {
    deals().with(id)
}

pub fn deal_tracking(id: Uuid) -> QueryKey {
    deal(id).with("tracking")
}
