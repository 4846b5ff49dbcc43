#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use vantage_client::AppContext;
use vantage_client::config::ClientConfig;
use vantage_client::mock::MockTransport;
use vantage_client::navigation::RecordingNavigator;
use vantage_client::session::MemorySessionStore;
use vantage_types::models::{ActivityStatus, Campaign, Company, Contact, Deal, DealStatus, Role, User};

pub struct Harness {
    pub mock: Arc<MockTransport>,
    pub store: Arc<MemorySessionStore>,
    pub nav: Arc<RecordingNavigator>,
    pub ctx: AppContext,
}

pub fn harness() -> Harness {
    build(MemorySessionStore::new())
}

/// A client restarted with a persisted session for `user`.
pub fn signed_in(user: &User) -> Harness {
    let h = build(MemorySessionStore::with_session(user.clone(), "persisted-token"));
    h.ctx.auth.init();
    h
}

fn build(store: MemorySessionStore) -> Harness {
    let mock = Arc::new(MockTransport::new());
    let store = Arc::new(store);
    let nav = Arc::new(RecordingNavigator::new());
    let ctx = AppContext::new(ClientConfig::default(), mock.clone(), store.clone(), nav.clone());
    Harness { mock, store, nav, ctx }
}

pub fn user(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        username: "ana".into(),
        email: "ana@vantage.test".into(),
        roles: vec![role],
        risk_profile: None,
    }
}

pub fn company(name: &str, industry: &str) -> Company {
    Company {
        id: Uuid::new_v4(),
        name: name.into(),
        industry: industry.into(),
        description: String::new(),
        contact: Contact::default(),
        status: ActivityStatus::Active,
        events: Vec::new(),
        investors: Vec::new(),
    }
}

pub fn deal(name: &str) -> Deal {
    Deal {
        id: Uuid::new_v4(),
        name: name.into(),
        sector: "energy".into(),
        required_investment: 1_000_000.0,
        current_investment: 250_000.0,
        status: DealStatus::Open,
    }
}

pub fn campaigns(count: usize) -> Vec<Campaign> {
    (0..count)
        .map(|i| Campaign {
            id: Uuid::new_v4(),
            title: format!("Campaign {}", i),
            category: "energy".into(),
            summary: String::new(),
            target_amount: 50_000.0,
            current_amount: 1_000.0 * i as f64,
            backers: i as u32,
            ends_at: Utc::now() + Duration::days(30),
            created_at: Utc::now(),
        })
        .collect()
}
