use std::fmt;
use std::sync::Mutex;

use tracing::info;
use uuid::Uuid;
use vantage_types::models::Role;

/// Pages the client can send the user to after an auth transition or a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard(Role),
    CompanyList,
    Company(Uuid),
    Event(Uuid),
    InvestorList,
    Investor(Uuid),
    CampaignList,
    Campaign(Uuid),
    FundList,
    Fund(Uuid),
    DealList,
    Deal(Uuid),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Dashboard(role) => match role {
                Role::Admin => "/admin".into(),
                Role::Representative => "/representative".into(),
                Role::FundManager => "/hedge-funds".into(),
                Role::Investor => "/investor".into(),
            },
            Self::CompanyList => "/companies".into(),
            Self::Company(id) => format!("/companies/{}", id),
            Self::Event(id) => format!("/events/{}", id),
            Self::InvestorList => "/investors".into(),
            Self::Investor(id) => format!("/investors/{}", id),
            Self::CampaignList => "/crowdfunding".into(),
            Self::Campaign(id) => format!("/crowdfunding/{}", id),
            Self::FundList => "/hedge-funds/funds".into(),
            Self::Fund(id) => format!("/hedge-funds/funds/{}", id),
            Self::DealList => "/private-equity".into(),
            Self::Deal(id) => format!("/private-equity/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Headless navigator: records nothing, just logs where the user would go.
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        info!("navigate to {}", route);
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).push(route);
    }
}
