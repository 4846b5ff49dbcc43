use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Users --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Representative,
    FundManager,
    Investor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub tolerance: RiskTolerance,
    pub horizon_years: u32,
    #[serde(default)]
    pub accredited: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub risk_profile: Option<RiskProfile>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// The role whose dashboard the user lands on. Admin wins over the
    /// narrower roles; users without roles are treated as investors.
    pub fn primary_role(&self) -> Role {
        [Role::Admin, Role::Representative, Role::FundManager, Role::Investor]
            .into_iter()
            .find(|r| self.has_role(*r))
            .unwrap_or(Role::Investor)
    }
}

// -- Companies --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Inactive,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub industry: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact: Contact,
    pub status: ActivityStatus,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub investors: Vec<Investor>,
}

// -- Events --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Roadshow,
    EarningsCall,
    InvestorDay,
    Webinar,
    Conference,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roadshow => "roadshow",
            Self::EarningsCall => "earnings_call",
            Self::InvestorDay => "investor_day",
            Self::Webinar => "webinar",
            Self::Conference => "conference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub status: EventStatus,
    /// Investor ids that have RSVP'd.
    #[serde(default)]
    pub participants: Vec<Uuid>,
}

// -- Investors --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub contact: Contact,
    pub status: ActivityStatus,
    #[serde(default)]
    pub company_ids: Vec<Uuid>,
    #[serde(default)]
    pub event_ids: Vec<Uuid>,
}

// -- Crowdfunding --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub summary: String,
    pub target_amount: f64,
    pub current_amount: f64,
    #[serde(default)]
    pub backers: u32,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Percentage of the target raised so far, clamped to 0..=100.
    pub fn funding_progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount * 100.0).clamp(0.0, 100.0)
    }

    pub fn is_funded(&self) -> bool {
        self.target_amount > 0.0 && self.current_amount >= self.target_amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contribution {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub investor_id: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// -- Hedge funds --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeFund {
    pub id: Uuid,
    pub name: String,
    pub strategy: String,
    pub manager_id: Uuid,
    /// Assets under management, in the fund's base currency.
    pub aum: f64,
    #[serde(default)]
    pub inception: Option<NaiveDate>,
    pub status: ActivityStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    /// First day of the month the metric covers.
    pub month: NaiveDate,
    pub return_pct: f64,
    pub sharpe_ratio: f64,
    pub volatility: f64,
    pub drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub name: String,
    pub change_pct: f64,
}

// -- Private deals --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Sourcing,
    Open,
    Closed,
    Exited,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sourcing => "sourcing",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Exited => "exited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub name: String,
    pub sector: String,
    pub required_investment: f64,
    pub current_investment: f64,
    pub status: DealStatus,
}

impl Deal {
    /// Amount still needed to fill the round. Never negative.
    pub fn funding_gap(&self) -> f64 {
        (self.required_investment - self.current_investment).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorTracking {
    pub investor_id: Uuid,
    pub deal_id: Uuid,
    pub invested: f64,
    pub roi: f64,
    pub irr: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(target: f64, current: f64) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            title: "Solar co-op".into(),
            category: "energy".into(),
            summary: String::new(),
            target_amount: target,
            current_amount: current,
            backers: 0,
            ends_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn funding_progress_is_clamped() {
        assert_eq!(campaign(1000.0, 250.0).funding_progress(), 25.0);
        assert_eq!(campaign(1000.0, 5000.0).funding_progress(), 100.0);
        assert_eq!(campaign(0.0, 10.0).funding_progress(), 0.0);
        assert!(campaign(100.0, 100.0).is_funded());
    }

    #[test]
    fn primary_role_prefers_admin() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            roles: vec![Role::Investor, Role::Admin],
            risk_profile: None,
        };
        assert_eq!(user.primary_role(), Role::Admin);

        let bare = User { roles: vec![], ..user };
        assert_eq!(bare.primary_role(), Role::Investor);
    }

    #[test]
    fn event_kind_uses_type_on_the_wire() {
        let json = serde_json::json!({
            "id": Uuid::nil(),
            "companyId": Uuid::nil(),
            "title": "Q3 call",
            "type": "earnings_call",
            "date": "2026-03-01T15:00:00Z",
            "status": "scheduled"
        });
        let event: Event = serde_json::from_value(json).unwrap();
        assert_eq!(event.kind, EventKind::EarningsCall);
        assert!(event.participants.is_empty());
        assert!(event.location.is_empty());
    }

    #[test]
    fn deal_gap_never_negative() {
        let deal = Deal {
            id: Uuid::new_v4(),
            name: "Series A".into(),
            sector: "fintech".into(),
            required_investment: 100.0,
            current_investment: 140.0,
            status: DealStatus::Open,
        };
        assert_eq!(deal.funding_gap(), 0.0);
    }
}
