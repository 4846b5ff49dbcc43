use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActivityStatus, Contact, DealStatus, EventKind, EventStatus, RiskProfile, User};
use crate::validate::{Validate, ValidationError, email, length, non_empty, positive};

// -- Auth --

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("username", &self.username)?;
        non_empty("password", &self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<RiskProfile>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        length("username", &self.username, 3, 32)?;
        email(&self.email)?;
        length("password", &self.password, 8, 128)
    }
}

// -- Companies --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: String,
    pub industry: String,
    pub description: String,
    pub contact: Contact,
}

impl Validate for CreateCompanyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        non_empty("industry", &self.industry)?;
        match &self.contact.email {
            Some(addr) => email(addr),
            None => Ok(()),
        }
    }
}

/// PATCH body. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
}

impl Validate for UpdateCompanyRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(name) = &self.name {
            non_empty("name", name)?;
        }
        if let Some(industry) = &self.industry {
            non_empty("industry", industry)?;
        }
        if let Some(addr) = self.contact.as_ref().and_then(|c| c.email.as_deref()) {
            email(addr)?;
        }
        Ok(())
    }
}

// -- Events --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub date: DateTime<Utc>,
    pub location: String,
}

impl Validate for CreateEventRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

impl Validate for UpdateEventRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if *self == Self::default() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(title) = &self.title {
            non_empty("title", title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRequest {
    pub investor_id: Uuid,
    pub attending: bool,
}

// -- Investors --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestorRequest {
    pub user_id: Uuid,
    pub name: String,
    pub contact: Contact,
}

impl Validate for CreateInvestorRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        match &self.contact.email {
            Some(addr) => email(addr),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusRequest {
    pub status: ActivityStatus,
}

// -- Crowdfunding --

/// Server-side campaign search. Part of the cache key, so every field that
/// changes the result set lives here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSearch {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub title: String,
    pub category: String,
    pub summary: String,
    pub target_amount: f64,
    pub ends_at: DateTime<Utc>,
}

impl Validate for CreateCampaignRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("title", &self.title)?;
        non_empty("category", &self.category)?;
        positive("targetAmount", self.target_amount)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRequest {
    pub investor_id: Uuid,
    pub amount: f64,
}

impl Validate for ContributionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUpdateRequest {
    pub message: String,
}

impl Validate for CreateUpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("message", &self.message)
    }
}

// -- Deals --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub name: String,
    pub sector: String,
    pub required_investment: f64,
    pub status: DealStatus,
}

impl Validate for CreateDealRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        non_empty("sector", &self.sector)?;
        positive("requiredInvestment", self.required_investment)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInvestmentRequest {
    pub investor_id: Uuid,
    pub amount: f64,
}

impl Validate for TrackInvestmentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        positive("amount", self.amount)
    }
}
