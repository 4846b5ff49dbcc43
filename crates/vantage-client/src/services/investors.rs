use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::{CreateInvestorRequest, UpdateStatusRequest};
use vantage_types::models::{ActivityStatus, Company, Investor};

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list(api: &ApiClient) -> Result<Vec<Investor>, ApiError> {
    api.get("/investors").await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<Investor, ApiError> {
    api.get(&format!("/investors/{}", id)).await
}

pub async fn create(api: &ApiClient, req: &CreateInvestorRequest) -> Result<Investor, ApiError> {
    req.validate()?;
    api.post("/investors", req).await
}

pub async fn update_status(api: &ApiClient, id: Uuid, status: ActivityStatus) -> Result<Investor, ApiError> {
    api.patch(&format!("/investors/{}/status", id), &UpdateStatusRequest { status })
        .await
}

pub async fn delete(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/investors/{}", id)).await
}

pub async fn companies(api: &ApiClient, id: Uuid) -> Result<Vec<Company>, ApiError> {
    api.get(&format!("/investors/{}/companies", id)).await
}
