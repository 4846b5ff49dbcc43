use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::{CreateDealRequest, TrackInvestmentRequest};
use vantage_types::models::{Deal, InvestorTracking};

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list(api: &ApiClient) -> Result<Vec<Deal>, ApiError> {
    api.get("/deals").await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<Deal, ApiError> {
    api.get(&format!("/deals/{}", id)).await
}

pub async fn create(api: &ApiClient, req: &CreateDealRequest) -> Result<Deal, ApiError> {
    req.validate()?;
    api.post("/deals", req).await
}

pub async fn delete(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/deals/{}", id)).await
}

pub async fn tracking(api: &ApiClient, id: Uuid) -> Result<Vec<InvestorTracking>, ApiError> {
    api.get(&format!("/deals/{}/tracking", id)).await
}

pub async fn track_investment(
    api: &ApiClient,
    id: Uuid,
    req: &TrackInvestmentRequest,
) -> Result<InvestorTracking, ApiError> {
    req.validate()?;
    api.post(&format!("/deals/{}/tracking", id), req).await
}
