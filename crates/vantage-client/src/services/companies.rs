use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::{CreateCompanyRequest, UpdateCompanyRequest};
use vantage_types::models::Company;

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list(api: &ApiClient) -> Result<Vec<Company>, ApiError> {
    api.get("/companies").await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<Company, ApiError> {
    api.get(&format!("/companies/{}", id)).await
}

pub async fn create(api: &ApiClient, req: &CreateCompanyRequest) -> Result<Company, ApiError> {
    req.validate()?;
    api.post("/companies", req).await
}

/// Partial update; only the fields set on `patch` are sent.
pub async fn update(api: &ApiClient, id: Uuid, patch: &UpdateCompanyRequest) -> Result<Company, ApiError> {
    patch.validate()?;
    api.patch(&format!("/companies/{}", id), patch).await
}

pub async fn delete(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/companies/{}", id)).await
}

pub async fn link_investor(api: &ApiClient, company_id: Uuid, investor_id: Uuid) -> Result<(), ApiError> {
    api.post_empty::<()>(&format!("/companies/{}/investors/{}", company_id, investor_id), None)
        .await
}

pub async fn unlink_investor(api: &ApiClient, company_id: Uuid, investor_id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/companies/{}/investors/{}", company_id, investor_id))
        .await
}
