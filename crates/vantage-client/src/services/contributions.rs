use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::ContributionRequest;
use vantage_types::models::Contribution;

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list_for_campaign(api: &ApiClient, campaign_id: Uuid) -> Result<Vec<Contribution>, ApiError> {
    api.get(&format!("/campaigns/{}/contributions", campaign_id)).await
}

pub async fn contribute(
    api: &ApiClient,
    campaign_id: Uuid,
    req: &ContributionRequest,
) -> Result<Contribution, ApiError> {
    req.validate()?;
    api.post(&format!("/campaigns/{}/contributions", campaign_id), req)
        .await
}
