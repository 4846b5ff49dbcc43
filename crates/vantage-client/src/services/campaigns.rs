use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::{CampaignSearch, CreateCampaignRequest, CreateUpdateRequest};
use vantage_types::models::{Campaign, CampaignUpdate};

use crate::api::ApiClient;
use crate::error::ApiError;

/// One page of the server-side campaign search.
pub async fn search(
    api: &ApiClient,
    filter: &CampaignSearch,
    offset: usize,
    limit: usize,
) -> Result<Vec<Campaign>, ApiError> {
    let mut query = Vec::new();
    if !filter.search.trim().is_empty() {
        query.push(("search", filter.search.trim().to_string()));
    }
    if let Some(category) = &filter.category {
        query.push(("category", category.clone()));
    }
    query.push(("offset", offset.to_string()));
    query.push(("limit", limit.to_string()));
    api.get_with_query("/campaigns", &query).await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<Campaign, ApiError> {
    api.get(&format!("/campaigns/{}", id)).await
}

pub async fn create(api: &ApiClient, req: &CreateCampaignRequest) -> Result<Campaign, ApiError> {
    req.validate()?;
    api.post("/campaigns", req).await
}

pub async fn updates(api: &ApiClient, id: Uuid) -> Result<Vec<CampaignUpdate>, ApiError> {
    api.get(&format!("/campaigns/{}/updates", id)).await
}

pub async fn post_update(api: &ApiClient, id: Uuid, req: &CreateUpdateRequest) -> Result<CampaignUpdate, ApiError> {
    req.validate()?;
    api.post(&format!("/campaigns/{}/updates", id), req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use crate::transport::Method;
    use std::sync::Arc;

    #[tokio::test]
    async fn search_puts_filters_in_the_query_string() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            Method::Get,
            "/campaigns?search=solar&category=energy&offset=12&limit=12",
            MockReply::json(&Vec::<Campaign>::new()),
        );
        let api = ApiClient::new(mock.clone());
        let filter = CampaignSearch { search: " solar ".into(), category: Some("energy".into()) };

        let page = search(&api, &filter, 12, 12).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(mock.total_calls(), 1);
    }
}
