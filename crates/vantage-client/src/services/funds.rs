use uuid::Uuid;
use vantage_types::models::{BenchmarkPoint, HedgeFund, Mover, PerformanceMetric};

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list(api: &ApiClient) -> Result<Vec<HedgeFund>, ApiError> {
    api.get("/funds").await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<HedgeFund, ApiError> {
    api.get(&format!("/funds/{}", id)).await
}

pub async fn metrics(api: &ApiClient, id: Uuid) -> Result<Vec<PerformanceMetric>, ApiError> {
    api.get(&format!("/funds/{}/metrics", id)).await
}

pub async fn benchmark(api: &ApiClient) -> Result<Vec<BenchmarkPoint>, ApiError> {
    api.get("/market/benchmark").await
}

pub async fn top_movers(api: &ApiClient) -> Result<Vec<Mover>, ApiError> {
    api.get("/market/movers").await
}
