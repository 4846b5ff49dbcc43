use vantage_types::Validate;
use vantage_types::api::{LoginRequest, LoginResponse, RegisterRequest};
use vantage_types::models::User;

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn login(api: &ApiClient, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
    req.validate()?;
    api.post("/auth/login", req).await
}

/// Creates the account and signs it in; the server answers like `login`.
pub async fn register(api: &ApiClient, req: &RegisterRequest) -> Result<LoginResponse, ApiError> {
    req.validate()?;
    api.post("/auth/register", req).await
}

pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    api.post_empty::<()>("/auth/logout", None).await
}

pub async fn profile(api: &ApiClient) -> Result<User, ApiError> {
    api.get("/auth/profile").await
}
