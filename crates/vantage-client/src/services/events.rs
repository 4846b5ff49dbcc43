use uuid::Uuid;
use vantage_types::Validate;
use vantage_types::api::{CreateEventRequest, RsvpRequest, UpdateEventRequest};
use vantage_types::models::Event;

use crate::api::ApiClient;
use crate::error::ApiError;

pub async fn list_for_company(api: &ApiClient, company_id: Uuid) -> Result<Vec<Event>, ApiError> {
    api.get(&format!("/companies/{}/events", company_id)).await
}

pub async fn get(api: &ApiClient, id: Uuid) -> Result<Event, ApiError> {
    api.get(&format!("/events/{}", id)).await
}

pub async fn create(api: &ApiClient, company_id: Uuid, req: &CreateEventRequest) -> Result<Event, ApiError> {
    req.validate()?;
    api.post(&format!("/companies/{}/events", company_id), req).await
}

pub async fn update(api: &ApiClient, id: Uuid, patch: &UpdateEventRequest) -> Result<Event, ApiError> {
    patch.validate()?;
    api.patch(&format!("/events/{}", id), patch).await
}

pub async fn delete(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/events/{}", id)).await
}

pub async fn rsvp(api: &ApiClient, id: Uuid, investor_id: Uuid) -> Result<(), ApiError> {
    let body = RsvpRequest { investor_id, attending: true };
    api.post_empty(&format!("/events/{}/rsvp", id), Some(&body)).await
}

pub async fn cancel_rsvp(api: &ApiClient, id: Uuid, investor_id: Uuid) -> Result<(), ApiError> {
    let body = RsvpRequest { investor_id, attending: false };
    api.post_empty(&format!("/events/{}/rsvp", id), Some(&body)).await
}
