//! One module per business area. Every function takes the shared
//! [`ApiClient`](crate::api::ApiClient), validates its request body first and
//! makes exactly one call.

pub mod auth;
pub mod campaigns;
pub mod companies;
pub mod contributions;
pub mod deals;
pub mod events;
pub mod funds;
pub mod investors;
