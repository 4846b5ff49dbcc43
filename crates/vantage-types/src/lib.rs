//! Records and request/response DTOs shared by the Vantage client crates.
//!
//! Entities mirror the JSON the platform API returns. Request bodies are
//! explicit structs that validate themselves before they leave the client.

pub mod api;
pub mod models;
pub mod validate;

pub use validate::{Validate, ValidationError};
