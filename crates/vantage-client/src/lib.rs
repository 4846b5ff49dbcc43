//! Data-fetching and mutation layer for the Vantage investment dashboards.
//!
//! Pages read through the shared [`query::QueryCache`], write through
//! [`mutation::Mutation`]s that invalidate what they touch, and reach the
//! REST API only via the [`services`] modules on top of [`api::ApiClient`].

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod hooks;
pub mod mock;
pub mod mutation;
pub mod navigation;
pub mod query;
pub mod services;
pub mod session;
pub mod transport;
pub mod view;

pub use api::ApiClient;
pub use app::AppContext;
pub use auth::AuthContext;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use mutation::{Mutation, MutationStatus};
pub use query::{QueryCache, QueryKey, QueryObserver, QueryOptions, QueryState, RenderState};
