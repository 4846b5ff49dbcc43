use thiserror::Error;
use vantage_types::ValidationError;

/// Every failure a query or mutation can surface.
///
/// `Clone` so one in-flight fetch can hand the same outcome to every caller
/// joined on its cache key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered 401. The session has already been torn down by the
    /// time a caller sees this.
    #[error("unauthorized")]
    Unauthorized,

    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The query's enabled guard is off (e.g. its parent id is missing).
    #[error("query is disabled")]
    Disabled,

    #[error("cached value for {0} has a different type")]
    CacheType(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
