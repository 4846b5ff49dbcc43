use crate::error::ApiError;

/// Snapshot of one cached read as a view sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// Disabled and never fetched.
    Idle,
    /// No data yet and a fetch is running.
    Loading,
    /// The latest fetch failed.
    Error(ApiError),
    Success(T),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// The four states every list page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Loading,
    Error,
    Empty,
    Populated,
}

impl<T> QueryState<Vec<T>> {
    pub fn render_state(&self) -> RenderState {
        match self {
            Self::Idle | Self::Loading => RenderState::Loading,
            Self::Error(_) => RenderState::Error,
            Self::Success(items) if items.is_empty() => RenderState::Empty,
            Self::Success(_) => RenderState::Populated,
        }
    }
}
