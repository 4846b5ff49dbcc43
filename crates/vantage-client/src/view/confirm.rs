use std::future::Future;

use tracing::debug;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    Failed(ApiError),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmState<Id> {
    Idle,
    /// Dialog open for `Id`; nothing has been sent.
    Armed(Id),
    Confirming(Id),
    Resolved(Outcome),
}

/// Two-step guard for destructive actions. The action can only run from
/// `confirm`, and only for the id that was armed.
#[derive(Debug, Clone)]
pub struct ConfirmFlow<Id> {
    state: ConfirmState<Id>,
}

impl<Id> Default for ConfirmFlow<Id> {
    fn default() -> Self {
        Self {
            state: ConfirmState::Idle,
        }
    }
}

impl<Id: Clone + std::fmt::Debug> ConfirmFlow<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConfirmState<Id> {
        &self.state
    }

    pub fn pending(&self) -> Option<&Id> {
        match &self.state {
            ConfirmState::Armed(id) | ConfirmState::Confirming(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, ConfirmState::Confirming(_))
    }

    /// Open the dialog for `id`, replacing any other armed id. Ignored while a
    /// confirmation is already running.
    pub fn arm(&mut self, id: Id) -> bool {
        if self.is_confirming() {
            return false;
        }
        self.state = ConfirmState::Armed(id);
        true
    }

    pub fn cancel(&mut self) {
        if let ConfirmState::Armed(id) = &self.state {
            debug!("confirmation for {:?} cancelled", id);
            self.state = ConfirmState::Resolved(Outcome::Cancelled);
        }
    }

    /// Run `action` for the armed id. Returns `None` without running anything
    /// when nothing is armed.
    pub async fn confirm<F, Fut, T>(&mut self, action: F) -> Option<Result<T, ApiError>>
    where
        F: FnOnce(Id) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ConfirmState::Armed(id) = &self.state else {
            return None;
        };
        let id = id.clone();
        self.state = ConfirmState::Confirming(id.clone());

        let result = action(id).await;
        self.state = ConfirmState::Resolved(match &result {
            Ok(_) => Outcome::Done,
            Err(e) => Outcome::Failed(e.clone()),
        });
        Some(result)
    }
}
