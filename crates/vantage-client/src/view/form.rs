use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use vantage_types::Validate;
use vantage_types::api::{UpdateCompanyRequest, UpdateEventRequest};
use vantage_types::models::{ActivityStatus, Company, Contact, Event, EventKind, EventStatus};

use crate::error::ApiError;

/// Editable projection of an entity that knows how to express its changes as
/// a partial update.
pub trait FormModel: Clone + PartialEq {
    type Patch: Serialize + Validate;

    /// Only the fields that differ between `original` and `self`.
    fn diff(&self, original: &Self) -> Self::Patch;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyForm {
    pub name: String,
    pub industry: String,
    pub description: String,
    pub contact: Contact,
    pub status: ActivityStatus,
}

impl From<&Company> for CompanyForm {
    fn from(c: &Company) -> Self {
        Self {
            name: c.name.clone(),
            industry: c.industry.clone(),
            description: c.description.clone(),
            contact: c.contact.clone(),
            status: c.status,
        }
    }
}

fn changed<T: Clone + PartialEq>(edited: &T, original: &T) -> Option<T> {
    (edited != original).then(|| edited.clone())
}

impl FormModel for CompanyForm {
    type Patch = UpdateCompanyRequest;

    fn diff(&self, original: &Self) -> UpdateCompanyRequest {
        UpdateCompanyRequest {
            name: changed(&self.name, &original.name),
            industry: changed(&self.industry, &original.industry),
            description: changed(&self.description, &original.description),
            contact: changed(&self.contact, &original.contact),
            status: changed(&self.status, &original.status),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub kind: EventKind,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
}

impl From<&Event> for EventForm {
    fn from(e: &Event) -> Self {
        Self {
            title: e.title.clone(),
            kind: e.kind,
            date: e.date,
            location: e.location.clone(),
            status: e.status,
        }
    }
}

impl FormModel for EventForm {
    type Patch = UpdateEventRequest;

    fn diff(&self, original: &Self) -> UpdateEventRequest {
        UpdateEventRequest {
            title: changed(&self.title, &original.title),
            kind: changed(&self.kind, &original.kind),
            date: changed(&self.date, &original.date),
            location: changed(&self.location, &original.location),
            status: changed(&self.status, &original.status),
        }
    }
}

/// Local edits on top of the last saved values. Nothing reaches the server
/// until `save`, which sends one patch with whatever the fields hold then.
#[derive(Debug, Clone)]
pub struct EditDraft<T> {
    original: T,
    current: T,
}

impl<T: FormModel> EditDraft<T> {
    pub fn new(original: T) -> Self {
        Self {
            current: original.clone(),
            original,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn edit(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.current);
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.original
    }

    pub fn discard(&mut self) {
        self.current = self.original.clone();
    }

    /// Start over from freshly fetched values, dropping unsaved edits.
    pub fn rebase(&mut self, original: T) {
        self.current = original.clone();
        self.original = original;
    }

    pub fn patch(&self) -> Option<T::Patch> {
        self.is_dirty().then(|| self.current.diff(&self.original))
    }

    /// Submit the pending patch, if any. On success the draft becomes clean;
    /// on failure the edits stay so the user can retry.
    pub async fn save<F, Fut, O>(&mut self, submit: F) -> Result<Option<O>, ApiError>
    where
        F: FnOnce(T::Patch) -> Fut,
        Fut: Future<Output = Result<O, ApiError>>,
    {
        let Some(patch) = self.patch() else {
            debug!("draft unchanged, nothing to save");
            return Ok(None);
        };
        patch.validate()?;
        let saved = self.current.clone();
        let out = submit(patch).await?;
        self.original = saved;
        Ok(Some(out))
    }
}
