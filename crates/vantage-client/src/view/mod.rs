//! State a page derives on top of cached data: filters, "load more" lists,
//! delete confirmations and edit drafts.

pub mod confirm;
pub mod fallback;
pub mod filter;
pub mod form;
pub mod pagination;

pub use confirm::{ConfirmFlow, ConfirmState, Outcome};
pub use fallback::{DataSource, FallbackMode, StaticSource, WithFallback};
pub use filter::{Facet, ListFilter, Listable, SortOrder};
pub use form::{CompanyForm, EditDraft, EventForm, FormModel};
pub use pagination::{AccumulatingPager, CAMPAIGN_PAGE_SIZE, CampaignBrowser};
