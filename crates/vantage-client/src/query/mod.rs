//! Query cache: keyed reads with staleness windows, in-flight de-duplication,
//! latest-fetch-wins ordering and prefix invalidation.

mod cache;
mod key;
pub mod keys;
mod observer;
mod options;
mod state;

pub use cache::{CacheEvent, QueryCache};
pub use key::{KeyPart, QueryKey};
pub use observer::QueryObserver;
pub use options::QueryOptions;
pub use state::{QueryState, RenderState};
