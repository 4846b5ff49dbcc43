use std::marker::PhantomData;

use tokio::sync::broadcast::{self, error::RecvError};

use super::cache::{CacheEvent, QueryCache};
use super::key::QueryKey;
use super::state::QueryState;
use crate::error::ApiError;

/// A mounted view's interest in one key. Dropping it unmounts the view: it
/// stops counting as active and receives no further notifications.
pub struct QueryObserver<T> {
    cache: QueryCache,
    key: QueryKey,
    events: broadcast::Receiver<CacheEvent>,
    _data: PhantomData<fn() -> T>,
}

impl<T> QueryObserver<T> {
    pub(crate) fn new(cache: QueryCache, key: QueryKey, events: broadcast::Receiver<CacheEvent>) -> Self {
        Self {
            cache,
            key,
            events,
            _data: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn is_fetching(&self) -> bool {
        self.cache.is_fetching(&self.key)
    }

    /// Wait for the next change to this key. Returns false once the cache is gone.
    pub async fn changed(&mut self) -> bool {
        loop {
            match self.events.recv().await {
                Ok(event) if event.key() == &self.key => return true,
                Ok(_) => continue,
                // Missed some events; one of them may have been ours.
                Err(RecvError::Lagged(_)) => return true,
                Err(RecvError::Closed) => return false,
            }
        }
    }
}

impl<T: Clone + Send + Sync + 'static> QueryObserver<T> {
    pub fn current(&self) -> QueryState<T> {
        self.cache.query_state(&self.key)
    }

    /// Current state once no fetch is in flight for the key.
    pub async fn settled(&mut self) -> QueryState<T> {
        while self.is_fetching() {
            if !self.changed().await {
                break;
            }
        }
        self.current()
    }

    /// Force a refetch with this observer's fetcher, joining one already running.
    pub async fn refetch(&mut self) -> QueryState<T> {
        match self.cache.refetch_registered(&self.key).await {
            Err(ApiError::Disabled) => QueryState::Idle,
            _ => self.current(),
        }
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ApiError;
    use crate::query::{QueryCache, QueryKey, QueryOptions, QueryState, RenderState};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn mount_fetches_then_settles() {
        let cache = QueryCache::new();
        let mut observer = cache.observe(QueryKey::new("campaigns"), QueryOptions::daily(), || async {
            Ok::<Vec<u32>, ApiError>(vec![])
        });
        let state = observer.settled().await;
        assert_eq!(state, QueryState::Success(vec![]));
        assert_eq!(state.render_state(), RenderState::Empty);
    }

    #[tokio::test]
    async fn remount_with_fresh_data_does_not_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<u32, ApiError>(7) }
            }
        };
        let key = QueryKey::new("deals");

        let mut first = cache.observe(key.clone(), QueryOptions::daily(), fetch.clone());
        first.settled().await;
        drop(first);

        let second = cache.observe::<u32, _, _>(key.clone(), QueryOptions::daily(), fetch);
        assert!(!second.is_fetching());
        assert_eq!(second.current(), QueryState::Success(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.observer_count(&key), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn focus_refetches_stale_market_data_only() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = {
            let calls = calls.clone();
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) as u32;
                async move { Ok::<u32, ApiError>(n) }
            }
        };

        let mut quotes = cache.observe(QueryKey::new("movers"), QueryOptions::market(), fetch.clone());
        let mut companies = cache.observe(QueryKey::new("companies"), QueryOptions::daily(), fetch);
        quotes.settled().await;
        companies.settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // still fresh
        assert_eq!(cache.on_focus().await, 0);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.on_focus().await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn disabled_observer_stays_idle() {
        let cache = QueryCache::new();
        let mut observer = cache.observe(
            QueryKey::new("companies").with(None::<uuid::Uuid>).with("events"),
            QueryOptions::daily().enabled(false),
            || async { Ok::<Vec<u32>, ApiError>(vec![1]) },
        );
        assert!(!observer.is_fetching());
        assert_eq!(observer.refetch().await, QueryState::Idle);
        assert_eq!(observer.current().render_state(), RenderState::Loading);
    }
}
