use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use futures_util::future::{BoxFuture, FutureExt, Shared, join_all};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::key::QueryKey;
use super::observer::QueryObserver;
use super::options::QueryOptions;
use super::state::QueryState;
use crate::error::ApiError;

type Value = Arc<dyn Any + Send + Sync>;
type FetchResult = Result<Value, ApiError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

/// Broadcast to observers whenever an entry changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated(QueryKey),
    Removed(QueryKey),
}

impl CacheEvent {
    pub fn key(&self) -> &QueryKey {
        match self {
            Self::Updated(k) | Self::Invalidated(k) | Self::Removed(k) => k,
        }
    }
}

struct Entry {
    data: Option<Value>,
    /// Outcome of the latest fetch, if it failed. Cached data is kept.
    error: Option<ApiError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Generation of the fetch allowed to write this entry.
    generation: u64,
    inflight: Option<SharedFetch>,
    fetcher: Option<Fetcher>,
    options: QueryOptions,
}

impl Entry {
    fn new(options: QueryOptions) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            generation: 0,
            inflight: None,
            fetcher: None,
            options,
        }
    }

    fn is_stale(&self, now: Instant) -> bool {
        match self.updated_at {
            None => true,
            Some(at) => self.invalidated || now.duration_since(at) >= self.options.stale_time,
        }
    }

    fn fresh_data(&self, now: Instant) -> Option<Value> {
        if self.is_stale(now) {
            return None;
        }
        self.data.clone()
    }
}

/// Shared, process-wide cache of query results. Cheap to clone.
///
/// The entry map sits behind a std mutex that is never held across an
/// `.await`; fetches run as detached tasks so a view going away does not
/// strand a half-finished request in the map.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    /// Mounted views per key. Kept apart from `entries` so that `clear` and
    /// `remove_queries` do not forget views that are still mounted. Always
    /// taken after `entries` when both are held.
    observers: Mutex<HashMap<QueryKey, usize>>,
    /// Global so a key that is removed and re-created never reuses a
    /// generation still held by an old in-flight fetch.
    generation: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn observers(&self) -> MutexGuard<'_, HashMap<QueryKey, usize>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn notify(&self, event: CacheEvent) {
        let _ = self.events.send(event);
    }

    /// Apply a finished fetch, unless a newer one has been issued since.
    fn settle(&self, key: &QueryKey, generation: u64, result: &FetchResult) {
        {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                debug!("{} was removed while fetching, dropping response", key);
                return;
            };
            if entry.generation != generation {
                debug!(
                    "discarding superseded response for {} (generation {}, current {})",
                    key, generation, entry.generation
                );
                return;
            }
            entry.inflight = None;
            match result {
                Ok(value) => {
                    entry.data = Some(value.clone());
                    entry.error = None;
                    entry.updated_at = Some(Instant::now());
                    entry.invalidated = false;
                }
                Err(e) => {
                    debug!("fetch for {} failed: {}", key, e);
                    entry.error = Some(e.clone());
                }
            }
        }
        self.notify(CacheEvent::Updated(key.clone()));
    }
}

/// Start a fetch for `key`, superseding whatever is in flight.
fn start_fetch(
    inner: &Arc<CacheInner>,
    key: &QueryKey,
    entry: &mut Entry,
    fetcher: Fetcher,
) -> SharedFetch {
    let generation = inner.next_generation();
    entry.generation = generation;

    let weak: Weak<CacheInner> = Arc::downgrade(inner);
    let settle_key = key.clone();
    // Issue the request now so requests go out in the order they were started.
    let request = fetcher();
    let fetch = async move {
        let result = request.await;
        if let Some(inner) = weak.upgrade() {
            inner.settle(&settle_key, generation, &result);
        }
        result
    }
    .boxed()
    .shared();

    entry.inflight = Some(fetch.clone());
    tokio::spawn(fetch.clone());
    debug!("fetching {} (generation {})", key, generation);
    fetch
}

fn erase<T, F, Fut>(fetch: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetch();
        async move { fut.await.map(|v| Arc::new(v) as Value) }.boxed()
    })
}

fn downcast<T: Clone + 'static>(key: &QueryKey, value: &Value) -> Result<T, ApiError> {
    (**value)
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| ApiError::CacheType(key.to_string()))
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                observers: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    // -- Reads --

    /// Cached data while fresh, else the result of one shared network call.
    /// Concurrent callers with the same key join the same in-flight request.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let value = self.load(&key, options, erase(fetch), false).await?;
        downcast(&key, &value)
    }

    /// Like [`fetch_query`](Self::fetch_query) but ignores freshness. Still
    /// joins a request that is already in flight.
    pub async fn refetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let value = self.load(&key, options, erase(fetch), true).await?;
        downcast(&key, &value)
    }

    async fn load(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: Fetcher,
        force: bool,
    ) -> FetchResult {
        if !options.enabled {
            trace!("{} is disabled, not fetching", key);
            return Err(ApiError::Disabled);
        }

        let fetch = {
            let mut entries = self.inner.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(options));
            entry.options = options;
            entry.fetcher = Some(fetcher.clone());

            if !force {
                if let Some(value) = entry.fresh_data(Instant::now()) {
                    trace!("cache hit for {}", key);
                    return Ok(value);
                }
            }

            match &entry.inflight {
                Some(inflight) => {
                    trace!("joining in-flight fetch for {}", key);
                    inflight.clone()
                }
                None => start_fetch(&self.inner, key, entry, fetcher),
            }
        };

        fetch.await
    }

    /// Refetch using whatever fetcher was last registered for `key`.
    pub(crate) async fn refetch_registered(&self, key: &QueryKey) -> Result<(), ApiError> {
        let fetch = {
            let mut entries = self.inner.lock();
            let Some(entry) = entries.get_mut(key) else {
                return Err(ApiError::Disabled);
            };
            if !entry.options.enabled {
                return Err(ApiError::Disabled);
            }
            if let Some(inflight) = &entry.inflight {
                inflight.clone()
            } else {
                let Some(fetcher) = entry.fetcher.clone() else {
                    return Err(ApiError::Disabled);
                };
                start_fetch(&self.inner, key, entry, fetcher)
            }
        };
        fetch.await.map(|_| ())
    }

    pub fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.inner.lock();
        let value = entries.get(key)?.data.as_ref()?;
        downcast(key, value).ok()
    }

    pub fn query_state<T: Clone + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.inner.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::Idle;
        };
        if let Some(e) = &entry.error {
            return QueryState::Error(e.clone());
        }
        match &entry.data {
            Some(value) => match downcast(key, value) {
                Ok(data) => QueryState::Success(data),
                Err(e) => QueryState::Error(e),
            },
            None if entry.inflight.is_some() => QueryState::Loading,
            None => QueryState::Idle,
        }
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .lock()
            .get(key)
            .is_some_and(|e| e.inflight.is_some())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .lock()
            .get(key)
            .is_none_or(|e| e.is_stale(Instant::now()))
    }

    // -- Writes --

    /// Seed or overwrite an entry. Counts as the newest result for the key, so
    /// a fetch already in flight will not overwrite it.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let generation = self.inner.next_generation();
        {
            let mut entries = self.inner.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(QueryOptions::default()));
            entry.data = Some(Arc::new(value));
            entry.error = None;
            entry.updated_at = Some(Instant::now());
            entry.invalidated = false;
            entry.generation = generation;
            entry.inflight = None;
        }
        self.inner.notify(CacheEvent::Updated(key));
    }

    /// Mark every key under `prefix` stale. Keys with mounted observers are
    /// refetched right away and awaited; the rest refetch on their next read.
    /// Returns how many refetches were started.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut touched = Vec::new();
        let pending: Vec<SharedFetch> = {
            let mut entries = self.inner.lock();
            let observers = self.inner.observers();
            let mut pending = Vec::new();
            for (key, entry) in entries.iter_mut().filter(|(k, _)| k.starts_with(prefix)) {
                entry.invalidated = true;
                touched.push(key.clone());

                let active = observers.get(key).is_some_and(|n| *n > 0) && entry.options.enabled;
                match entry.fetcher.clone().filter(|_| active) {
                    Some(fetcher) => pending.push(start_fetch(&self.inner, key, entry, fetcher)),
                    None => {
                        // Nobody is watching; the in-flight response may predate
                        // the write that caused this, so let it go unapplied.
                        if entry.inflight.take().is_some() {
                            entry.generation = self.inner.next_generation();
                        }
                    }
                }
            }
            pending
        };

        debug!("invalidated {} keys under {}", touched.len(), prefix);
        for key in touched {
            self.inner.notify(CacheEvent::Invalidated(key));
        }

        let started = pending.len();
        join_all(pending).await;
        started
    }

    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let mut removed = Vec::new();
        self.inner.lock().retain(|key, _| {
            if key.starts_with(prefix) {
                removed.push(key.clone());
                false
            } else {
                true
            }
        });
        let count = removed.len();
        for key in removed {
            self.inner.notify(CacheEvent::Removed(key));
        }
        count
    }

    pub fn clear(&self) {
        let keys: Vec<QueryKey> = self.inner.lock().drain().map(|(k, _)| k).collect();
        debug!("cleared {} cached queries", keys.len());
        for key in keys {
            self.inner.notify(CacheEvent::Removed(key));
        }
    }

    /// Window regained focus: refetch stale, observed keys that opted in.
    pub async fn on_focus(&self) -> usize {
        let now = Instant::now();
        let pending: Vec<SharedFetch> = {
            let mut entries = self.inner.lock();
            let observers = self.inner.observers();
            let mut pending = Vec::new();
            for (key, entry) in entries.iter_mut() {
                let wants = observers.get(key).is_some_and(|n| *n > 0)
                    && entry.options.enabled
                    && entry.options.refetch_on_focus
                    && entry.inflight.is_none()
                    && entry.is_stale(now);
                if let Some(fetcher) = entry.fetcher.clone().filter(|_| wants) {
                    pending.push(start_fetch(&self.inner, key, entry, fetcher));
                }
            }
            pending
        };
        let started = pending.len();
        join_all(pending).await;
        started
    }

    // -- Observers --

    /// Mount a view on `key`. Fetches when there is no data, when the data was
    /// invalidated, or when it is stale and `refetch_on_mount` is set.
    pub fn observe<T, F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch: F) -> QueryObserver<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let fetcher = erase(fetch);
        // Subscribe before any fetch starts so its completion is not missed.
        let events = self.inner.events.subscribe();
        {
            let mut entries = self.inner.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(options));
            entry.options = options;
            entry.fetcher = Some(fetcher.clone());
            *self.inner.observers().entry(key.clone()).or_insert(0) += 1;

            let needs_data = entry.data.is_none()
                || entry.invalidated
                || (options.refetch_on_mount && entry.is_stale(Instant::now()));
            if options.enabled && entry.inflight.is_none() && needs_data {
                let _fetch = start_fetch(&self.inner, &key, entry, fetcher);
            }
        }
        QueryObserver::new(self.clone(), key, events)
    }

    pub(crate) fn release(&self, key: &QueryKey) {
        let mut observers = self.inner.observers();
        if let Some(count) = observers.get_mut(key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                observers.remove(key);
            }
        }
    }

    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.inner.observers().get(key).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::options::DAY;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn counting_fetch(
        calls: Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl Fn() -> BoxFuture<'static, Result<usize, ApiError>> + Clone + Send + Sync + 'static {
        move || {
            let calls = calls.clone();
            async move {
                tokio::time::sleep(delay).await;
                Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_reads_share_one_request() {
        let cache = QueryCache::new();
        let calls = counter();
        let fetch = counting_fetch(calls.clone(), Duration::from_millis(50));
        let key = QueryKey::new("companies");

        let (a, b) = tokio::join!(
            cache.fetch_query(key.clone(), QueryOptions::daily(), fetch.clone()),
            cache.fetch_query(key.clone(), QueryOptions::daily(), fetch),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_data_is_served_until_the_window_passes() {
        let cache = QueryCache::new();
        let calls = counter();
        let fetch = counting_fetch(calls.clone(), Duration::ZERO);
        let key = QueryKey::new("funds");

        cache.fetch_query(key.clone(), QueryOptions::daily(), fetch.clone()).await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;
        cache.fetch_query(key.clone(), QueryOptions::daily(), fetch.clone()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(DAY).await;
        let second = cache.fetch_query(key, QueryOptions::daily(), fetch).await.unwrap();
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn disabled_query_never_calls_fetcher() {
        let cache = QueryCache::new();
        let calls = counter();
        let fetch = counting_fetch(calls.clone(), Duration::ZERO);

        let out = cache
            .fetch_query(QueryKey::new("events"), QueryOptions::daily().enabled(false), fetch)
            .await;
        assert_eq!(out, Err(ApiError::Disabled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_response_does_not_overwrite_newer_one() {
        let cache = QueryCache::new();
        let key = QueryKey::new("quotes");
        let calls = counter();
        let c = calls.clone();
        let fetch = move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, ApiError>("old".to_string())
                } else {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok("new".to_string())
                }
            }
        };

        let observer = cache.observe::<String, _, _>(key.clone(), QueryOptions::default(), fetch);
        assert!(observer.is_fetching());

        assert_eq!(cache.invalidate_queries(&key).await, 1);
        assert_eq!(cache.get_query_data::<String>(&key).as_deref(), Some("new"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(cache.get_query_data::<String>(&key).as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_cached_data() {
        let cache = QueryCache::new();
        let key = QueryKey::new("deals");
        cache.set_query_data(key.clone(), vec![1u32, 2, 3]);
        cache.invalidate_queries(&key).await;

        let out = cache
            .fetch_query(key.clone(), QueryOptions::daily(), || async {
                Err::<Vec<u32>, _>(ApiError::Network("offline".into()))
            })
            .await;
        assert!(out.is_err());
        assert_eq!(cache.get_query_data::<Vec<u32>>(&key), Some(vec![1, 2, 3]));
        assert!(cache.query_state::<Vec<u32>>(&key).is_error());
    }

    #[tokio::test]
    async fn invalidation_without_observers_refetches_lazily() {
        let cache = QueryCache::new();
        let calls = counter();
        let fetch = counting_fetch(calls.clone(), Duration::ZERO);
        let key = QueryKey::new("investors");

        let observer = cache.observe::<usize, _, _>(key.clone(), QueryOptions::daily(), fetch.clone());
        drop(observer);
        // let the mount fetch finish
        cache.fetch_query(key.clone(), QueryOptions::daily(), fetch.clone()).await.unwrap();
        assert_eq!(cache.observer_count(&key), 0);

        assert_eq!(cache.invalidate_queries(&QueryKey::new("investors")).await, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_stale(&key));

        let next = cache.fetch_query(key, QueryOptions::daily(), fetch).await.unwrap();
        assert_eq!(next, 2);
    }

    #[tokio::test]
    async fn clear_keeps_counting_views_still_mounted() {
        let cache = QueryCache::new();
        let calls = counter();
        let fetch = counting_fetch(calls.clone(), Duration::ZERO);
        let key = QueryKey::new("companies");

        let mut first = cache.observe::<usize, _, _>(key.clone(), QueryOptions::daily(), fetch.clone());
        first.settled().await;
        cache.clear();

        let mut second = cache.observe::<usize, _, _>(key.clone(), QueryOptions::daily(), fetch);
        assert_eq!(second.settled().await, QueryState::Success(2));
        drop(first);
        assert_eq!(cache.observer_count(&key), 1);

        assert_eq!(cache.invalidate_queries(&key).await, 1);
        assert_eq!(second.current(), QueryState::Success(3));
        drop(second);
        assert_eq!(cache.observer_count(&key), 0);
    }

    #[tokio::test]
    async fn type_mismatch_is_reported() {
        let cache = QueryCache::new();
        let key = QueryKey::new("profile");
        cache.set_query_data(key.clone(), "ana".to_string());
        assert_eq!(
            cache.query_state::<u64>(&key),
            QueryState::Error(ApiError::CacheType(key.to_string()))
        );
        assert_eq!(cache.get_query_data::<u64>(&key), None);
    }

    #[tokio::test]
    async fn remove_and_clear_drop_entries() {
        let cache = QueryCache::new();
        let id = uuid::Uuid::new_v4();
        cache.set_query_data(QueryKey::new("companies").with(id), 1u8);
        cache.set_query_data(QueryKey::new("companies").with(id).with("events"), 2u8);
        cache.set_query_data(QueryKey::new("deals"), 3u8);

        assert_eq!(cache.remove_queries(&QueryKey::new("companies")), 2);
        assert_eq!(cache.get_query_data::<u8>(&QueryKey::new("deals")), Some(3));
        cache.clear();
        assert_eq!(cache.query_state::<u8>(&QueryKey::new("deals")), QueryState::Idle);
    }
}
