use std::future::Future;
use std::sync::Mutex;

use futures_util::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::query::{QueryCache, QueryKey};

type MutateFn<I, O> = Box<dyn Fn(I) -> BoxFuture<'static, Result<O, ApiError>> + Send + Sync>;
type SuccessFn<O> = Box<dyn Fn(&O) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&ApiError) + Send + Sync>;
type SettledFn = Box<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error(ApiError),
}

/// A declared write: the call itself, the keys it makes stale, and the side
/// effects to run afterwards.
///
/// On success the declared keys are invalidated (active views refetch and are
/// awaited) before `on_success` runs. On failure the cache is left alone.
/// `on_settled` runs last in both cases.
pub struct Mutation<I, O> {
    mutate: MutateFn<I, O>,
    invalidates: Vec<QueryKey>,
    on_success: Vec<SuccessFn<O>>,
    on_error: Vec<ErrorFn>,
    on_settled: Vec<SettledFn>,
    status: Mutex<MutationStatus>,
}

impl<I, O> Mutation<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new<F, Fut>(mutate: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ApiError>> + Send + 'static,
    {
        Self {
            mutate: Box::new(move |input| mutate(input).boxed()),
            invalidates: Vec::new(),
            on_success: Vec::new(),
            on_error: Vec::new(),
            on_settled: Vec::new(),
            status: Mutex::new(MutationStatus::Idle),
        }
    }

    pub fn invalidates(mut self, key: QueryKey) -> Self {
        self.invalidates.push(key);
        self
    }

    pub fn on_success(mut self, f: impl Fn(&O) + Send + Sync + 'static) -> Self {
        self.on_success.push(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
        self.on_error.push(Box::new(f));
        self
    }

    pub fn on_settled(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_settled.push(Box::new(f));
        self
    }

    pub fn status(&self) -> MutationStatus {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The `saving` / `creating` flag a form shows while the call runs.
    pub fn is_pending(&self) -> bool {
        self.status() == MutationStatus::Pending
    }

    fn set_status(&self, status: MutationStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub async fn run(&self, cache: &QueryCache, input: I) -> Result<O, ApiError> {
        self.set_status(MutationStatus::Pending);
        let result = (self.mutate)(input).await;

        match &result {
            Ok(output) => {
                for key in &self.invalidates {
                    let refetched = cache.invalidate_queries(key).await;
                    debug!("mutation invalidated {} ({} active refetches)", key, refetched);
                }
                self.set_status(MutationStatus::Success);
                for f in &self.on_success {
                    f(output);
                }
            }
            Err(e) => {
                warn!("mutation failed: {}", e);
                self.set_status(MutationStatus::Error(e.clone()));
                for f in &self.on_error {
                    f(e);
                }
            }
        }

        for f in &self.on_settled {
            f();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{QueryOptions, QueryState};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[tokio::test]
    async fn success_invalidates_then_calls_handlers() {
        let cache = QueryCache::new();
        let key = QueryKey::new("companies");
        let version = Arc::new(AtomicUsize::new(0));

        let v = version.clone();
        let mut list = cache.observe(key.clone(), QueryOptions::daily(), move || {
            let n = v.load(Ordering::SeqCst);
            async move { Ok::<usize, ApiError>(n) }
        });
        assert_eq!(list.settled().await, QueryState::Success(0));

        let closed = Arc::new(AtomicBool::new(false));
        let settled = Arc::new(AtomicBool::new(false));
        let (c, s, v) = (closed.clone(), settled.clone(), version.clone());
        let create = Mutation::new(move |name: String| {
            v.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, ApiError>(name.len()) }
        })
        .invalidates(key.clone())
        .on_success(move |_| c.store(true, Ordering::SeqCst))
        .on_settled(move || s.store(true, Ordering::SeqCst));

        assert_eq!(create.run(&cache, "Northwind".into()).await, Ok(9));
        assert!(closed.load(Ordering::SeqCst));
        assert!(settled.load(Ordering::SeqCst));
        assert_eq!(create.status(), MutationStatus::Success);
        // the active list already reflects the refetch
        assert_eq!(list.current(), QueryState::Success(1));
    }

    #[tokio::test]
    async fn failure_leaves_cache_alone_and_still_settles() {
        let cache = QueryCache::new();
        let key = QueryKey::new("deals");
        cache.set_query_data(key.clone(), vec!["seed".to_string()]);

        let saving = Arc::new(AtomicBool::new(true));
        let errors = Arc::new(AtomicUsize::new(0));
        let (s, e) = (saving.clone(), errors.clone());
        let delete = Mutation::new(|_id: u32| async {
            Err::<(), _>(ApiError::Status { status: 409, message: "has investors".into() })
        })
        .invalidates(key.clone())
        .on_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })
        .on_settled(move || s.store(false, Ordering::SeqCst));

        assert!(delete.run(&cache, 4).await.is_err());
        assert!(!saving.load(Ordering::SeqCst));
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get_query_data::<Vec<String>>(&key), Some(vec!["seed".to_string()]));
        assert!(matches!(delete.status(), MutationStatus::Error(_)));
    }
}
