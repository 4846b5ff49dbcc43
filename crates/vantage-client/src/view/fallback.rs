//! Data sources for widgets that can run on bundled sample data when the
//! market endpoints are unavailable.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use tracing::{debug, warn};
use vantage_types::models::{BenchmarkPoint, Mover};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::services::funds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackMode {
    /// Surface remote errors as-is.
    Never,
    /// Serve the fallback when the remote call fails (but not on 401).
    #[default]
    OnError,
    /// Skip the remote call entirely.
    Always,
}

impl FallbackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::OnError => "on_error",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "on_error" | "on-error" => Ok(Self::OnError),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown fallback mode '{}', expected never, on_error or always", other)),
        }
    }
}

#[async_trait]
pub trait DataSource<T>: Send + Sync {
    async fn load(&self) -> Result<T, ApiError>;
}

/// Always returns a clone of the same value.
pub struct StaticSource<T> {
    value: T,
}

impl<T> StaticSource<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> DataSource<T> for StaticSource<T> {
    async fn load(&self) -> Result<T, ApiError> {
        Ok(self.value.clone())
    }
}

/// Adapts a closure returning a future, typically a service call.
pub struct RemoteSource<F> {
    fetch: F,
}

impl<F> RemoteSource<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<T, F, Fut> DataSource<T> for RemoteSource<F>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    async fn load(&self) -> Result<T, ApiError> {
        (self.fetch)().await
    }
}

pub struct WithFallback<T> {
    primary: Box<dyn DataSource<T>>,
    fallback: Box<dyn DataSource<T>>,
    mode: FallbackMode,
}

impl<T> WithFallback<T> {
    pub fn new(primary: Box<dyn DataSource<T>>, fallback: Box<dyn DataSource<T>>, mode: FallbackMode) -> Self {
        Self {
            primary,
            fallback,
            mode,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> DataSource<T> for WithFallback<T> {
    async fn load(&self) -> Result<T, ApiError> {
        match self.mode {
            FallbackMode::Always => self.fallback.load().await,
            FallbackMode::Never => self.primary.load().await,
            FallbackMode::OnError => match self.primary.load().await {
                Ok(value) => Ok(value),
                // Session is gone; sample data would hide that.
                Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
                Err(e) => {
                    warn!("primary source failed, using fallback: {}", e);
                    self.fallback.load().await
                }
            },
        }
    }
}

// -- Market widgets --

/// Thirteen monthly points of a flat-ish index, for the benchmark chart.
pub fn sample_benchmark() -> Vec<BenchmarkPoint> {
    const VALUES: [f64; 13] = [
        100.0, 101.8, 100.9, 103.2, 104.6, 103.9, 106.1, 107.4, 106.8, 109.0, 110.3, 109.7, 112.1,
    ];
    let Some(start) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
        return Vec::new();
    };
    VALUES
        .iter()
        .enumerate()
        .filter_map(|(i, value)| {
            let date = start.checked_add_days(Days::new(i as u64 * 30))?;
            Some(BenchmarkPoint { date, value: *value })
        })
        .collect()
}

pub fn sample_movers() -> Vec<Mover> {
    [
        ("NVDA", "NVIDIA Corp.", 4.21),
        ("AAPL", "Apple Inc.", 1.37),
        ("MSFT", "Microsoft Corp.", 0.84),
        ("XOM", "Exxon Mobil Corp.", -1.12),
        ("TSLA", "Tesla Inc.", -2.95),
    ]
    .into_iter()
    .map(|(symbol, name, change_pct)| Mover {
        symbol: symbol.into(),
        name: name.into(),
        change_pct,
    })
    .collect()
}

pub fn benchmark_source(api: ApiClient, mode: FallbackMode) -> WithFallback<Vec<BenchmarkPoint>> {
    debug!("benchmark source in {} mode", mode);
    let remote = RemoteSource::new(move || {
        let api = api.clone();
        async move { funds::benchmark(&api).await }
    });
    WithFallback::new(Box::new(remote), Box::new(StaticSource::new(sample_benchmark())), mode)
}

pub fn movers_source(api: ApiClient, mode: FallbackMode) -> WithFallback<Vec<Mover>> {
    debug!("top movers source in {} mode", mode);
    let remote = RemoteSource::new(move || {
        let api = api.clone();
        async move { funds::top_movers(&api).await }
    });
    WithFallback::new(Box::new(remote), Box::new(StaticSource::new(sample_movers())), mode)
}
