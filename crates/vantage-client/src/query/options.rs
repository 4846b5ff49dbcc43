use std::time::Duration;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);
pub const QUARTER_HOUR: Duration = Duration::from_secs(15 * 60);
pub const MINUTE: Duration = Duration::from_secs(60);

/// Per-read policy: how long data stays fresh and what may trigger a refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub stale_time: Duration,
    /// When false the fetcher is never called (missing parent id, no session).
    pub enabled: bool,
    /// Refetch stale data when a new observer mounts.
    pub refetch_on_mount: bool,
    /// Refetch stale data when the window regains focus.
    pub refetch_on_focus: bool,
}

impl Default for QueryOptions {
    /// Always stale, refetch on every trigger.
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            enabled: true,
            refetch_on_mount: true,
            refetch_on_focus: true,
        }
    }
}

impl QueryOptions {
    /// Reference data: fresh for a day, no mount or focus refetches.
    pub fn daily() -> Self {
        Self {
            stale_time: DAY,
            enabled: true,
            refetch_on_mount: false,
            refetch_on_focus: false,
        }
    }

    /// Live market widgets.
    pub fn market() -> Self {
        Self {
            stale_time: MINUTE,
            ..Self::default()
        }
    }

    /// Fund performance series.
    pub fn quarter_hour() -> Self {
        Self {
            stale_time: QUARTER_HOUR,
            refetch_on_focus: false,
            ..Self::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }
}
