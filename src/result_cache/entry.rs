use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::aggregators::WindowedResult;

/// A computed result and the instant it was computed. Replaced whole, never patched.
#[derive(Debug)]
pub struct CacheEntry {
    pub result: Arc<WindowedResult>,
    pub computed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(result: WindowedResult, computed_at: DateTime<Utc>) -> Self {
        Self {
            result: Arc::new(result),
            computed_at,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.computed_at
    }

    /// Fresh until strictly older than `freshness`.
    pub fn is_fresh(&self, now: DateTime<Utc>, freshness: TimeDelta) -> bool {
        self.age(now) <= freshness
    }
}

/// How a lookup was satisfied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Produced by this call
    Fresh,
    /// Served from an entry still inside its freshness window
    Cached,
    /// Refresh failed, the previous entry was served
    Stale(String),
    /// Refresh failed with nothing cached, a synthetic result was served
    Fallback(String),
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Fresh => "fresh",
            CacheStatus::Cached => "cached",
            CacheStatus::Stale(_) => "stale",
            CacheStatus::Fallback(_) => "fallback",
        }
    }

    /// Why the last refresh failed, for either degraded status.
    pub fn reason(&self) -> Option<&str> {
        match self {
            CacheStatus::Stale(e) | CacheStatus::Fallback(e) => Some(e.as_str()),
            CacheStatus::Fresh | CacheStatus::Cached => None,
        }
    }

    /// The error shown to consumers. A stale entry is real data, so only the
    /// synthetic fallback reports one.
    pub fn error(&self) -> Option<&str> {
        match self {
            CacheStatus::Fallback(e) => Some(e.as_str()),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.reason().is_some()
    }
}

#[derive(Clone, Debug)]
pub struct CacheLookup {
    pub result: Arc<WindowedResult>,
    pub computed_at: DateTime<Utc>,
    pub status: CacheStatus,
}

impl CacheLookup {
    pub(crate) fn from_entry(entry: &CacheEntry, status: CacheStatus) -> Self {
        Self {
            result: entry.result.clone(),
            computed_at: entry.computed_at,
            status,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }
}
