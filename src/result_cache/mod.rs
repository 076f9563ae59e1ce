pub mod entry;

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::aggregators::WindowedResult;
use crate::flows::sources::DataSource;

pub use entry::{CacheEntry, CacheLookup, CacheStatus};

/// Memoizes one `WindowedResult` per key for a bounded time.
///
/// Constructed once at startup and shared through the router state. The entry
/// map is only ever mutated by swapping a whole entry in or out. Refreshes are
/// single-flight per key: concurrent callers on an expired entry queue on the
/// key's refresh lock and re-check freshness once they get it.
pub struct ResultCache<K = DataSource> {
    entries: RwLock<HashMap<K, Arc<CacheEntry>>>,
    refresh_locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for ResultCache<K>
where
    K: Eq + Hash + Copy + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> ResultCache<K>
where
    K: Eq + Hash + Copy + Debug,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Serves the cached result for `key`, refreshing it through `producer` when older than `freshness`.
    pub async fn get_or_refresh<P, Fut, F>(
        &self,
        key: K,
        freshness: TimeDelta,
        producer: P,
        fallback: F,
    ) -> CacheLookup
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<WindowedResult>>,
        F: FnOnce() -> WindowedResult,
    {
        self.get_or_refresh_at(key, Utc::now(), freshness, producer, fallback)
            .await
    }

    /// Same as [`ResultCache::get_or_refresh`] with an explicit clock reading.
    ///
    /// A failed refresh never touches the stored entry. With an entry present the
    /// stale one is served, otherwise `fallback` supplies a result that is returned
    /// but not stored, so the next call tries the producer again.
    pub async fn get_or_refresh_at<P, Fut, F>(
        &self,
        key: K,
        now: DateTime<Utc>,
        freshness: TimeDelta,
        producer: P,
        fallback: F,
    ) -> CacheLookup
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<WindowedResult>>,
        F: FnOnce() -> WindowedResult,
    {
        if let Some(entry) = self.fresh_entry(&key, now, freshness).await {
            tracing::debug!(source = ?key, age_secs = entry.age(now).num_seconds(), "cache hit");
            return CacheLookup::from_entry(&entry, CacheStatus::Cached);
        }

        let lock = self.refresh_lock(key).await;
        let _guard = lock.lock().await;

        // another caller may have refreshed while we queued
        if let Some(entry) = self.fresh_entry(&key, now, freshness).await {
            return CacheLookup::from_entry(&entry, CacheStatus::Cached);
        }

        tracing::info!(source = ?key, "refreshing cached result");
        self.refresh_locked(key, now, producer, fallback).await
    }

    /// Refreshes `key` regardless of the current entry's age.
    pub async fn force_refresh<P, Fut, F>(&self, key: K, producer: P, fallback: F) -> CacheLookup
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<WindowedResult>>,
        F: FnOnce() -> WindowedResult,
    {
        self.force_refresh_at(key, Utc::now(), producer, fallback).await
    }

    /// Same as [`ResultCache::force_refresh`] with an explicit clock reading.
    ///
    /// Shares the refresh lock and failure handling of [`ResultCache::get_or_refresh_at`],
    /// so a failed forced refresh still serves the previous entry.
    pub async fn force_refresh_at<P, Fut, F>(
        &self,
        key: K,
        now: DateTime<Utc>,
        producer: P,
        fallback: F,
    ) -> CacheLookup
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<WindowedResult>>,
        F: FnOnce() -> WindowedResult,
    {
        let lock = self.refresh_lock(key).await;
        let _guard = lock.lock().await;

        tracing::info!(source = ?key, "forced refresh of cached result");
        self.refresh_locked(key, now, producer, fallback).await
    }

    /// Runs `producer` and applies the outcome. Callers hold the key's refresh lock.
    async fn refresh_locked<P, Fut, F>(&self, key: K, now: DateTime<Utc>, producer: P, fallback: F) -> CacheLookup
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<WindowedResult>>,
        F: FnOnce() -> WindowedResult,
    {
        match producer().await {
            Ok(result) => {
                let entry = Arc::new(CacheEntry::new(result, now));
                self.entries.write().await.insert(key, entry.clone());
                CacheLookup::from_entry(&entry, CacheStatus::Fresh)
            }
            Err(e) => {
                let error = format!("{:#}", e);
                match self.peek(key).await {
                    Some(stale) => {
                        tracing::warn!(
                            source = ?key,
                            error = %error,
                            age_secs = stale.age(now).num_seconds(),
                            "refresh failed, serving stale result"
                        );
                        CacheLookup::from_entry(&stale, CacheStatus::Stale(error))
                    }
                    None => {
                        tracing::warn!(source = ?key, error = %error, "refresh failed with empty cache, serving fallback");
                        CacheLookup {
                            result: Arc::new(fallback()),
                            computed_at: now,
                            status: CacheStatus::Fallback(error),
                        }
                    }
                }
            }
        }
    }

    /// The current entry for `key`, whatever its age.
    pub async fn peek(&self, key: K) -> Option<Arc<CacheEntry>> {
        self.entries.read().await.get(&key).cloned()
    }

    async fn fresh_entry(&self, key: &K, now: DateTime<Utc>, freshness: TimeDelta) -> Option<Arc<CacheEntry>> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_fresh(now, freshness))
            .cloned()
    }

    async fn refresh_lock(&self, key: K) -> Arc<Mutex<()>> {
        self.refresh_locks
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
