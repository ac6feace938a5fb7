//! Payment progress caching using Moka.
//!
//! Progress is a derived value read on every dashboard load. The cache is
//! read-through only: callers invalidate a loan whenever one of its payment
//! statuses changes, and the TTL bounds staleness if an invalidation is missed.

use std::time::Duration;

use amortis_shared::CacheConfig;
use amortis_shared::types::LoanId;
use moka::sync::Cache;
use tracing::debug;

use super::types::{PaymentProgress, ProgressLookup};

/// Default cache capacity (number of loans).
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default time-to-live for cache entries (1 hour).
const DEFAULT_TTL_SECS: u64 = 3600;

/// Cache for loan payment progress.
///
/// Thread-safe and suitable for concurrent access.
#[derive(Clone)]
pub struct PaymentProgressCache {
    cache: Cache<LoanId, PaymentProgress>,
}

impl PaymentProgressCache {
    /// Creates a cache with default settings.
    ///
    /// Default: 1000 entries max, 1 hour TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Creates a cache from the `cache` configuration section.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_config(config.max_capacity, config.ttl_secs)
    }

    /// Returns cached progress for a loan, computing and caching it on a miss.
    pub fn get_or_compute<F>(&self, loan_id: LoanId, compute: F) -> ProgressLookup
    where
        F: FnOnce() -> PaymentProgress,
    {
        if let Some(progress) = self.cache.get(&loan_id) {
            debug!(%loan_id, "payment progress cache hit");
            return ProgressLookup {
                progress,
                cached: true,
            };
        }

        debug!(%loan_id, "payment progress cache miss");
        let progress = compute();
        self.cache.insert(loan_id, progress);

        ProgressLookup {
            progress,
            cached: false,
        }
    }

    /// Drops the cached progress of one loan. Call on every payment status change.
    pub fn invalidate(&self, loan_id: LoanId) {
        debug!(%loan_id, "invalidating payment progress");
        self.cache.invalidate(&loan_id);
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    ///
    /// Moka evicts expired entries on its own; this reclaims them sooner.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for PaymentProgressCache {
    fn default() -> Self {
        Self::new()
    }
}
