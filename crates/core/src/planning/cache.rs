//! Projection result caching using Moka.
//!
//! The engine is referentially transparent, so a projection can be reused
//! for as long as its input is unchanged. The `pennyplan` runner projects
//! through this cache.

use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::engine::PlanningEngine;
use super::error::PlanningError;
use super::types::{PlanningData, ProjectionInput, ProjectionResult};

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 32;

/// Default time-to-live for cache entries (10 minutes).
const DEFAULT_TTL_SECS: u64 = 600;

/// Cache for projection results, keyed by input hash. Thread-safe.
#[derive(Clone)]
pub struct ProjectionCache {
    cache: Cache<String, Arc<Vec<PlanningData>>>,
}

impl ProjectionCache {
    /// Creates a cache with default settings (32 entries, 10 minute TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of entries to cache
    /// * `ttl_secs` - Time-to-live in seconds for each entry
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Runs a projection, returning the cached rows if the same input was seen.
    ///
    /// Failed runs are not cached.
    ///
    /// # Errors
    ///
    /// Propagates `PlanningError` from the engine.
    pub fn run_cached(&self, input: &ProjectionInput) -> Result<ProjectionResult, PlanningError> {
        let input_hash = PlanningEngine::hash_input(input);

        if let Some(rows) = self.cache.get(&input_hash) {
            tracing::debug!(%input_hash, "Projection cache hit");
            return Ok(ProjectionResult {
                rows,
                input_hash,
                cached: true,
            });
        }

        let rows = Arc::new(PlanningEngine::run(input)?);
        self.cache.insert(input_hash.clone(), Arc::clone(&rows));

        Ok(ProjectionResult {
            rows,
            input_hash,
            cached: false,
        })
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Invalidates the entry for one input.
    pub fn invalidate(&self, input: &ProjectionInput) {
        self.cache.invalidate(&PlanningEngine::hash_input(input));
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks so counts and evictions are up to date.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for ProjectionCache {
    fn default() -> Self {
        Self::new()
    }
}
