//! Response cache in front of any [`DataSource`]

use crate::{DataSource, Observation, ObservationQuery, Result};
use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Entries kept before the least recently used query is evicted
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Wraps a data source and memoises successful answers for a fixed lifetime
///
/// Errors are never cached, so a transient failure is retried on the next
/// call. At most `capacity` queries are held at once. Clones share the same
/// cache.
pub struct CachingSource<S> {
    inner: S,
    cache: Arc<RwLock<TimedSizedCache<ObservationQuery, Vec<Observation>>>>,
}

impl<S: DataSource> CachingSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CACHE_CAPACITY)
    }

    /// A zero capacity is raised to one
    pub fn with_capacity(inner: S, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(TimedSizedCache::with_size_and_lifespan(
                capacity.max(1),
                ttl,
            ))),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.cache.write().await.cache_clear();
    }
}

impl<S: Clone> Clone for CachingSource<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

#[async_trait]
impl<S: DataSource> DataSource for CachingSource<S> {
    async fn get_observations(&self, query: &ObservationQuery) -> Result<Vec<Observation>> {
        // cache_get refreshes expiry bookkeeping, so it needs the write lock
        if let Some(hit) = self.cache.write().await.cache_get(query).cloned() {
            tracing::debug!(series_id = %query.series_id, "Cache hit");
            return Ok(hit);
        }

        tracing::debug!(series_id = %query.series_id, "Cache miss");
        let observations = self.inner.get_observations(query).await?;
        self.cache
            .write()
            .await
            .cache_set(query.clone(), observations.clone());
        Ok(observations)
    }
}
