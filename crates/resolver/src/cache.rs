// ABOUTME: Optional LRU cache of resolution results keyed by normalized URL.
// ABOUTME: Lives on the Resolver, outside the stateless pipeline; disabled unless configured.

use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;

use crate::result::ResolutionResult;

/// Bounded cache of finished results.
pub struct ResolutionCache {
    inner: Mutex<LruCache<String, ResolutionResult>>,
}

impl ResolutionCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<ResolutionResult> {
        let mut cache = self.inner.lock().await;
        cache.get(key).cloned()
    }

    pub async fn put(&self, key: impl Into<String>, result: ResolutionResult) {
        let mut cache = self.inner.lock().await;
        cache.put(key.into(), result);
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache").finish_non_exhaustive()
    }
}
