//! In-process page cache (Moka), namespaced by the deployment revision.
//!
//! Every key is prefixed with the revision-qualified cache prefix, so a new
//! deployment never serves pages rendered by the previous one.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

/// Maximum number of cached entries.
const MAX_CAPACITY: u64 = 10_000;

/// Cache layer keyed by `prefix + key`.
#[derive(Clone)]
pub struct CacheLayer {
    inner: Arc<CacheLayerInner>,
}

struct CacheLayerInner {
    /// Revision-qualified namespace prepended to every key.
    prefix: String,

    local: Cache<String, String>,
}

impl CacheLayer {
    /// Create a new cache layer.
    pub fn new(prefix: impl Into<String>, ttl_secs: u64) -> Self {
        let local = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner: Arc::new(CacheLayerInner {
                prefix: prefix.into(),
                local,
            }),
        }
    }

    /// The namespace applied to every key.
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Full key as stored.
    pub fn key(&self, key: &str) -> String {
        format!("{}{key}", self.inner.prefix)
    }

    /// Get a value from cache.
    pub async fn get(&self, key: &str) -> Option<String> {
        let key = self.key(key);
        let val = self.inner.local.get(&key).await;
        if val.is_some() {
            debug!(key = %key, "cache hit");
        }
        val
    }

    /// Set a value in cache.
    pub async fn set(&self, key: &str, value: &str) {
        let key = self.key(key);
        self.inner.local.insert(key.clone(), value.to_string()).await;
        debug!(key = %key, "cache set");
    }
}
