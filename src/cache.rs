//! `get`/`set_ex`/`delete`, with misses treated as non-fatal by every
//! caller. Backed by an in-process `moka` expiring map rather than the
//! original source's Redis, since callers already tolerate staleness and
//! misses — the backing store is interchangeable.
//!
//! `moka`'s time-to-live policy is fixed per cache instance rather than
//! per entry, so this crate runs one `Cache` per TTL tier it actually
//! needs (today: a single 5-minute leaderboard cache) instead of
//! threading a per-call duration through `moka` itself.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct Cache {
    inner: moka::future::Cache<String, Arc<Value>>,
}

impl Cache {
    pub fn new(ttl: Duration) -> Self {
        Cache {
            inner: moka::future::Cache::builder()
                .time_to_live(ttl)
                .max_capacity(10_000)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    pub async fn set_ex<T: Serialize>(&self, key: impl Into<String>, value: &T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.inner.insert(key.into(), Arc::new(json)).await;
        }
    }

    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}
