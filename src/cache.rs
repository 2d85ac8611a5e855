//! TTL cache for aggregated search responses.
//!
//! Caches the final client-shaped payload keyed by a deterministic
//! serialisation of the query parameters. Uses [`moka`] for async-friendly
//! caching with TTL and automatic eviction. The cache is owned by the
//! service; concurrent identical requests under a miss race may both
//! compute and both store — last write wins, which is acceptable since
//! values for the same key are deterministic up to provider latency jitter.

use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;

use crate::types::{ResultType, SearchData, SearchQuery, SortMode};

/// Maximum number of cached response payloads.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Response cache with a fixed TTL.
pub struct ResponseCache {
    inner: Cache<String, SearchData>,
}

impl ResponseCache {
    /// Build a cache whose entries live for `ttl_seconds`.
    ///
    /// `ttl_seconds` must be positive; callers disable caching by not
    /// constructing one.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build(),
        }
    }

    /// Look up a cached payload.
    pub async fn get(&self, key: &str) -> Option<SearchData> {
        self.inner.get(key).await
    }

    /// Store a payload under the given key.
    pub async fn insert(&self, key: String, data: SearchData) {
        self.inner.insert(key, data).await;
    }
}

/// Serialised key fields, in fixed declaration order.
#[derive(Serialize)]
struct KeyParts<'a> {
    q: &'a str,
    page: u32,
    sort: SortMode,
    #[serde(rename = "type")]
    result_type: ResultType,
    #[serde(rename = "startIndex")]
    start_index: Option<u32>,
}

/// Build the deterministic cache key for a query.
///
/// Identical query parameters always serialise to the identical key;
/// any parameter difference (including presence of `start_index`)
/// produces a different key.
pub fn cache_key(query: &SearchQuery) -> String {
    let parts = KeyParts {
        q: query.text(),
        page: query.page(),
        sort: query.sort(),
        result_type: query.result_type(),
        start_index: query.start_index(),
    };
    serde_json::to_string(&parts).unwrap_or_else(|_| {
        format!(
            "{}|{}|{:?}|{:?}|{:?}",
            query.text(),
            query.page(),
            query.sort(),
            query.result_type(),
            query.start_index()
        )
    })
}
