//! API key pools with random selection.
//!
//! Providers are configured with comma-separated key lists; each outbound
//! call picks one key uniformly at random to spread quota across keys.
//! This is load spreading, not a security measure — keys are opaque and
//! rotated externally.

use rand::seq::SliceRandom;

/// A parsed pool of API keys.
#[derive(Debug, Clone, Default)]
pub struct KeyPool {
    keys: Vec<String>,
}

impl KeyPool {
    /// Parse a raw comma-separated key string into a pool.
    ///
    /// Keys are trimmed; empty fragments are discarded. `None` or an
    /// all-whitespace string yields an empty pool.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let keys = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        Self { keys }
    }

    /// Whether the pool holds no usable keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of usable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Pick one key uniformly at random, or `None` for an empty pool.
    pub fn pick(&self) -> Option<&str> {
        self.keys.choose(&mut rand::thread_rng()).map(String::as_str)
    }
}
