//! Aggregator configuration with sensible defaults.
//!
//! [`SearchConfig`] holds provider credentials, endpoints, deadlines, and
//! cache behaviour. Endpoints default to the public service URLs and are
//! configurable so tests can point adapters at mock backends.

use crate::credentials::KeyPool;
use crate::error::{Result, SearchError};
use crate::types::SearchProvider;

/// Configuration for the search aggregation service.
///
/// Use [`Default::default()`] and fill in credentials, or construct with
/// field overrides for custom behaviour. A provider with no usable
/// credentials is simply not queried.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Comma-separated Google CSE API key pool.
    pub google_api_keys: Option<String>,
    /// Google custom search engine id (`cx`).
    pub google_engine_id: Option<String>,
    /// Comma-separated Brave Search API key pool.
    pub brave_api_keys: Option<String>,
    /// Comma-separated key pool for the AI overview backend. Empty means
    /// the overview trigger never runs.
    pub overview_api_keys: Option<String>,

    /// Google CSE endpoint.
    pub google_endpoint: String,
    /// Brave web search endpoint.
    pub brave_web_endpoint: String,
    /// Brave image search endpoint.
    pub brave_image_endpoint: String,
    /// OpenAI-compatible chat-completions endpoint for overview generation.
    pub overview_endpoint: String,
    /// Model requested from the overview backend.
    pub overview_model: String,
    /// Query-suggestion endpoint.
    pub suggest_endpoint: String,

    /// Google geolocation parameter (`gl`).
    pub google_gl: String,
    /// Google interface language parameter (`hl`).
    pub google_hl: String,
    /// Google language restriction parameter (`lr`).
    pub google_lr: String,

    /// Per-provider hard deadline in milliseconds.
    pub provider_timeout_ms: u64,
    /// How long to cache aggregated responses, in seconds. 0 disables caching.
    pub cache_ttl_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            google_api_keys: None,
            google_engine_id: None,
            brave_api_keys: None,
            overview_api_keys: None,
            google_endpoint: "https://customsearch.googleapis.com/customsearch/v1".into(),
            brave_web_endpoint: "https://api.search.brave.com/res/v1/web/search".into(),
            brave_image_endpoint: "https://api.search.brave.com/res/v1/images/search".into(),
            overview_endpoint: "https://my-openai-gemini-demo.vercel.app/v1/chat/completions"
                .into(),
            overview_model: "gemini-2.5-flash".into(),
            suggest_endpoint: "https://www.google.com/complete/search".into(),
            google_gl: "hk".into(),
            google_hl: "zh-HK".into(),
            google_lr: "lang_zh-HK".into(),
            provider_timeout_ms: 5_000,
            cache_ttl_seconds: 7_200,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `provider_timeout_ms` must be greater than 0
    /// - endpoint URLs must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.provider_timeout_ms == 0 {
            return Err(SearchError::Config(
                "provider_timeout_ms must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("google_endpoint", &self.google_endpoint),
            ("brave_web_endpoint", &self.brave_web_endpoint),
            ("brave_image_endpoint", &self.brave_image_endpoint),
            ("overview_endpoint", &self.overview_endpoint),
            ("suggest_endpoint", &self.suggest_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(SearchError::Config(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }

    /// Key pool for Google CSE.
    pub fn google_keys(&self) -> KeyPool {
        KeyPool::from_raw(self.google_api_keys.as_deref())
    }

    /// Key pool for Brave Search.
    pub fn brave_keys(&self) -> KeyPool {
        KeyPool::from_raw(self.brave_api_keys.as_deref())
    }

    /// Key pool for the overview backend.
    pub fn overview_keys(&self) -> KeyPool {
        KeyPool::from_raw(self.overview_api_keys.as_deref())
    }

    /// Whether the overview backend is configured at all.
    pub fn overview_enabled(&self) -> bool {
        !self.overview_keys().is_empty()
    }

    /// The providers this configuration can actually query.
    ///
    /// A provider is configured when its credentials are complete; anything
    /// less is skipped with a warning rather than failing the request.
    pub fn configured_providers(&self) -> Vec<SearchProvider> {
        let mut providers = Vec::new();
        let has_engine_id = self
            .google_engine_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if !self.google_keys().is_empty() && has_engine_id {
            providers.push(SearchProvider::Google);
        } else {
            tracing::warn!("Google API key or engine id missing, skipping Google search");
        }
        if !self.brave_keys().is_empty() {
            providers.push(SearchProvider::Brave);
        } else {
            tracing::warn!("Brave API key missing, skipping Brave search");
        }
        providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SearchConfig {
        SearchConfig {
            google_api_keys: Some("gk-1,gk-2".into()),
            google_engine_id: Some("cx-1".into()),
            brave_api_keys: Some("bk-1".into()),
            overview_api_keys: Some("ok-1".into()),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_has_reference_values() {
        let config = SearchConfig::default();
        assert_eq!(config.provider_timeout_ms, 5_000);
        assert_eq!(config.cache_ttl_seconds, 7_200);
        assert_eq!(config.overview_model, "gemini-2.5-flash");
        assert_eq!(config.google_gl, "hk");
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(configured().validate().is_ok());
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SearchConfig {
            provider_timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider_timeout_ms"));
    }

    #[test]
    fn empty_endpoint_rejected() {
        let config = SearchConfig {
            google_endpoint: "  ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("google_endpoint"));
    }

    #[test]
    fn fully_configured_yields_both_providers() {
        let providers = configured().configured_providers();
        assert_eq!(
            providers,
            vec![SearchProvider::Google, SearchProvider::Brave]
        );
    }

    #[test]
    fn google_requires_engine_id() {
        let config = SearchConfig {
            google_engine_id: None,
            ..configured()
        };
        assert_eq!(config.configured_providers(), vec![SearchProvider::Brave]);
    }

    #[test]
    fn unconfigured_yields_no_providers() {
        assert!(SearchConfig::default().configured_providers().is_empty());
    }

    #[test]
    fn overview_enabled_tracks_key_pool() {
        assert!(configured().overview_enabled());
        assert!(!SearchConfig::default().overview_enabled());
        let blank = SearchConfig {
            overview_api_keys: Some("  ".into()),
            ..Default::default()
        };
        assert!(!blank.overview_enabled());
    }
}
