//! Trait definition for pluggable search provider backends.
//!
//! Each backend (Google CSE, Brave) implements [`ProviderAdapter`] to
//! translate a normalised [`SearchQuery`] into a provider-specific API call
//! and parse the response into the common [`ProviderBatch`] shape.
//! Provider-specific payload fields never leak past this boundary.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{ProviderBatch, SearchProvider, SearchQuery};

/// A pluggable search provider backend.
///
/// Implementors handle their own:
///
/// - request construction with structured query parameters
/// - credential selection from the configured key pool
/// - JSON payload parsing into normalised [`ProviderBatch`] results
/// - error mapping for missing credentials, non-2xx responses, and
///   malformed payloads
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait ProviderAdapter: Send + Sync {
    /// Perform one search call and return the normalised batch.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] when credentials are missing,
    /// [`SearchError::Http`] for transport failures or non-2xx responses,
    /// and [`SearchError::Parse`] for malformed payloads.
    fn search(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<ProviderBatch, SearchError>> + Send;

    /// Returns which [`SearchProvider`] variant this implementation represents.
    fn provider(&self) -> SearchProvider;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProviderResult, ResultType, SortMode};

    /// A mock adapter for testing trait bounds and async execution.
    struct MockAdapter {
        provider: SearchProvider,
        results: Vec<ProviderResult>,
    }

    impl ProviderAdapter for MockAdapter {
        async fn search(
            &self,
            _query: &SearchQuery,
            _config: &SearchConfig,
        ) -> Result<ProviderBatch, SearchError> {
            if self.results.is_empty() {
                return Err(SearchError::Parse("mock adapter failure".into()));
            }
            Ok(ProviderBatch {
                results: self.results.clone(),
                ..Default::default()
            })
        }

        fn provider(&self) -> SearchProvider {
            self.provider
        }
    }

    fn query() -> SearchQuery {
        SearchQuery::new("test", SortMode::Relevance, ResultType::Web).expect("valid query")
    }

    #[test]
    fn mock_adapter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockAdapter>();
    }

    #[tokio::test]
    async fn mock_adapter_returns_results() {
        let adapter = MockAdapter {
            provider: SearchProvider::Google,
            results: vec![ProviderResult {
                title: "Test".into(),
                snippet: "A test result".into(),
                link: Some("https://test.com".into()),
                original_rank: 1,
                source: SearchProvider::Google,
                context_link: None,
                thumbnail_link: None,
            }],
        };
        let batch = adapter
            .search(&query(), &SearchConfig::default())
            .await
            .expect("should succeed");
        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.results[0].title, "Test");
    }

    #[tokio::test]
    async fn mock_adapter_propagates_errors() {
        let adapter = MockAdapter {
            provider: SearchProvider::Brave,
            results: vec![],
        };
        let result = adapter.search(&query(), &SearchConfig::default()).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("mock adapter failure"));
    }

    #[test]
    fn provider_returns_correct_variant() {
        let adapter = MockAdapter {
            provider: SearchProvider::Brave,
            results: vec![],
        };
        assert_eq!(adapter.provider(), SearchProvider::Brave);
    }
}
