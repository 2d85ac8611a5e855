//! Concurrent provider fan-out with per-call deadlines.
//!
//! Invokes every configured provider adapter concurrently, each wrapped in
//! a timed call with an independent hard deadline. A provider failure of
//! any kind — timeout, non-2xx, malformed payload, missing credentials —
//! degrades that provider to an empty outcome with a recorded error and
//! never aborts its siblings. Total fan-out latency is bounded by the
//! slowest single provider, not the sum.

use std::time::{Duration, Instant};

use crate::config::SearchConfig;
use crate::provider::ProviderAdapter;
use crate::providers::{BraveAdapter, GoogleAdapter};
use crate::types::{ProviderBatch, ProviderResult, SearchProvider, SearchQuery};

/// What one provider call produced, success or not.
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    /// Which provider this outcome belongs to.
    pub provider: SearchProvider,
    /// Normalised hits; empty when the provider failed.
    pub results: Vec<ProviderResult>,
    /// Wall time the call took, including failed and timed-out calls.
    pub elapsed_ms: u64,
    /// Failure description, `None` on success.
    pub error: Option<String>,
    /// Query-wide total reported by the provider, if any.
    pub total_results: Option<String>,
    /// Human-formatted total reported by the provider, if any.
    pub formatted_total_results: Option<String>,
}

/// Query all given providers concurrently.
///
/// Outcomes are returned in the same order as `providers`. This function
/// never fails; per-provider errors are captured in the outcomes.
pub async fn fan_out(
    query: &SearchQuery,
    providers: &[SearchProvider],
    config: &SearchConfig,
) -> Vec<ProviderOutcome> {
    let calls: Vec<_> = providers
        .iter()
        .map(|provider| timed_call(*provider, query, config))
        .collect();
    futures::future::join_all(calls).await
}

/// Run one provider call under the configured hard deadline.
///
/// The deadline is a cancellation boundary: a call still in flight when it
/// expires is dropped, and the outcome records a timeout error.
pub async fn timed_call(
    provider: SearchProvider,
    query: &SearchQuery,
    config: &SearchConfig,
) -> ProviderOutcome {
    let deadline = Duration::from_millis(config.provider_timeout_ms);
    let started = Instant::now();
    let call = tokio::time::timeout(deadline, dispatch(provider, query, config)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match call {
        Ok(Ok(batch)) => {
            tracing::debug!(
                %provider,
                count = batch.results.len(),
                elapsed_ms,
                "provider returned results"
            );
            ProviderOutcome {
                provider,
                results: batch.results,
                elapsed_ms,
                error: None,
                total_results: batch.total_results,
                formatted_total_results: batch.formatted_total_results,
            }
        }
        Ok(Err(err)) => {
            tracing::warn!(%provider, error = %err, "provider query failed");
            failed_outcome(provider, elapsed_ms, err.to_string())
        }
        Err(_) => {
            let message = format!(
                "{provider} exceeded the {}ms deadline",
                config.provider_timeout_ms
            );
            tracing::warn!(%provider, elapsed_ms, "provider timed out");
            failed_outcome(provider, elapsed_ms, message)
        }
    }
}

fn failed_outcome(provider: SearchProvider, elapsed_ms: u64, error: String) -> ProviderOutcome {
    ProviderOutcome {
        provider,
        results: Vec::new(),
        elapsed_ms,
        error: Some(error),
        total_results: None,
        formatted_total_results: None,
    }
}

/// Dispatch to the concrete adapter for the given provider.
async fn dispatch(
    provider: SearchProvider,
    query: &SearchQuery,
    config: &SearchConfig,
) -> Result<ProviderBatch, crate::error::SearchError> {
    match provider {
        SearchProvider::Google => GoogleAdapter.search(query, config).await,
        SearchProvider::Brave => BraveAdapter.search(query, config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultType, SortMode};

    fn query() -> SearchQuery {
        SearchQuery::new("test", SortMode::Relevance, ResultType::Web).expect("valid query")
    }

    #[tokio::test]
    async fn unconfigured_provider_degrades_to_error_outcome() {
        // No credentials: the adapter fails before any network I/O.
        let outcome = timed_call(SearchProvider::Google, &query(), &SearchConfig::default()).await;
        assert_eq!(outcome.provider, SearchProvider::Google);
        assert!(outcome.results.is_empty());
        let error = outcome.error.expect("error recorded");
        assert!(error.contains("not configured"));
    }

    #[tokio::test]
    async fn fan_out_preserves_provider_order_and_isolation() {
        let providers = [SearchProvider::Google, SearchProvider::Brave];
        let outcomes = fan_out(&query(), &providers, &SearchConfig::default()).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].provider, SearchProvider::Google);
        assert_eq!(outcomes[1].provider, SearchProvider::Brave);
        // Both failed independently; neither aborted the other.
        assert!(outcomes.iter().all(|o| o.error.is_some()));
    }

    #[tokio::test]
    async fn fan_out_with_no_providers_returns_empty() {
        let outcomes = fan_out(&query(), &[], &SearchConfig::default()).await;
        assert!(outcomes.is_empty());
    }
}
