//! Shared HTTP client construction for provider requests.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};

/// Build a [`reqwest::Client`] for provider API calls.
///
/// The client carries the per-provider deadline from config as its request
/// timeout. The fan-out layer additionally enforces the same deadline with
/// `tokio::time::timeout` as the hard cancellation boundary.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.provider_timeout_ms))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
