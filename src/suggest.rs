//! Query suggestion proxy.
//!
//! Fetches completions from the Google suggest endpoint, which answers in
//! GBK for Chinese locales, and returns the suggestion list. Standalone —
//! not part of the aggregation pipeline.

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;

/// Fetch query suggestions for a prefix.
///
/// # Errors
///
/// Returns [`SearchError::Validation`] for an empty query,
/// [`SearchError::Http`] for transport or non-2xx failures, and
/// [`SearchError::Parse`] if the payload is not the expected JSON array.
pub async fn suggest(query: &str, config: &SearchConfig) -> Result<Vec<String>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(SearchError::Validation(
            "search query must not be empty".into(),
        ));
    }

    let client = http::build_client(config)?;
    let response = client
        .get(&config.suggest_endpoint)
        .query(&[("q", query), ("client", "chrome"), ("hl", "zh-CN")])
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("suggestion request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Http(format!(
            "suggestion API responded with status {status}"
        )));
    }

    // The endpoint serves GBK regardless of what the headers claim.
    let bytes = response
        .bytes()
        .await
        .map_err(|e| SearchError::Http(format!("suggestion response read failed: {e}")))?;
    let (text, _, _) = encoding_rs::GBK.decode(&bytes);

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| SearchError::Parse(format!("suggestion payload: {e}")))?;

    let suggestions = value
        .get(1)
        .and_then(|entry| entry.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(suggestions)
}
