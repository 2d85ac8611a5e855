//! Brave Search API adapter.
//!
//! Uses separate endpoints for web and image queries, authenticated with
//! the `X-Subscription-Token` header. Image results carry fallback title
//! and snippet text because the API frequently omits them.

use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ProviderBatch, ProviderResult, ResultType, SearchProvider, SearchQuery};

/// Title used when an image result has none.
const IMAGE_TITLE_FALLBACK: &str = "Image Result";
/// Snippet used when an image result has no usable text.
const IMAGE_SNIPPET_FALLBACK: &str = "No description available.";

/// Brave Search API adapter.
pub struct BraveAdapter;

impl ProviderAdapter for BraveAdapter {
    async fn search(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> Result<ProviderBatch, SearchError> {
        let keys = config.brave_keys();
        let Some(api_key) = keys.pick() else {
            return Err(SearchError::Config("Brave API key not configured".into()));
        };

        tracing::trace!(query = query.text(), "Brave search");

        let endpoint = match query.result_type() {
            ResultType::Image => &config.brave_image_endpoint,
            ResultType::Web => &config.brave_web_endpoint,
        };

        let client = http::build_client(config)?;
        let response = client
            .get(endpoint)
            .query(&[("q", query.text())])
            .header("X-Subscription-Token", api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("brave request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Http(format!(
                "brave API responded with status {status}: {body}"
            )));
        }

        let payload: BraveResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("brave payload: {e}")))?;

        Ok(batch_from(payload, query.result_type()))
    }

    fn provider(&self) -> SearchProvider {
        SearchProvider::Brave
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BraveResponse {
    web: Option<BraveWebSection>,
    #[serde(default)]
    results: Vec<BraveImageItem>,
}

#[derive(Debug, Deserialize)]
struct BraveWebSection {
    #[serde(default)]
    results: Vec<BraveWebItem>,
}

#[derive(Debug, Deserialize)]
struct BraveWebItem {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveImageItem {
    title: Option<String>,
    url: Option<String>,
    properties: Option<BraveImageProperties>,
    thumbnail: Option<BraveThumbnail>,
}

#[derive(Debug, Deserialize)]
struct BraveImageProperties {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BraveThumbnail {
    src: Option<String>,
}

/// Map a parsed Brave payload to the normalised batch shape.
pub(crate) fn batch_from(payload: BraveResponse, result_type: ResultType) -> ProviderBatch {
    let results = match result_type {
        ResultType::Image => payload
            .results
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let title = item
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| IMAGE_TITLE_FALLBACK.to_string());
                let snippet = item
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| IMAGE_SNIPPET_FALLBACK.to_string());
                ProviderResult {
                    title,
                    snippet,
                    link: item.properties.and_then(|p| p.url),
                    original_rank: index + 1,
                    source: SearchProvider::Brave,
                    context_link: item.url,
                    thumbnail_link: item.thumbnail.and_then(|t| t.src),
                }
            })
            .collect(),
        ResultType::Web => payload
            .web
            .map(|section| section.results)
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| ProviderResult {
                title: item.title.unwrap_or_default(),
                snippet: item.description.unwrap_or_default(),
                link: item.url,
                original_rank: index + 1,
                source: SearchProvider::Brave,
                context_link: None,
                thumbnail_link: None,
            })
            .collect(),
    };

    ProviderBatch {
        results,
        ..Default::default()
    }
}
