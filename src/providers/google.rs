//! Google Custom Search Engine adapter.
//!
//! Calls the CSE JSON API with structured query parameters and maps items
//! to the normalised result shape. Google is the only provider that
//! reports query-wide totals, which are carried back for the aggregated
//! response header.

use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::ProviderAdapter;
use crate::types::{ProviderBatch, ProviderResult, ResultType, SearchProvider, SearchQuery, SortMode};

/// Items per CSE result page, used to derive the `start` offset from a
/// page number when no explicit start index is given.
pub const GOOGLE_ITEMS_PER_PAGE: u32 = 10;

/// Google CSE JSON API adapter.
pub struct GoogleAdapter;

impl ProviderAdapter for GoogleAdapter {
    async fn search(
        &self,
        query: &SearchQuery,
        config: &SearchConfig,
    ) -> Result<ProviderBatch, SearchError> {
        let keys = config.google_keys();
        let (Some(api_key), Some(engine_id)) = (
            keys.pick(),
            config
                .google_engine_id
                .as_deref()
                .filter(|id| !id.trim().is_empty()),
        ) else {
            return Err(SearchError::Config(
                "Google API key or search engine id not configured".into(),
            ));
        };

        tracing::trace!(query = query.text(), "Google search");

        let start = query
            .start_index()
            .unwrap_or((query.page() - 1) * GOOGLE_ITEMS_PER_PAGE + 1);

        let mut params = vec![
            ("key", api_key.to_string()),
            ("cx", engine_id.to_string()),
            ("q", query.text().to_string()),
            ("gl", config.google_gl.clone()),
            ("hl", config.google_hl.clone()),
            ("lr", config.google_lr.clone()),
            ("start", start.to_string()),
        ];
        if query.result_type() == ResultType::Image {
            params.push(("searchType", "image".to_string()));
        } else if query.sort() == SortMode::Date {
            params.push(("sort", "date".to_string()));
        }

        let client = http::build_client(config)?;
        let response = client
            .get(&config.google_endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("google request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Http(format!(
                "google API responded with status {status}: {body}"
            )));
        }

        let payload: GoogleResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("google payload: {e}")))?;

        Ok(batch_from(payload, query.result_type()))
    }

    fn provider(&self) -> SearchProvider {
        SearchProvider::Google
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<GoogleSearchInformation>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
    image: Option<GoogleImage>,
}

#[derive(Debug, Deserialize)]
struct GoogleImage {
    #[serde(rename = "contextLink")]
    context_link: Option<String>,
    #[serde(rename = "thumbnailLink")]
    thumbnail_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleSearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "formattedTotalResults")]
    formatted_total_results: Option<String>,
}

/// Map a parsed CSE payload to the normalised batch shape.
///
/// Snippets fall back to the title; image links are read only for image
/// queries. Extracted as a separate function for testability with fixture
/// payloads.
pub(crate) fn batch_from(payload: GoogleResponse, result_type: ResultType) -> ProviderBatch {
    let results = payload
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let title = item.title.unwrap_or_default();
            let snippet = item
                .snippet
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| title.clone());
            let (context_link, thumbnail_link) = match (result_type, item.image) {
                (ResultType::Image, Some(image)) => (image.context_link, image.thumbnail_link),
                _ => (None, None),
            };
            ProviderResult {
                title,
                snippet,
                link: item.link,
                original_rank: index + 1,
                source: SearchProvider::Google,
                context_link,
                thumbnail_link,
            }
        })
        .collect();

    let (total_results, formatted_total_results) = payload
        .search_information
        .map(|info| (info.total_results, info.formatted_total_results))
        .unwrap_or_default();

    ProviderBatch {
        results,
        total_results,
        formatted_total_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(payload: serde_json::Value) -> GoogleResponse {
        serde_json::from_value(payload).expect("valid fixture")
    }

    #[test]
    fn maps_items_with_ranks_and_source() {
        let payload = parse(serde_json::json!({
            "items": [
                {"title": "First", "snippet": "first snippet", "link": "https://a.com"},
                {"title": "Second", "snippet": "second snippet", "link": "https://b.com"}
            ],
            "searchInformation": {"totalResults": "1234", "formattedTotalResults": "1,234"}
        }));
        let batch = batch_from(payload, ResultType::Web);

        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.results[0].original_rank, 1);
        assert_eq!(batch.results[1].original_rank, 2);
        assert_eq!(batch.results[0].source, SearchProvider::Google);
        assert_eq!(batch.total_results.as_deref(), Some("1234"));
        assert_eq!(batch.formatted_total_results.as_deref(), Some("1,234"));
    }

    #[test]
    fn snippet_falls_back_to_title() {
        let payload = parse(serde_json::json!({
            "items": [{"title": "Only Title", "link": "https://a.com"}]
        }));
        let batch = batch_from(payload, ResultType::Web);
        assert_eq!(batch.results[0].snippet, "Only Title");
    }

    #[test]
    fn empty_snippet_falls_back_to_title() {
        let payload = parse(serde_json::json!({
            "items": [{"title": "Title", "snippet": "", "link": "https://a.com"}]
        }));
        let batch = batch_from(payload, ResultType::Web);
        assert_eq!(batch.results[0].snippet, "Title");
    }

    #[test]
    fn missing_link_preserved_as_none() {
        let payload = parse(serde_json::json!({
            "items": [{"title": "No Link"}]
        }));
        let batch = batch_from(payload, ResultType::Web);
        assert!(batch.results[0].link.is_none());
    }

    #[test]
    fn image_links_read_only_for_image_queries() {
        let fixture = serde_json::json!({
            "items": [{
                "title": "Pic",
                "link": "https://img.a.com/full.jpg",
                "image": {
                    "contextLink": "https://a.com/page",
                    "thumbnailLink": "https://img.a.com/thumb.jpg"
                }
            }]
        });

        let web = batch_from(parse(fixture.clone()), ResultType::Web);
        assert!(web.results[0].context_link.is_none());
        assert!(web.results[0].thumbnail_link.is_none());

        let image = batch_from(parse(fixture), ResultType::Image);
        assert_eq!(
            image.results[0].context_link.as_deref(),
            Some("https://a.com/page")
        );
        assert_eq!(
            image.results[0].thumbnail_link.as_deref(),
            Some("https://img.a.com/thumb.jpg")
        );
    }

    #[test]
    fn payload_without_items_yields_empty_batch() {
        let batch = batch_from(parse(serde_json::json!({})), ResultType::Web);
        assert!(batch.results.is_empty());
        assert!(batch.total_results.is_none());
    }

    #[test]
    fn start_offset_derivation() {
        let paged = SearchQuery::new("q", SortMode::Relevance, ResultType::Web)
            .expect("valid query")
            .with_page(3);
        let start = paged
            .start_index()
            .unwrap_or((paged.page() - 1) * GOOGLE_ITEMS_PER_PAGE + 1);
        assert_eq!(start, 21);

        let explicit = paged.with_start_index(55);
        let start = explicit
            .start_index()
            .unwrap_or((explicit.page() - 1) * GOOGLE_ITEMS_PER_PAGE + 1);
        assert_eq!(start, 55);
    }

    #[tokio::test]
    async fn missing_credentials_is_config_error() {
        let query =
            SearchQuery::new("q", SortMode::Relevance, ResultType::Web).expect("valid query");
        let err = GoogleAdapter
            .search(&query, &SearchConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }
}
