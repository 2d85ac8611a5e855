//! Core types for search queries, provider results, and aggregated responses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SearchError};

/// Source identifier attached to AI overview tasks.
pub const GENERIC_AI_SOURCE: &str = "generic-ai";

/// Search providers that metasearch can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    /// Google Custom Search Engine — JSON API, keyed.
    Google,
    /// Brave Search API — independent index, keyed.
    Brave,
}

impl SearchProvider {
    /// Returns the wire identifier of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Brave => "brave",
        }
    }

    /// Returns all provider variants.
    pub fn all() -> &'static [SearchProvider] {
        &[Self::Google, Self::Brave]
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result ordering requested from providers that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Provider-native relevance ordering.
    #[default]
    Relevance,
    /// Most recent first.
    Date,
}

/// Kind of results requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// Ordinary web pages.
    #[default]
    Web,
    /// Image results with thumbnail and context links.
    Image,
}

/// A validated, immutable search query.
///
/// Construct with [`SearchQuery::new`]; the query text must be non-empty
/// after trimming or the constructor rejects it before any provider I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    page: u32,
    start_index: Option<u32>,
    sort: SortMode,
    result_type: ResultType,
}

impl SearchQuery {
    /// Create a query for the given text with default paging.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] if `text` is empty after trimming.
    pub fn new(text: impl Into<String>, sort: SortMode, result_type: ResultType) -> Result<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(SearchError::Validation(
                "search query must not be empty".into(),
            ));
        }
        Ok(Self {
            text,
            page: 1,
            start_index: None,
            sort,
            result_type,
        })
    }

    /// Set the 1-based result page. Zero is sanitised to 1.
    pub fn with_page(mut self, page: u32) -> Self {
        if page == 0 {
            tracing::warn!("invalid page 0, defaulting to 1");
            self.page = 1;
        } else {
            self.page = page;
        }
        self
    }

    /// Set the provider start index, which takes precedence over the page
    /// number. Zero is ignored.
    pub fn with_start_index(mut self, start_index: u32) -> Self {
        if start_index == 0 {
            tracing::warn!("invalid start index 0, ignoring");
            self.start_index = None;
        } else {
            self.start_index = Some(start_index);
        }
        self
    }

    /// The trimmed query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The 1-based page number (default 1).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Explicit provider start index, if set.
    pub fn start_index(&self) -> Option<u32> {
        self.start_index
    }

    /// Requested result ordering.
    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Requested result kind.
    pub fn result_type(&self) -> ResultType {
        self.result_type
    }
}

/// One ranked hit from one provider, normalised to a common shape.
///
/// Created per adapter call and consumed immediately by fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    /// Title of the hit.
    pub title: String,
    /// Text snippet describing the hit.
    pub snippet: String,
    /// Target link. Hits without a link are dropped before fusion.
    pub link: Option<String>,
    /// 1-based rank within the provider's own response.
    pub original_rank: usize,
    /// Which provider returned this hit.
    pub source: SearchProvider,
    /// Page hosting the image (image queries only).
    pub context_link: Option<String>,
    /// Thumbnail URL (image queries only).
    pub thumbnail_link: Option<String>,
}

/// Everything one adapter call produced.
#[derive(Debug, Clone, Default)]
pub struct ProviderBatch {
    /// Normalised hits in provider rank order.
    pub results: Vec<ProviderResult>,
    /// Query-wide total result count, for providers that report one
    /// (a string on the wire).
    pub total_results: Option<String>,
    /// Human-formatted total, e.g. `"About 1,230,000 results"`.
    pub formatted_total_results: Option<String>,
}

/// One fused entry after deduplication and RRF scoring.
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    /// Canonical dedup key derived from the link.
    pub canonical_key: String,
    /// First-seen original link, preserved for display.
    pub link: String,
    /// First-seen title.
    pub title: String,
    /// Longest non-empty snippet across contributing providers.
    pub snippet: String,
    /// Provider of the first-seen hit.
    pub source: SearchProvider,
    /// Cumulative Reciprocal Rank Fusion score.
    pub rrf_score: f64,
    /// Image context link, back-filled from any contributor.
    pub context_link: Option<String>,
    /// Image thumbnail link, back-filled from any contributor.
    pub thumbnail_link: Option<String>,
}

// ── Client-facing response shapes ─────────────────────────────

/// Summary figures for the whole search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInformation {
    /// Mean of the positive per-provider elapsed times, in milliseconds.
    pub search_time: f64,
    /// `search_time` rendered as `"X.XX seconds"`.
    pub formatted_search_time: String,
    /// Total result count: the providers' raw figure when available,
    /// otherwise the number of unique fused results.
    pub total_results: String,
    /// Human-formatted total.
    pub formatted_total_results: String,
}

/// Image links attached to an item for image queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// Page hosting the image.
    pub context_link: String,
    /// Thumbnail URL.
    pub thumbnail_link: String,
}

/// One fused result shaped for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientItem {
    /// Title of the result.
    pub title: String,
    /// Original (unnormalised) link.
    pub link: String,
    /// Bare host for display, scheme and `www.` stripped.
    pub display_link: String,
    /// Best snippet after merging.
    pub snippet: String,
    /// Wire identifier of the first-seen provider.
    pub source: String,
    /// Image links, present only for image results carrying both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
}

/// AI overview task advertised alongside the search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiTaskInfo {
    /// Whether an overview task was launched for this query.
    #[serde(rename = "hasAI")]
    pub has_ai: bool,
    /// Task id to poll, when launched.
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
    /// Task source identifier (always [`GENERIC_AI_SOURCE`]).
    pub source: String,
}

/// The cacheable aggregation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchData {
    /// Summary figures.
    pub search_information: SearchInformation,
    /// Fused results, best first.
    pub items: Vec<ClientItem>,
    /// Overview task advertisement.
    pub ai_task: AiTaskInfo,
}

/// Per-provider elapsed times, `null` for failed or unconfigured providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiTimings {
    /// Google elapsed milliseconds, if it succeeded.
    pub google: Option<u64>,
    /// Brave elapsed milliseconds, if it succeeded.
    pub brave: Option<u64>,
}

/// Envelope returned for every search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Whether the request produced data.
    pub success: bool,
    /// Aggregated payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SearchData>,
    /// Human-readable failure description, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time spent handling the request, in milliseconds.
    pub total_response_time: u64,
    /// Per-provider timings; absent entirely on failure or cache hit.
    pub api_timings: Option<ApiTimings>,
}

/// Derive the bare display host from a link: scheme and `www.` stripped,
/// everything after the first `/` dropped.
pub fn display_link(link: &str) -> String {
    let stripped = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .unwrap_or(link);
    let stripped = stripped.strip_prefix("www.").unwrap_or(stripped);
    stripped.split('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_empty_text() {
        let err = SearchQuery::new("   ", SortMode::Relevance, ResultType::Web).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn query_trims_text() {
        let query = SearchQuery::new("  rust  ", SortMode::Relevance, ResultType::Web).unwrap();
        assert_eq!(query.text(), "rust");
    }

    #[test]
    fn query_defaults() {
        let query = SearchQuery::new("rust", SortMode::Relevance, ResultType::Web).unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.start_index(), None);
        assert_eq!(query.sort(), SortMode::Relevance);
        assert_eq!(query.result_type(), ResultType::Web);
    }

    #[test]
    fn query_sanitises_zero_page() {
        let query = SearchQuery::new("rust", SortMode::Relevance, ResultType::Web)
            .unwrap()
            .with_page(0);
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn query_ignores_zero_start_index() {
        let query = SearchQuery::new("rust", SortMode::Relevance, ResultType::Web)
            .unwrap()
            .with_start_index(0);
        assert_eq!(query.start_index(), None);
    }

    #[test]
    fn query_keeps_valid_start_index() {
        let query = SearchQuery::new("rust", SortMode::Relevance, ResultType::Web)
            .unwrap()
            .with_page(3)
            .with_start_index(21);
        assert_eq!(query.page(), 3);
        assert_eq!(query.start_index(), Some(21));
    }

    #[test]
    fn provider_names() {
        assert_eq!(SearchProvider::Google.name(), "google");
        assert_eq!(SearchProvider::Brave.name(), "brave");
        assert_eq!(SearchProvider::Google.to_string(), "google");
    }

    #[test]
    fn provider_serde_lowercase() {
        let json = serde_json::to_string(&SearchProvider::Google).expect("serialize");
        assert_eq!(json, "\"google\"");
        let decoded: SearchProvider = serde_json::from_str("\"brave\"").expect("deserialize");
        assert_eq!(decoded, SearchProvider::Brave);
    }

    #[test]
    fn sort_and_type_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&SortMode::Date).expect("serialize"),
            "\"date\""
        );
        assert_eq!(
            serde_json::to_string(&ResultType::Image).expect("serialize"),
            "\"image\""
        );
    }

    #[test]
    fn display_link_strips_scheme_and_www() {
        assert_eq!(display_link("https://www.example.com/a/b"), "example.com");
        assert_eq!(display_link("http://example.com/a"), "example.com");
        assert_eq!(display_link("https://sub.example.com"), "sub.example.com");
    }

    #[test]
    fn display_link_without_scheme() {
        assert_eq!(display_link("example.com/page"), "example.com");
    }

    #[test]
    fn client_item_omits_absent_image() {
        let item = ClientItem {
            title: "t".into(),
            link: "https://a.com".into(),
            display_link: "a.com".into(),
            snippet: "s".into(),
            source: "google".into(),
            image: None,
        };
        let json = serde_json::to_string(&item).expect("serialize");
        assert!(!json.contains("image"));
    }

    #[test]
    fn ai_task_info_wire_names() {
        let info = AiTaskInfo {
            has_ai: true,
            task_id: Some("generic-ai-1-2".into()),
            source: GENERIC_AI_SOURCE.into(),
        };
        let json = serde_json::to_string(&info).expect("serialize");
        assert!(json.contains("\"hasAI\":true"));
        assert!(json.contains("\"taskId\""));
    }

    #[test]
    fn api_timings_serialise_null_for_missing() {
        let timings = ApiTimings {
            google: Some(120),
            brave: None,
        };
        let json = serde_json::to_string(&timings).expect("serialize");
        assert_eq!(json, "{\"google\":120,\"brave\":null}");
    }
}
