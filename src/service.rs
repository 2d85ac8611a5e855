//! The aggregation service: cache, fan-out, fusion, and overview tasks.
//!
//! One [`SearchService`] owns the response cache, the AI task registry,
//! and the trained trigger classifier for the lifetime of the process.
//! Request handling follows the pipeline: cache lookup → trigger decision
//! → provider fan-out → task registration + detached summarization →
//! fusion → response shaping → cache store.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::{cache_key, ResponseCache};
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::fanout::{fan_out, ProviderOutcome};
use crate::fusion::fuse;
use crate::overview::{
    new_task_id, overview_prompt, AiTask, OverviewClient, OverviewTrigger, PollOutcome,
    TaskRegistry, TaskStatus,
};
use crate::types::{
    display_link, AggregatedResult, AiTaskInfo, ApiTimings, ClientItem, ImageInfo, ProviderResult,
    SearchData, SearchInformation, SearchProvider, SearchQuery, SearchResponse, GENERIC_AI_SOURCE,
};

/// Envelope returned for every poll request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    /// Whether the request was well-formed.
    pub success: bool,
    /// Task state, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PollData>,
    /// Failure description, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Task state as exposed to polling clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollData {
    /// Task status.
    pub status: TaskStatus,
    /// Task id, absent on the unknown-id placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Originating query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Task source identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Generated overview, present when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Failure description, present when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Progress note on the unknown-id placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PollData {
    fn from_task(task: AiTask) -> Self {
        Self {
            status: task.status,
            task_id: Some(task.task_id),
            query: Some(task.query),
            source: Some(task.source),
            result: task.result,
            error: task.error,
            message: None,
        }
    }

    fn pending_placeholder() -> Self {
        Self {
            status: TaskStatus::Pending,
            task_id: None,
            query: None,
            source: None,
            result: None,
            error: None,
            message: Some("AI overview is still being generated.".into()),
        }
    }
}

/// The search aggregation service.
pub struct SearchService {
    config: SearchConfig,
    cache: Option<ResponseCache>,
    registry: Arc<TaskRegistry>,
    trigger: Option<OverviewTrigger>,
    overview: OverviewClient,
}

impl SearchService {
    /// Build a service from the given configuration.
    ///
    /// Trains the trigger classifier once, up front. A classifier failure
    /// is recovered by permanently disabling overview triggering — it
    /// never blocks search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid configuration.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let cache = (config.cache_ttl_seconds > 0)
            .then(|| ResponseCache::new(config.cache_ttl_seconds));
        let trigger = match OverviewTrigger::new() {
            Ok(trigger) => Some(trigger),
            Err(err) => {
                tracing::warn!(error = %err, "trigger classifier unavailable, overviews disabled");
                None
            }
        };
        let overview = OverviewClient::new(&config);
        Ok(Self {
            config,
            cache,
            registry: Arc::new(TaskRegistry::new()),
            trigger,
            overview,
        })
    }

    /// The task registry backing this service's overview tasks.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Run one aggregated search.
    ///
    /// Never fails: validation and configuration errors are shaped into a
    /// `success: false` response with a human-readable error string, and
    /// partial provider failures are visible only as reduced result counts
    /// and null per-provider timings.
    pub async fn search(&self, query: &SearchQuery) -> SearchResponse {
        let started = Instant::now();
        match self.search_inner(query).await {
            Ok((data, timings)) => SearchResponse {
                success: true,
                data: Some(data),
                error: None,
                total_response_time: started.elapsed().as_millis() as u64,
                api_timings: Some(timings),
            },
            Err(err) => {
                tracing::warn!(error = %err, "search request failed");
                SearchResponse {
                    success: false,
                    data: None,
                    error: Some(err.to_string()),
                    total_response_time: started.elapsed().as_millis() as u64,
                    api_timings: None,
                }
            }
        }
    }

    async fn search_inner(&self, query: &SearchQuery) -> Result<(SearchData, ApiTimings)> {
        let key = cache_key(query);
        if let Some(cache) = &self.cache {
            if let Some(data) = cache.get(&key).await {
                tracing::debug!(%key, "cache hit");
                return Ok((data, ApiTimings::default()));
            }
        }

        tracing::debug!(
            query = query.text(),
            result_type = ?query.result_type(),
            "starting aggregation"
        );

        // Trigger decision, before any provider I/O.
        let mut task_id = None;
        if self.config.overview_enabled() {
            if let Some(trigger) = &self.trigger {
                let decision = trigger.decide(query.text());
                tracing::debug!(
                    trigger = decision.trigger,
                    reason = %decision.reason,
                    "overview trigger decision"
                );
                if decision.trigger {
                    task_id = Some(new_task_id());
                }
            }
        } else {
            tracing::warn!("overview API key not configured, skipping trigger decision");
        }

        let providers = self.config.configured_providers();
        if providers.is_empty() && task_id.is_none() {
            return Err(SearchError::Config(
                "no search providers configured and no AI overview triggered".into(),
            ));
        }

        let outcomes = fan_out(query, &providers, &self.config).await;
        for outcome in &outcomes {
            if let Some(error) = &outcome.error {
                tracing::warn!(provider = %outcome.provider, %error, "provider degraded");
            }
        }

        // Register the pending task and detach the summarization before
        // returning, so any poll issued after the response sees it.
        let ai_task = self.launch_overview(query.text(), task_id);

        let timings = timings_from(&outcomes);
        let mut information = search_information(&outcomes);

        let all_results: Vec<ProviderResult> = outcomes
            .into_iter()
            .flat_map(|outcome| outcome.results)
            .collect();
        let fused = fuse(all_results);

        if information.total_results.is_none() {
            information.total_results = Some(fused.len().to_string());
        }
        if information.formatted_total_results.is_none() {
            information.formatted_total_results = Some(format!("{} results", fused.len()));
        }

        let data = SearchData {
            search_information: SearchInformation {
                search_time: information.search_time,
                formatted_search_time: information.formatted_search_time,
                total_results: information.total_results.unwrap_or_default(),
                formatted_total_results: information.formatted_total_results.unwrap_or_default(),
            },
            items: fused.iter().map(shape_item).collect(),
            ai_task,
        };

        if let Some(cache) = &self.cache {
            cache.insert(key, data.clone()).await;
        }

        Ok((data, timings))
    }

    /// Register the pending task and spawn the background summarization.
    ///
    /// The registry insert happens synchronously; only the language-model
    /// call is detached. The request path keeps no handle to the spawned
    /// task beyond the id.
    fn launch_overview(&self, query_text: &str, task_id: Option<String>) -> AiTaskInfo {
        let Some(task_id) = task_id else {
            return AiTaskInfo {
                has_ai: false,
                task_id: None,
                source: GENERIC_AI_SOURCE.into(),
            };
        };

        if let Err(err) = self.registry.create(&task_id, query_text) {
            tracing::warn!(error = %err, "could not register AI task");
            return AiTaskInfo {
                has_ai: false,
                task_id: None,
                source: GENERIC_AI_SOURCE.into(),
            };
        }

        let prompt = overview_prompt(query_text);
        let api_key = self.config.overview_keys().pick().map(str::to_string);
        let client = self.overview.clone();
        let registry = Arc::clone(&self.registry);
        let id = task_id.clone();

        tokio::spawn(async move {
            tracing::debug!(task_id = %id, "AI overview task started");
            let generated = match api_key {
                Some(key) => client.generate(&prompt, &key).await,
                None => Err(SearchError::Overview("overview API key unavailable".into())),
            };
            match generated {
                Ok(content) => {
                    registry.complete(&id, content);
                    tracing::debug!(task_id = %id, "AI overview task completed");
                }
                Err(err) => {
                    tracing::warn!(task_id = %id, error = %err, "AI overview task failed");
                    registry.fail(&id, err.to_string());
                }
            }
        });

        AiTaskInfo {
            has_ai: true,
            task_id: Some(task_id),
            source: GENERIC_AI_SOURCE.into(),
        }
    }

    /// Poll an overview task by id.
    ///
    /// An unknown id — never registered, or already consumed by an earlier
    /// poll — is answered with a pending-shaped placeholder rather than a
    /// distinct not-found, matching the consuming client's expectations.
    /// Use [`TaskRegistry::poll`] directly to distinguish the two.
    pub fn poll(&self, task_id: &str) -> PollResponse {
        if task_id.trim().is_empty() {
            return PollResponse {
                success: false,
                data: None,
                error: Some("taskId is required".into()),
            };
        }

        let data = match self.registry.poll(task_id) {
            PollOutcome::NotFound => PollData::pending_placeholder(),
            PollOutcome::Pending(task) | PollOutcome::Finished(task) => PollData::from_task(task),
        };
        PollResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Partially-shaped search information, before the unique-count fallbacks.
struct PartialInformation {
    search_time: f64,
    formatted_search_time: String,
    total_results: Option<String>,
    formatted_total_results: Option<String>,
}

/// Per-provider timings: elapsed for successes, null otherwise.
fn timings_from(outcomes: &[ProviderOutcome]) -> ApiTimings {
    let mut timings = ApiTimings::default();
    for outcome in outcomes {
        let elapsed =
            (outcome.error.is_none() && outcome.elapsed_ms > 0).then_some(outcome.elapsed_ms);
        match outcome.provider {
            SearchProvider::Google => timings.google = elapsed,
            SearchProvider::Brave => timings.brave = elapsed,
        }
    }
    timings
}

/// Mean of the successful providers' elapsed times plus raw totals.
fn search_information(outcomes: &[ProviderOutcome]) -> PartialInformation {
    let valid: Vec<u64> = outcomes
        .iter()
        .filter(|o| o.error.is_none() && o.elapsed_ms > 0)
        .map(|o| o.elapsed_ms)
        .collect();
    let search_time = if valid.is_empty() {
        0.0
    } else {
        valid.iter().sum::<u64>() as f64 / valid.len() as f64
    };

    PartialInformation {
        search_time,
        formatted_search_time: format!("{:.2} seconds", search_time / 1000.0),
        total_results: outcomes.iter().find_map(|o| o.total_results.clone()),
        formatted_total_results: outcomes
            .iter()
            .find_map(|o| o.formatted_total_results.clone()),
    }
}

/// Shape one fused result for clients.
fn shape_item(result: &AggregatedResult) -> ClientItem {
    let image = match (&result.context_link, &result.thumbnail_link) {
        (Some(context_link), Some(thumbnail_link)) => Some(ImageInfo {
            context_link: context_link.clone(),
            thumbnail_link: thumbnail_link.clone(),
        }),
        _ => None,
    };
    ClientItem {
        title: result.title.clone(),
        link: result.link.clone(),
        display_link: display_link(&result.link),
        snippet: result.snippet.clone(),
        source: result.source.name().to_string(),
        image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultType, SortMode};

    fn query(text: &str) -> SearchQuery {
        SearchQuery::new(text, SortMode::Relevance, ResultType::Web).expect("valid query")
    }

    fn outcome(
        provider: SearchProvider,
        elapsed_ms: u64,
        error: Option<&str>,
    ) -> ProviderOutcome {
        ProviderOutcome {
            provider,
            results: vec![],
            elapsed_ms,
            error: error.map(str::to_string),
            total_results: None,
            formatted_total_results: None,
        }
    }

    #[tokio::test]
    async fn unconfigured_service_reports_config_error() {
        let service = SearchService::new(SearchConfig::default()).expect("valid config");
        let response = service.search(&query("rust")).await;
        assert!(!response.success);
        assert!(response.data.is_none());
        assert!(response.api_timings.is_none());
        let error = response.error.expect("error string");
        assert!(error.contains("no search providers configured"));
    }

    #[tokio::test]
    async fn poll_with_empty_id_fails() {
        let service = SearchService::new(SearchConfig::default()).expect("valid config");
        let response = service.poll("  ");
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("taskId is required"));
    }

    #[tokio::test]
    async fn poll_unknown_id_masks_as_pending() {
        let service = SearchService::new(SearchConfig::default()).expect("valid config");
        let response = service.poll("generic-ai-0-0");
        assert!(response.success);
        let data = response.data.expect("placeholder data");
        assert_eq!(data.status, TaskStatus::Pending);
        assert!(data.task_id.is_none());
        assert!(data.message.expect("message").contains("still being generated"));
    }

    #[tokio::test]
    async fn poll_surfaces_registry_state_and_consumes_terminal() {
        let service = SearchService::new(SearchConfig::default()).expect("valid config");
        service.registry().create("t-1", "rust").expect("fresh id");

        let pending = service.poll("t-1");
        assert_eq!(pending.data.expect("data").status, TaskStatus::Pending);

        service.registry().complete("t-1", "overview".into());
        let finished = service.poll("t-1");
        let data = finished.data.expect("data");
        assert_eq!(data.status, TaskStatus::Completed);
        assert_eq!(data.result.as_deref(), Some("overview"));
        assert_eq!(data.task_id.as_deref(), Some("t-1"));

        // Consumed: polls fall back to the pending placeholder.
        let replay = service.poll("t-1");
        let data = replay.data.expect("data");
        assert_eq!(data.status, TaskStatus::Pending);
        assert!(data.task_id.is_none());
    }

    #[test]
    fn timings_null_for_failed_providers() {
        let timings = timings_from(&[
            outcome(SearchProvider::Google, 120, None),
            outcome(SearchProvider::Brave, 4500, Some("timed out")),
        ]);
        assert_eq!(timings.google, Some(120));
        assert_eq!(timings.brave, None);
    }

    #[test]
    fn timings_null_for_unconfigured_providers() {
        let timings = timings_from(&[outcome(SearchProvider::Brave, 80, None)]);
        assert_eq!(timings.google, None);
        assert_eq!(timings.brave, Some(80));
    }

    #[test]
    fn search_time_averages_successful_providers_only() {
        let info = search_information(&[
            outcome(SearchProvider::Google, 100, None),
            outcome(SearchProvider::Brave, 300, None),
        ]);
        assert!((info.search_time - 200.0).abs() < f64::EPSILON);
        assert_eq!(info.formatted_search_time, "0.20 seconds");

        let degraded = search_information(&[
            outcome(SearchProvider::Google, 100, None),
            outcome(SearchProvider::Brave, 5000, Some("timed out")),
        ]);
        assert!((degraded.search_time - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn search_time_zero_when_all_failed() {
        let info = search_information(&[outcome(SearchProvider::Google, 10, Some("boom"))]);
        assert!((info.search_time - 0.0).abs() < f64::EPSILON);
        assert_eq!(info.formatted_search_time, "0.00 seconds");
    }

    #[test]
    fn shaped_item_includes_image_only_when_complete() {
        let mut aggregated = AggregatedResult {
            canonical_key: "https://a.com/x".into(),
            link: "https://www.a.com/x?y=1".into(),
            title: "Title".into(),
            snippet: "Snippet".into(),
            source: SearchProvider::Google,
            rrf_score: 0.02,
            context_link: Some("https://a.com/page".into()),
            thumbnail_link: None,
        };
        assert!(shape_item(&aggregated).image.is_none());

        aggregated.thumbnail_link = Some("https://a.com/t.jpg".into());
        let item = shape_item(&aggregated);
        let image = item.image.expect("complete image block");
        assert_eq!(image.context_link, "https://a.com/page");
        assert_eq!(item.display_link, "a.com");
        assert_eq!(item.link, "https://www.a.com/x?y=1");
        assert_eq!(item.source, "google");
    }
}
