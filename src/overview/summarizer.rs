//! Background overview generation via an OpenAI-compatible chat endpoint.
//!
//! One prompt/response call per task — no streaming, no retries. The
//! request path never awaits this; failures become the task's terminal
//! failed state in the registry.

use serde::Deserialize;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};

/// Placeholder returned when the backend answers without usable content.
const EMPTY_CONTENT_FALLBACK: &str = "AI 未生成有效回复";

/// Build the overview prompt for a query.
///
/// The product surface is Chinese-first; the prompt instructs the model to
/// answer in the language of the query itself.
pub fn overview_prompt(query: &str) -> String {
    format!(
        "基于搜索关键词「{query}」，生成结构化 AI 概览：请紧扣关键词核心信息，\
         用简洁语言分点（如要点 1、要点 2）呈现，不展开无关内容，快速聚焦核心，\
         避免发散。语言需与关键词语言一致。"
    )
}

/// Client for the overview chat-completions backend.
#[derive(Debug, Clone)]
pub struct OverviewClient {
    endpoint: String,
    model: String,
}

impl OverviewClient {
    /// Build a client from the configured endpoint and model.
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            endpoint: config.overview_endpoint.clone(),
            model: config.overview_model.clone(),
        }
    }

    /// Generate an overview for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Overview`] for missing inputs,
    /// [`SearchError::Http`] for transport or non-2xx failures, and
    /// [`SearchError::Parse`] for malformed payloads.
    pub async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        if prompt.is_empty() || api_key.is_empty() {
            return Err(SearchError::Overview("missing prompt or API key".into()));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.5,
            "reasoning_effort": "low",
        });

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))?;

        let response = client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("overview request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SearchError::Http(format!(
                "overview API responded with status {status}: {detail}"
            )));
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(format!("overview payload: {e}")))?;

        Ok(extract_content(payload))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Pull the first choice's content, falling back to the placeholder.
fn extract_content(payload: ChatCompletionResponse) -> String {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_CONTENT_FALLBACK.to_string())
}
