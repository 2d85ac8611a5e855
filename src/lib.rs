//! # metasearch
//!
//! Multi-provider web search aggregation: concurrent provider fan-out,
//! Reciprocal Rank Fusion with URL-canonical dedup, a TTL response cache,
//! and asynchronous AI overviews behind a polling task registry.
//!
//! ## Design
//!
//! - Queries Google CSE and Brave Search concurrently, each under an
//!   independent hard deadline; a failing provider degrades to empty
//!   results without affecting its siblings
//! - Merges heterogeneous ranked lists with RRF (`1/(60+rank)`), dedup
//!   identity given by a canonicalised link
//! - Decides per query — statistical intent classification guarded by
//!   structural heuristics — whether to launch a detached AI overview,
//!   retrieved later by polling with consume-once semantics
//! - In-memory TTL cache short-circuits repeated identical queries
//!
//! ## Security
//!
//! - API keys are held in configuration, picked at random per call, and
//!   never appear in errors or logs
//! - No network listeners — this is a library, not a server
//! - Search queries are logged only at trace/debug level
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> metasearch::Result<()> {
//! use metasearch::{ResultType, SearchConfig, SearchQuery, SearchService, SortMode};
//!
//! let config = SearchConfig {
//!     google_api_keys: Some("key-1,key-2".into()),
//!     google_engine_id: Some("cx".into()),
//!     brave_api_keys: Some("brave-key".into()),
//!     ..Default::default()
//! };
//! let service = SearchService::new(config)?;
//!
//! let query = SearchQuery::new("什么是量子计算", SortMode::Relevance, ResultType::Web)?;
//! let response = service.search(&query).await;
//! if let Some(data) = response.data {
//!     for item in &data.items {
//!         println!("{}: {}", item.title, item.link);
//!     }
//!     if let Some(task_id) = data.ai_task.task_id {
//!         let poll = service.poll(&task_id);
//!         println!("overview: {:?}", poll.data);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fanout;
pub mod fusion;
pub mod http;
pub mod overview;
pub mod provider;
pub mod providers;
pub mod service;
pub mod suggest;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use overview::{PollOutcome, TaskRegistry, TaskStatus};
pub use provider::ProviderAdapter;
pub use service::{PollData, PollResponse, SearchService};
pub use suggest::suggest;
pub use types::{
    AggregatedResult, ProviderResult, ResultType, SearchData, SearchProvider, SearchQuery,
    SearchResponse, SortMode,
};
