//! AI overview pipeline: trigger decision, task registry, summarization.
//!
//! The trigger decides from query text alone whether an overview is worth
//! generating; the registry tracks the detached background task; the
//! summarizer performs the actual language-model call.

pub mod classifier;
pub mod registry;
pub mod summarizer;
pub mod tokenize;
pub mod trigger;

pub use classifier::{Intent, IntentClassifier};
pub use registry::{new_task_id, AiTask, PollOutcome, TaskRegistry, TaskStatus};
pub use summarizer::{overview_prompt, OverviewClient};
pub use tokenize::{detect_language, Language, QueryTokenizer};
pub use trigger::{OverviewTrigger, QueryStructure, TriggerDecision};
