//! Concurrent AI task registry with consume-once polling.
//!
//! Maps task ids to overview generation state. The request path inserts a
//! pending entry synchronously before launching the background task, the
//! background task performs exactly one terminal transition, and polls
//! remove terminal entries as part of the same read.
//!
//! # State machine
//!
//! ```text
//! create           complete
//!   ──────► pending ────────► completed ─┐
//!              │                         │ poll removes
//!              │ fail                    │ the entry
//!              └──────────► failed ──────┘
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::types::GENERIC_AI_SOURCE;

/// Task generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Registered, generation in flight.
    Pending,
    /// Terminal: generation produced content.
    Completed,
    /// Terminal: generation failed.
    Failed,
}

impl TaskStatus {
    /// Whether this status admits no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One registered overview task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiTask {
    /// Unique task id.
    pub task_id: String,
    /// The query the overview is for.
    pub query: String,
    /// Source identifier ([`GENERIC_AI_SOURCE`]).
    pub source: String,
    /// Current status.
    pub status: TaskStatus,
    /// Generated overview, present only when completed.
    pub result: Option<String>,
    /// Failure description, present only when failed.
    pub error: Option<String>,
    /// Creation time, epoch milliseconds.
    pub created_at_ms: u64,
}

/// What a poll observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Still pending; the entry stays registered.
    Pending(AiTask),
    /// Terminal; the entry has been removed by this poll.
    Finished(AiTask),
    /// No entry for this id — never registered, or already consumed.
    NotFound,
}

/// Concurrent task state store.
///
/// Mutated by the request path (insert) and background tasks (terminal
/// transitions), read by arbitrary later polls. Owned by the service and
/// shared via `Arc`, scoped to the service's lifetime.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, AiTask>>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, AiTask>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new pending task.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicateTask`] if the id is already present.
    /// The id generation scheme makes collisions implausible, but the
    /// registry still guards against them.
    pub fn create(&self, task_id: &str, query: &str) -> Result<()> {
        let mut tasks = self.lock();
        if tasks.contains_key(task_id) {
            return Err(SearchError::DuplicateTask(task_id.to_string()));
        }
        tasks.insert(
            task_id.to_string(),
            AiTask {
                task_id: task_id.to_string(),
                query: query.to_string(),
                source: GENERIC_AI_SOURCE.to_string(),
                status: TaskStatus::Pending,
                result: None,
                error: None,
                created_at_ms: now_ms(),
            },
        );
        Ok(())
    }

    /// Transition a pending task to completed.
    ///
    /// A missing or already-terminal entry is logged and left untouched —
    /// this defends against double completion.
    pub fn complete(&self, task_id: &str, result: String) {
        self.finish(task_id, TaskStatus::Completed, Some(result), None);
    }

    /// Transition a pending task to failed.
    ///
    /// Same anomaly handling as [`TaskRegistry::complete`].
    pub fn fail(&self, task_id: &str, error: String) {
        self.finish(task_id, TaskStatus::Failed, None, Some(error));
    }

    fn finish(
        &self,
        task_id: &str,
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
    ) {
        let mut tasks = self.lock();
        match tasks.get_mut(task_id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.status = status;
                task.result = result;
                task.error = error;
            }
            Some(task) => {
                tracing::warn!(
                    task_id,
                    status = ?task.status,
                    "ignoring terminal transition on a non-pending task"
                );
            }
            None => {
                tracing::warn!(task_id, "ignoring terminal transition on an unknown task");
            }
        }
    }

    /// Observe a task's state.
    ///
    /// A terminal entry is removed as part of this same read (consume-once):
    /// its content is returned exactly once, and a later poll for the same
    /// id observes [`PollOutcome::NotFound`]. A pending entry is returned
    /// without removal.
    pub fn poll(&self, task_id: &str) -> PollOutcome {
        let mut tasks = self.lock();
        let terminal = tasks.get(task_id).map(|task| task.status.is_terminal());
        match terminal {
            None => PollOutcome::NotFound,
            Some(true) => tasks
                .remove(task_id)
                .map(PollOutcome::Finished)
                .unwrap_or(PollOutcome::NotFound),
            Some(false) => tasks
                .get(task_id)
                .cloned()
                .map(PollOutcome::Pending)
                .unwrap_or(PollOutcome::NotFound),
        }
    }
}

/// Generate a unique task id: source, epoch milliseconds, random suffix.
pub fn new_task_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
    format!("{GENERIC_AI_SOURCE}-{}-{suffix}", now_ms())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
