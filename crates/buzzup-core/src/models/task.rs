use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::FileItem;

/// Lifecycle state of one upload task.
///
/// Transitions are one-directional: `Pending` -> `InProgress` ->
/// `Succeeded` | `Failed`. A cancelled task that never started moves from
/// `Pending` straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::InProgress => write!(f, "in_progress"),
            TaskState::Succeeded => write!(f, "succeeded"),
            TaskState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskState::Pending),
            "in_progress" => Ok(TaskState::InProgress),
            "succeeded" => Ok(TaskState::Succeeded),
            "failed" => Ok(TaskState::Failed),
            _ => Err(format!("Unknown task state: {}", s)),
        }
    }
}

/// The tracked lifecycle of uploading a single file within a batch.
///
/// Exactly one of `result_url` / `error_message` is set once the task is
/// terminal. `progress` never decreases while the task is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTask {
    /// Position of the file in the submitted batch.
    pub id: usize,
    pub file: FileItem,
    pub state: TaskState,
    /// Fraction of the file handed to the transport, 0.0 to 1.0.
    pub progress: f64,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl UploadTask {
    pub fn new(id: usize, file: FileItem) -> Self {
        Self {
            id,
            file,
            state: TaskState::Pending,
            progress: 0.0,
            result_url: None,
            error_message: None,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Move from `Pending` to `InProgress`. Any other starting state is
    /// left untouched.
    pub fn mark_in_progress(&mut self) {
        if self.state == TaskState::Pending {
            self.state = TaskState::InProgress;
            self.started_at = Some(Utc::now());
        }
    }

    /// Record forward progress. Stale or out-of-order updates are dropped so
    /// the reported fraction never decreases.
    pub fn record_progress(&mut self, fraction: f64) {
        if self.state == TaskState::InProgress && fraction > self.progress {
            self.progress = fraction.min(1.0);
        }
    }

    pub fn mark_succeeded(&mut self, url: String) {
        if self.is_terminal() {
            return;
        }
        self.state = TaskState::Succeeded;
        self.progress = 1.0;
        self.result_url = Some(url);
        self.error_message = None;
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, message: String) {
        if self.is_terminal() {
            return;
        }
        self.state = TaskState::Failed;
        self.result_url = None;
        self.error_message = Some(message);
        self.completed_at = Some(Utc::now());
    }
}
