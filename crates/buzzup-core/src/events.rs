//! Typed progress feed published by the orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{BatchResult, TaskState};

/// Events emitted while a batch runs.
///
/// Per-task events arrive in lifecycle order: at most one `InProgress`
/// state change, any number of monotone progress updates, then exactly one
/// terminal state change. `BatchComplete` fires exactly once, after every
/// task is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UploadEvent {
    TaskStateChanged {
        task_id: usize,
        state: TaskState,
        result_url: Option<String>,
        error_message: Option<String>,
    },
    TaskProgress {
        task_id: usize,
        fraction: f64,
    },
    BatchComplete(BatchResult),
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadEvent::TaskStateChanged { task_id, state, .. } => {
                write!(f, "task {} is {}", task_id, state)
            }
            UploadEvent::TaskProgress { task_id, fraction } => {
                write!(f, "task {} at {:.0}%", task_id, fraction * 100.0)
            }
            UploadEvent::BatchComplete(result) => write!(
                f,
                "batch complete: {} succeeded, {} failed",
                result.success_count, result.failure_count
            ),
        }
    }
}
