use serde::{Deserialize, Serialize};

use super::UploadTask;

/// Aggregate outcome of one orchestration run.
///
/// `success_count + failure_count` equals the number of submitted tasks once
/// the batch is complete. `shareable_text` holds one `name: url` line per
/// succeeded task, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub tasks: Vec<UploadTask>,
    pub success_count: usize,
    pub failure_count: usize,
    pub shareable_text: String,
}

impl BatchResult {
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}
