//! Progress presentation: renders the orchestrator event feed as one
//! progress bar per file.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::broadcast;

use buzzup_core::{BatchResult, FileItem, TaskState, UploadEvent};

use crate::truncate_string;

/// Bar resolution; fractions map onto this many ticks.
const PROGRESS_TICKS: u64 = 1000;
const NAME_WIDTH: usize = 24;

pub struct ProgressRenderer {
    bars: Vec<ProgressBar>,
    // Keeps the shared draw target alive for the bars above.
    _multi: MultiProgress,
}

impl ProgressRenderer {
    pub fn new(files: &[FileItem]) -> Self {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template(
            "{prefix:<24} [{bar:30}] {percent:>3}% {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

        let bars = files
            .iter()
            .map(|file| {
                let bar = multi.add(ProgressBar::new(PROGRESS_TICKS));
                bar.set_style(style.clone());
                bar.set_prefix(truncate_string(&file.name, NAME_WIDTH));
                bar.set_message("queued");
                bar
            })
            .collect();
        Self { bars, _multi: multi }
    }

    /// Drain events until the batch completes or the feed closes.
    pub async fn run(self, mut events: broadcast::Receiver<UploadEvent>) -> Option<BatchResult> {
        loop {
            match events.recv().await {
                Ok(UploadEvent::TaskProgress { task_id, fraction }) => {
                    if let Some(bar) = self.bars.get(task_id) {
                        bar.set_position((fraction * PROGRESS_TICKS as f64) as u64);
                    }
                }
                Ok(UploadEvent::TaskStateChanged {
                    task_id,
                    state,
                    result_url,
                    error_message,
                }) => {
                    let Some(bar) = self.bars.get(task_id) else {
                        continue;
                    };
                    match state {
                        TaskState::Pending => bar.set_message("queued"),
                        TaskState::InProgress => bar.set_message("uploading"),
                        TaskState::Succeeded => {
                            bar.set_position(PROGRESS_TICKS);
                            bar.finish_with_message(result_url.unwrap_or_default());
                        }
                        TaskState::Failed => {
                            bar.abandon_with_message(
                                error_message.unwrap_or_else(|| "failed".to_string()),
                            );
                        }
                    }
                }
                Ok(UploadEvent::BatchComplete(result)) => return Some(result),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
