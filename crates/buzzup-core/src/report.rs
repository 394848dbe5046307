//! Result aggregation.
//!
//! Pure and idempotent: callable at any point with the current task set, so
//! observers can render partial results while tasks are still running and
//! the orchestrator can produce the final report from the same code path.

use crate::models::{BatchResult, TaskState, UploadTask};

/// Derive a [`BatchResult`] from the current task set.
pub fn batch_result(tasks: &[UploadTask]) -> BatchResult {
    let success_count = tasks
        .iter()
        .filter(|t| t.state == TaskState::Succeeded)
        .count();
    let failure_count = tasks
        .iter()
        .filter(|t| t.state == TaskState::Failed)
        .count();
    BatchResult {
        tasks: tasks.to_vec(),
        success_count,
        failure_count,
        shareable_text: shareable_text(tasks),
    }
}

/// One `name: url` line per succeeded task, in submission order. Failed and
/// unfinished tasks are omitted entirely.
pub fn shareable_text(tasks: &[UploadTask]) -> String {
    tasks
        .iter()
        .filter_map(|t| {
            t.result_url
                .as_deref()
                .map(|url| format!("{}: {}", t.file.name, url))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileItem;

    fn finished_task(id: usize, name: &str, outcome: Result<&str, &str>) -> UploadTask {
        let mut task = UploadTask::new(id, FileItem::new(format!("/tmp/{}", name), 10, false));
        task.mark_in_progress();
        match outcome {
            Ok(url) => task.mark_succeeded(url.to_string()),
            Err(msg) => task.mark_failed(msg.to_string()),
        }
        task
    }

    #[test]
    fn test_counts_partition_the_batch() {
        let tasks = vec![
            finished_task(0, "a.txt", Ok("https://buzzheavier.com/a")),
            finished_task(1, "b.txt", Err("network error: timed out")),
            finished_task(2, "c.txt", Ok("https://buzzheavier.com/c")),
        ];
        let result = batch_result(&tasks);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 1);
        assert_eq!(result.success_count + result.failure_count, tasks.len());
        assert!(!result.all_succeeded());
    }

    #[test]
    fn test_shareable_text_lists_successes_in_order() {
        let tasks = vec![
            finished_task(0, "a.txt", Ok("https://buzzheavier.com/a")),
            finished_task(1, "b.txt", Err("upload cancelled")),
            finished_task(2, "c.txt", Ok("https://buzzheavier.com/c")),
        ];
        assert_eq!(
            shareable_text(&tasks),
            "a.txt: https://buzzheavier.com/a\nc.txt: https://buzzheavier.com/c"
        );
    }

    #[test]
    fn test_all_failed_yields_empty_text() {
        let tasks = vec![finished_task(0, "a.txt", Err("upload rejected: HTTP 500 boom"))];
        let result = batch_result(&tasks);
        assert_eq!(result.shareable_text, "");
        assert_eq!(result.failure_count, 1);
    }

    #[test]
    fn test_empty_batch() {
        let result = batch_result(&[]);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 0);
        assert_eq!(result.shareable_text, "");
        assert!(result.all_succeeded());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let tasks = vec![
            finished_task(0, "a.txt", Ok("https://buzzheavier.com/a")),
            finished_task(1, "b.txt", Err("local file error: gone")),
        ];
        assert_eq!(batch_result(&tasks), batch_result(&tasks));
    }

    #[test]
    fn test_partial_batch_counts_only_terminal_tasks() {
        let mut running = UploadTask::new(1, FileItem::new("/tmp/b.txt", 10, false));
        running.mark_in_progress();
        let tasks = vec![
            finished_task(0, "a.txt", Ok("https://buzzheavier.com/a")),
            running,
            UploadTask::new(2, FileItem::new("/tmp/c.txt", 10, false)),
        ];
        let result = batch_result(&tasks);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.failure_count, 0);
        assert_eq!(result.shareable_text, "a.txt: https://buzzheavier.com/a");
    }
}
