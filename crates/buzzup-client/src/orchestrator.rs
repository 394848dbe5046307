//! Upload orchestrator: runs a batch of upload tasks to completion under a
//! bounded concurrency limit and publishes a live event feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use buzzup_core::report::batch_result;
use buzzup_core::{
    resolve_target, BatchResult, ClientConfig, FileItem, UploadConfig, UploadError, UploadEvent,
    UploadTask,
};

use crate::transfer::TransferClient;

/// Capacity of the observer broadcast channel. A slow observer may lag and
/// miss progress updates; state changes are few enough to fit.
const EVENT_CHANNEL_CAPACITY: usize = 256;
const WORKER_CHANNEL_CAPACITY: usize = 64;
const PROGRESS_CHANNEL_CAPACITY: usize = 16;

enum WorkerMsg {
    Started(usize),
    Progress(usize, f64),
    Finished(usize, Result<String, UploadError>),
}

/// One orchestrator instance processes exactly one batch of files.
///
/// Admission is FIFO: files enter transfer in submission order as permits
/// free up. Per-task failures never abort the batch; cancellation settles
/// every non-terminal task as failed, and tasks still pending at that point
/// never reach `InProgress`.
pub struct UploadBatch {
    files: Vec<FileItem>,
    config: UploadConfig,
    client_config: ClientConfig,
    events: broadcast::Sender<UploadEvent>,
    cancel: CancellationToken,
    started: AtomicBool,
}

impl UploadBatch {
    pub fn new(files: Vec<FileItem>, config: UploadConfig, client_config: ClientConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            files,
            config,
            client_config,
            events,
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Subscribe to the live event feed. Subscribe before calling
    /// [`UploadBatch::run`] to observe every event; any number of observers
    /// may subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    /// Request cancellation of the whole batch. Tasks already terminal keep
    /// their result; everything else settles as failed with a cancellation
    /// cause. Safe to call from any task or thread, any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every task to a terminal state and return the aggregate result.
    ///
    /// Fails before any network activity when the credential is missing or
    /// a directory was submitted. A second call returns
    /// [`UploadError::AlreadyStarted`].
    pub async fn run(&self) -> Result<BatchResult, UploadError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(UploadError::AlreadyStarted);
        }
        if !self.config.is_authenticated() {
            return Err(UploadError::Configuration("API key is not set".to_string()));
        }
        if let Some(dir) = self.files.iter().find(|f| f.is_directory) {
            return Err(UploadError::Configuration(format!(
                "not a regular file: {}",
                dir.path.display()
            )));
        }

        // Resolve every target up front so a bad configuration cannot fail
        // the batch half-way through.
        let targets = self
            .files
            .iter()
            .map(|f| resolve_target(&self.client_config.upload_url, &self.config, f))
            .collect::<Result<Vec<_>, _>>()?;

        let client = TransferClient::new(&self.client_config)?;

        let mut tasks: Vec<UploadTask> = self
            .files
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, file)| UploadTask::new(id, file))
            .collect();
        for task in &tasks {
            self.publish_state(task);
        }

        tracing::info!(
            task_count = tasks.len(),
            max_concurrent = self.client_config.max_concurrent,
            "Upload batch started"
        );

        let semaphore = Arc::new(Semaphore::new(self.client_config.max_concurrent));
        let (msg_tx, mut msg_rx) = mpsc::channel::<WorkerMsg>(WORKER_CHANNEL_CAPACITY);

        // Admission loop: FIFO under the semaphore. On cancellation the
        // remaining files are settled directly, without ever starting.
        let admit_cancel = self.cancel.clone();
        let admit_tx = msg_tx.clone();
        tokio::spawn(async move {
            for (id, target) in targets.into_iter().enumerate() {
                // Biased so cancellation always wins over a free permit;
                // a task pending at cancellation time must never start.
                let permit = tokio::select! {
                    biased;
                    _ = admit_cancel.cancelled() => {
                        let _ = admit_tx
                            .send(WorkerMsg::Finished(id, Err(UploadError::Cancelled)))
                            .await;
                        continue;
                    }
                    permit = semaphore.clone().acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break, // semaphore is never closed
                    },
                };
                let worker_tx = admit_tx.clone();
                let worker_cancel = admit_cancel.clone();
                let worker_client = client.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let _ = worker_tx.send(WorkerMsg::Started(id)).await;

                    let (progress_tx, mut progress_rx) =
                        mpsc::channel::<f64>(PROGRESS_CHANNEL_CAPACITY);
                    let forward_tx = worker_tx.clone();
                    let forward = tokio::spawn(async move {
                        while let Some(fraction) = progress_rx.recv().await {
                            let _ = forward_tx.send(WorkerMsg::Progress(id, fraction)).await;
                        }
                    });

                    let outcome = worker_client
                        .upload(&target, &worker_cancel, progress_tx)
                        .await;
                    // The progress sender is gone once the transfer returns;
                    // drain the forwarder so no progress trails the result.
                    let _ = forward.await;
                    let _ = worker_tx.send(WorkerMsg::Finished(id, outcome)).await;
                });
            }
        });
        drop(msg_tx);

        let mut remaining = tasks.len();
        while remaining > 0 {
            let Some(msg) = msg_rx.recv().await else {
                break;
            };
            match msg {
                WorkerMsg::Started(id) => {
                    tasks[id].mark_in_progress();
                    self.publish_state(&tasks[id]);
                }
                WorkerMsg::Progress(id, fraction) => {
                    let before = tasks[id].progress;
                    tasks[id].record_progress(fraction);
                    if tasks[id].progress > before {
                        let _ = self.events.send(UploadEvent::TaskProgress {
                            task_id: id,
                            fraction: tasks[id].progress,
                        });
                    }
                }
                WorkerMsg::Finished(id, outcome) => {
                    match outcome {
                        Ok(url) => {
                            tracing::info!(task_id = id, url = %url, "Upload succeeded");
                            tasks[id].mark_succeeded(url);
                        }
                        Err(err) => {
                            tracing::warn!(task_id = id, error = %err, "Upload failed");
                            tasks[id].mark_failed(err.to_string());
                        }
                    }
                    self.publish_state(&tasks[id]);
                    remaining -= 1;
                }
            }
        }

        debug_assert!(tasks.iter().all(UploadTask::is_terminal));
        let result = batch_result(&tasks);
        tracing::info!(
            succeeded = result.success_count,
            failed = result.failure_count,
            "Upload batch complete"
        );
        let _ = self.events.send(UploadEvent::BatchComplete(result.clone()));
        Ok(result)
    }

    fn publish_state(&self, task: &UploadTask) {
        let _ = self.events.send(UploadEvent::TaskStateChanged {
            task_id: task.id,
            state: task.state,
            result_url: task.result_url.clone(),
            error_message: task.error_message.clone(),
        });
    }
}
