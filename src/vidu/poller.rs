use crate::{
    config::PollConfig,
    error::{Result, ViduError},
    models::{extract_task_images, is_failed_state, task_state, ImageRef, TaskHandle},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};

/// Anything that can look up the status body of a task.
#[async_trait]
pub trait TaskSource: Send + Sync + 'static {
    /// `None` means no usable answer this time round.
    async fn fetch_task(&self, task: &TaskHandle) -> Option<Value>;
}

enum Tick {
    Done(Vec<ImageRef>),
    Failed(String),
    Pending,
}

fn evaluate(body: &Value) -> Tick {
    let images = extract_task_images(body);
    if !images.is_empty() {
        return Tick::Done(images);
    }
    match task_state(body) {
        Some(state) if is_failed_state(&state) => Tick::Failed(state),
        _ => Tick::Pending,
    }
}

/// Bounded, fixed-interval poll of a single task.
///
/// Every tick waits one interval before looking, so a budget of `N` means at
/// most `N` lookups and a timeout after `N + 1` intervals.
async fn run_poll<S: TaskSource + ?Sized>(
    source: &S,
    config: &PollConfig,
    task: &TaskHandle,
) -> Result<Vec<ImageRef>> {
    let mut remaining = config.max_attempts;

    loop {
        tokio::time::sleep(config.interval).await;

        if remaining == 0 {
            log::warn!(
                "Task {} still pending after {} attempts, giving up",
                task,
                config.max_attempts
            );
            return Err(ViduError::PollTimeout {
                task_id: task.to_string(),
                attempts: config.max_attempts,
            });
        }
        remaining -= 1;

        log::debug!(
            "Polling task {} (attempt {}/{})",
            task,
            config.max_attempts - remaining,
            config.max_attempts
        );

        let Some(body) = source.fetch_task(task).await else {
            continue;
        };

        match evaluate(&body) {
            Tick::Done(images) => {
                log::info!("Task {} finished with {} images", task, images.len());
                return Ok(images);
            }
            Tick::Failed(state) => {
                log::error!("Task {} reported state '{}'", task, state);
                return Err(ViduError::TaskFailed {
                    task_id: task.to_string(),
                    state,
                });
            }
            Tick::Pending => {}
        }
    }
}

/// Runs task polls, keeping at most one background poll alive.
pub struct TaskPoller<S> {
    source: Arc<S>,
    config: PollConfig,
    active: Mutex<Option<AbortHandle>>,
}

impl<S: TaskSource> TaskPoller<S> {
    pub fn new(source: S, config: PollConfig) -> Self {
        Self::with_shared_source(Arc::new(source), config)
    }

    pub fn with_shared_source(source: Arc<S>, config: PollConfig) -> Self {
        Self {
            source,
            config,
            active: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll on the current task until a terminal outcome.
    ///
    /// Not tracked by [`TaskPoller::start`]'s single-poll bookkeeping.
    pub async fn poll(&self, task: &TaskHandle) -> Result<Vec<ImageRef>> {
        run_poll(self.source.as_ref(), &self.config, task).await
    }

    /// Start polling in the background, aborting any poll started earlier.
    pub fn start(&self, task: TaskHandle) -> PollHandle {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.take() {
            previous.abort();
            log::debug!("Replaced an in-flight poll with task {}", task);
        }

        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let spawned_task = task.clone();
        let inner = tokio::spawn(async move { run_poll(source.as_ref(), &config, &spawned_task).await });

        *active = Some(inner.abort_handle());
        PollHandle { task, inner }
    }

    /// Abort the background poll, if one is still running.
    pub fn cancel(&self) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        match active.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }
}

/// A background poll started by [`TaskPoller::start`].
pub struct PollHandle {
    task: TaskHandle,
    inner: JoinHandle<Result<Vec<ImageRef>>>,
}

impl PollHandle {
    pub fn task(&self) -> &TaskHandle {
        &self.task
    }

    pub async fn wait(self) -> Result<Vec<ImageRef>> {
        match self.inner.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ViduError::PollCancelled),
            Err(e) => Err(ViduError::ResponseError(format!(
                "Poll for task {} panicked: {}",
                self.task, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    struct ScriptedSource {
        replies: Mutex<VecDeque<Option<Value>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Option<Value>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TaskSource for ScriptedSource {
        async fn fetch_task(&self, _task: &TaskHandle) -> Option<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().unwrap().pop_front().flatten()
        }
    }

    fn config(attempts: u32) -> PollConfig {
        PollConfig::new()
            .with_max_attempts(attempts)
            .with_interval(Duration::from_secs(3))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_pending_ticks() {
        let source = ScriptedSource::new(vec![
            None,
            Some(json!({"state": "processing"})),
            Some(json!({"state": "success", "images": ["https://cdn/a.png", "ssupload:x"]})),
        ]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(40));

        let images = poller.poll(&TaskHandle::new("abc")).await.unwrap();
        assert_eq!(images, vec![ImageRef::Url("https://cdn/a.png".into())]);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nested_result_images() {
        let source = ScriptedSource::new(vec![Some(json!({"result": {"images": ["https://cdn/b.png"]}}))]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(5));

        let images = poller.poll(&TaskHandle::new("abc")).await.unwrap();
        assert_eq!(images, vec![ImageRef::Url("https://cdn/b.png".into())]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_state_stops_immediately() {
        let source = ScriptedSource::new(vec![Some(json!({"state": "FAILED"}))]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(40));

        let err = poller.poll(&TaskHandle::new("abc")).await.unwrap_err();
        assert!(matches!(err, ViduError::TaskFailed { ref state, .. } if state == "FAILED"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_field_stops() {
        let source = ScriptedSource::new(vec![None, Some(json!({"status": "Error"}))]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(40));

        let err = poller.poll(&TaskHandle::new("abc")).await.unwrap_err();
        assert!(matches!(err, ViduError::TaskFailed { .. }));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_budget() {
        let source = ScriptedSource::new(vec![]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(4));

        let started = Instant::now();
        let err = poller.poll(&TaskHandle::new("abc")).await.unwrap_err();

        assert!(matches!(err, ViduError::PollTimeout { attempts: 4, .. }));
        assert_eq!(source.calls(), 4);
        // four looks plus the tick that notices the budget is gone
        assert!(started.elapsed() >= Duration::from_secs(15));
        assert!(started.elapsed() < Duration::from_secs(18));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_never_fetches() {
        let source = ScriptedSource::new(vec![Some(json!({"images": ["https://cdn/a.png"]}))]);
        let poller = TaskPoller::with_shared_source(source.clone(), config(0));

        let err = poller.poll(&TaskHandle::new("abc")).await.unwrap_err();
        assert!(matches!(err, ViduError::PollTimeout { attempts: 0, .. }));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_poll_cancels_previous() {
        let mut replies = vec![None; 3];
        replies.push(Some(json!({"images": ["https://cdn/second.png"]})));
        let source = ScriptedSource::new(replies);
        let poller = TaskPoller::with_shared_source(source.clone(), config(40));

        let first = poller.start(TaskHandle::new("first"));
        let second = poller.start(TaskHandle::new("second"));

        assert!(matches!(first.wait().await, Err(ViduError::PollCancelled)));
        let images = second.wait().await.unwrap();
        assert_eq!(images, vec![ImageRef::Url("https://cdn/second.png".into())]);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_running_poll() {
        let source = ScriptedSource::new(vec![]);
        let poller = TaskPoller::with_shared_source(source, config(40));

        assert!(!poller.cancel());
        let handle = poller.start(TaskHandle::new("abc"));
        assert!(poller.cancel());
        assert!(matches!(handle.wait().await, Err(ViduError::PollCancelled)));
        assert!(!poller.cancel());
    }
}
