//! Background cache maintenance tasks.
//!
//! Request handlers dispatch cache repopulation and invalidation here and
//! return without awaiting them. Each dispatch still yields a [`TaskHandle`],
//! so tests can wait for a specific task and shutdown can drain the queue.

use crate::telemetry::record_task;
use parking_lot::Mutex;
use quill_core::QuillResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// How a background task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed,
    /// Rejected after close, or aborted by a drain.
    Cancelled,
}

impl TaskOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Completion handle for a dispatched task.
///
/// Dropping the handle does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle {
    label: &'static str,
    outcome: oneshot::Receiver<TaskOutcome>,
}

impl TaskHandle {
    /// Label the task was dispatched under.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Waits for the task to finish.
    pub async fn settled(self) -> TaskOutcome {
        self.outcome.await.unwrap_or(TaskOutcome::Cancelled)
    }
}

struct QueueState {
    in_flight: AtomicUsize,
    idle: Notify,
    running: Mutex<HashMap<u64, AbortHandle>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Releases a task's slot however the task ends, including abort.
struct InFlightGuard {
    state: Arc<QueueState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.state.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}

/// Queue of background cache tasks.
///
/// Cloning is cheap; clones share the same queue.
#[derive(Clone)]
pub struct CacheTaskQueue {
    state: Arc<QueueState>,
}

impl CacheTaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(QueueState {
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
                running: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Spawns a task on the current runtime.
    ///
    /// A failing task is logged and counted; its error goes nowhere else.
    /// After [`close`](Self::close) the task is not run and its handle
    /// resolves to [`TaskOutcome::Cancelled`].
    pub fn dispatch<F>(&self, label: &'static str, task: F) -> TaskHandle
    where
        F: Future<Output = QuillResult<()>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = TaskHandle {
            label,
            outcome: rx,
        };

        if self.is_closed() {
            debug!("Task queue closed, dropping '{}'", label);
            record_task(label, TaskOutcome::Cancelled.as_str());
            let _ = tx.send(TaskOutcome::Cancelled);
            return handle;
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard {
            state: Arc::clone(&self.state),
        };

        let join = tokio::spawn(async move {
            let _guard = guard;
            let outcome = match task.await {
                Ok(()) => TaskOutcome::Succeeded,
                Err(e) => {
                    warn!("Background cache task '{}' failed: {}", label, e);
                    TaskOutcome::Failed
                }
            };
            record_task(label, outcome.as_str());
            let _ = tx.send(outcome);
        });

        let mut running = self.state.running.lock();
        running.retain(|_, handle| !handle.is_finished());
        running.insert(id, join.abort_handle());

        handle
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Waits until no task is in flight.
    pub async fn settle(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Rejects all further dispatches.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    /// Closes the queue, waits up to `timeout` for in-flight tasks, then
    /// aborts whatever is left. Returns the number of aborted tasks.
    pub async fn drain(&self, timeout: Duration) -> usize {
        self.close();

        if tokio::time::timeout(timeout, self.settle()).await.is_ok() {
            info!("Background cache tasks drained");
            return 0;
        }

        let pending: Vec<AbortHandle> = self
            .state
            .running
            .lock()
            .drain()
            .map(|(_, handle)| handle)
            .filter(|handle| !handle.is_finished())
            .collect();
        for handle in &pending {
            handle.abort();
        }
        warn!(
            "Aborted {} background cache task(s) still running after {:?}",
            pending.len(),
            timeout
        );
        pending.len()
    }
}

impl Default for CacheTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheTaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheTaskQueue")
            .field("in_flight", &self.in_flight())
            .field("closed", &self.is_closed())
            .finish()
    }
}
