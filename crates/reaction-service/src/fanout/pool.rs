//! Worker pool for fire-and-forget notification tasks
//!
//! A fixed set of workers drains an unbounded queue, so submitting never waits
//! on a slow consumer. Each task is named; its error or panic is logged with
//! that name and counted, never handed back to the submitter.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

struct Job {
    name: String,
    task: BoxFuture<'static, anyhow::Result<()>>,
}

/// Counters of everything the pool has run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutStats {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub panicked: u64,
}

#[derive(Default)]
struct Shared {
    pending: AtomicUsize,
    idle: Notify,
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
}

impl Shared {
    async fn execute(&self, job: Job) {
        let Job { name, task } = job;

        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(Ok(())) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(task = %name, "Fan-out task completed");
            }
            Ok(Err(e)) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(task = %name, error = %e, "Fan-out task failed");
            }
            Err(panic) => {
                self.panicked.fetch_add(1, Ordering::Relaxed);
                error!(task = %name, panic = %panic_message(panic.as_ref()), "Fan-out task panicked");
            }
        }

        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Bounded set of workers running notification tasks off the caller's path
#[derive(Clone)]
pub struct FanoutPool {
    sender: Arc<Mutex<Option<mpsc::UnboundedSender<Job>>>>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    shared: Arc<Shared>,
}

impl FanoutPool {
    /// Start a pool with `workers` workers (at least one)
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(workers: usize) -> Self {
        let workers = workers.max(1);
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(AsyncMutex::new(rx));
        let shared = Arc::new(Shared::default());

        let handles = (0..workers)
            .map(|id| {
                let rx = Arc::clone(&rx);
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    loop {
                        let job = rx.lock().await.recv().await;
                        let Some(job) = job else { break };
                        shared.execute(job).await;
                    }
                    debug!(worker = id, "Fan-out worker stopped");
                })
            })
            .collect();

        info!(workers = workers, "Fan-out pool started");

        Self {
            sender: Arc::new(Mutex::new(Some(tx))),
            workers: Arc::new(Mutex::new(handles)),
            shared,
        }
    }

    /// Queue a task; returns false if the pool has been shut down
    pub fn submit<F>(&self, name: impl Into<String>, task: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        let guard = self.sender.lock();
        let Some(tx) = guard.as_ref() else {
            warn!(task = %name, "Fan-out pool is shut down, task dropped");
            return false;
        };

        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        let job = Job {
            name,
            task: task.boxed(),
        };

        if let Err(mpsc::error::SendError(job)) = tx.send(job) {
            self.shared.pending.fetch_sub(1, Ordering::AcqRel);
            warn!(task = %job.name, "Fan-out queue closed, task dropped");
            return false;
        }

        self.shared.submitted.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Number of queued or running tasks
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Wait until every submitted task has finished
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting tasks, run what is queued, then join the workers
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());

        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Fan-out worker terminated abnormally");
            }
        }

        info!(stats = ?self.stats(), "Fan-out pool shut down");
    }

    /// Snapshot of the pool counters
    pub fn stats(&self) -> FanoutStats {
        FanoutStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            succeeded: self.shared.succeeded.load(Ordering::Relaxed),
            failed: self.shared.failed.load(Ordering::Relaxed),
            panicked: self.shared.panicked.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for FanoutPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutPool")
            .field("pending", &self.pending())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
