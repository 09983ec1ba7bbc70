//! Session run registry: live runs and per-session serialized task queues.

use crate::state::run_state::RunState;
use botbridge_core::Result;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

/// The tail of a session's task chain, awaitable by multiple callers.
pub type PendingTask = Shared<BoxFuture<'static, ()>>;

struct QueueEntry {
    seq: u64,
    task: PendingTask,
}

/// Owns the `session id -> RunState` map and the per-session task queues.
///
/// Tasks enqueued for the same session id execute strictly in submission
/// order, one at a time; tasks for different session ids run
/// concurrently. A task's failure is logged and never blocks subsequent
/// tasks for that session.
#[derive(Default)]
pub struct SessionRunRegistry {
    active: RwLock<HashMap<String, Arc<RunState>>>,
    queue: Mutex<HashMap<String, QueueEntry>>,
    next_seq: AtomicU64,
}

impl SessionRunRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the live run for a session.
    pub fn get(&self, session_id: &str) -> Option<Arc<RunState>> {
        self.active.read().get(session_id).cloned()
    }

    /// Register a run. Replaces any existing run for the same session id.
    pub fn insert(&self, run: Arc<RunState>) {
        self.active.write().insert(run.session_id.clone(), run);
    }

    /// Remove the run for a session.
    pub fn remove(&self, session_id: &str) {
        self.active.write().remove(session_id);
    }

    /// Number of live runs.
    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    /// Enqueue a task behind the session's current chain.
    ///
    /// The first task for a session starts immediately; later tasks wait
    /// for everything enqueued before them. Ordering holds even under
    /// concurrent callers because the chain tail swap happens under one
    /// lock.
    pub fn enqueue<F>(self: &Arc<Self>, session_id: &str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let sid = session_id.to_string();
        let registry = Arc::clone(self);

        let mut queue = self.queue.lock();
        let previous = queue.get(&sid).map(|entry| entry.task.clone());

        let chained: PendingTask = {
            let sid = sid.clone();
            async move {
                if let Some(previous) = previous {
                    previous.await;
                }
                if let Err(err) = task.await {
                    error!(session = %sid, error = %err, "session task failed");
                }
                // Drop the chain entry only if no newer task replaced it.
                let mut queue = registry.queue.lock();
                if queue.get(&sid).map(|entry| entry.seq) == Some(seq) {
                    queue.remove(&sid);
                }
            }
            .boxed()
            .shared()
        };

        queue.insert(sid, QueueEntry {
            seq,
            task: chained.clone(),
        });
        drop(queue);

        tokio::spawn(chained);
    }

    /// The in-flight chain for a session, for callers that must wait for
    /// quiescence. `None` when the session has no pending work.
    pub fn pending_task(&self, session_id: &str) -> Option<PendingTask> {
        self.queue.lock().get(session_id).map(|entry| entry.task.clone())
    }

    /// Wait until every session's chain has drained.
    pub async fn wait_idle(&self) {
        loop {
            let pending: Vec<PendingTask> = {
                let queue = self.queue.lock();
                queue.values().map(|entry| entry.task.clone()).collect()
            };
            if pending.is_empty() {
                return;
            }
            for task in pending {
                task.await;
            }
        }
    }
}
