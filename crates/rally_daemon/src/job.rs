//! Recurring-job host: one execution per job name at a time, cooperative
//! cancellation through a shared shutdown signal.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::JobError;

#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Identity used for the non-overlap guarantee.
    fn name(&self) -> &'static str;

    /// Runs until `shutdown` fires. Cancellation is checked by the job itself.
    async fn execute(&self, shutdown: Shutdown);
}

/// Receiving side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Sending side of the shutdown signal. Dropping it counts as cancellation.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Sleeps for `duration`, waking early on cancellation.
    /// Returns `true` if cancelled.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        let woke_by_signal = tokio::select! {
            () = tokio::time::sleep(duration) => false,
            _ = self.rx.wait_for(|cancelled| *cancelled) => true,
        };
        woke_by_signal || self.is_cancelled()
    }
}

/// Spawns jobs onto the tokio runtime, refusing to start a job whose name is
/// still in flight.
#[derive(Debug, Clone, Default)]
pub struct JobHost {
    in_flight: Arc<Mutex<HashSet<&'static str>>>,
}

/// Clears the in-flight mark however the job task ends, panics included.
struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<&'static str>>>,
    name: &'static str,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(self.name);
        debug!(job = self.name, "job released");
    }
}

impl JobHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.in_flight.lock().contains(name)
    }

    pub fn spawn<J: Job>(&self, job: Arc<J>) -> Result<JobHandle, JobError> {
        let name = job.name();
        if !self.in_flight.lock().insert(name) {
            warn!(job = name, "refusing overlapping execution");
            return Err(JobError::AlreadyRunning(name));
        }
        let guard = InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            name,
        };

        let (trigger, shutdown) = shutdown_channel();
        let task = tokio::spawn(async move {
            let _guard = guard;
            job.execute(shutdown).await;
        });

        Ok(JobHandle {
            name,
            trigger,
            task,
        })
    }
}

pub struct JobHandle {
    name: &'static str,
    trigger: ShutdownTrigger,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Asks the job to stop at its next cancellation check.
    pub fn cancel(&self) {
        self.trigger.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the job to return.
    pub async fn join(self) -> Result<(), JobError> {
        let name = self.name;
        let _trigger = self.trigger;
        self.task
            .await
            .map_err(|err| JobError::Panicked(name, err.to_string()))
    }

    /// `cancel` followed by `join`.
    pub async fn shutdown(self) -> Result<(), JobError> {
        self.cancel();
        self.join().await
    }
}
