//! Bounded queue of sessions drained by a fixed pool of workers.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::errors::SubmitError;
use super::pipeline::SessionRunner;
use crate::models::SessionId;

/// A topic waiting for a worker.
#[derive(Debug, Clone)]
pub struct SessionJob {
    pub id: SessionId,
    pub topic: String,
}

/// Accepts topics without blocking and runs them in the background.
///
/// At most `workers` sessions run at once and at most `capacity` wait.
pub struct SessionQueue {
    sender: Mutex<Option<mpsc::Sender<SessionJob>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl SessionQueue {
    /// Spawn the workers. Must be called inside a tokio runtime.
    pub fn start(runner: Arc<dyn SessionRunner>, workers: usize, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel::<SessionJob>(capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let runner = Arc::clone(&runner);
                tokio::spawn(async move {
                    loop {
                        let job = receiver.lock().await.recv().await;
                        let Some(job) = job else {
                            break;
                        };
                        run_job(worker, Arc::clone(&runner), job).await;
                    }
                    tracing::debug!("Session worker {} stopped", worker);
                })
            })
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
            capacity,
        }
    }

    /// Queue a topic under a fresh session id.
    pub fn try_submit(&self, topic: impl Into<String>) -> Result<SessionId, SubmitError> {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(SubmitError::Closed)?;

        let id = SessionId::generate();
        let job = SessionJob {
            id: id.clone(),
            topic: topic.into(),
        };
        match sender.try_send(job) {
            Ok(()) => Ok(id),
            Err(TrySendError::Full(_)) => Err(SubmitError::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Closed(_)) => Err(SubmitError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Stop accepting topics and wait for queued and running sessions.
    pub async fn shutdown(&self) {
        drop(self.sender.lock().take());
        let handles: Vec<_> = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Session worker ended abnormally: {}", e);
            }
        }
    }
}

/// Run one job in its own task so a panic only loses that session.
async fn run_job(worker: usize, runner: Arc<dyn SessionRunner>, job: SessionJob) {
    let id = job.id.clone();
    tracing::info!(session = id.as_str(), "Worker {} starting '{}'", worker, job.topic);

    let task = tokio::spawn(async move { runner.run(job.id, job.topic).await });
    match task.await {
        Ok(report) => tracing::info!(session = id.as_str(), "{}", report.summary()),
        Err(e) => tracing::error!(session = id.as_str(), "Session task failed: {}", e),
    }
}
