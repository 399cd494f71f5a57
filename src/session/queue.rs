//! Serialized execution context for session topology changes.
//!
//! A single dedicated thread runs jobs in submission order. Callers await
//! the result without blocking their own context. A job that panics fails
//! on its own; the thread keeps serving the jobs after it.

use crate::error::CameraError;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the session configuration thread.
///
/// Clones share the same thread. The thread exits once every handle has
/// been dropped and the remaining jobs have run.
#[derive(Clone)]
pub struct SessionQueue {
    label: Arc<str>,
    sender: mpsc::Sender<Job>,
}

impl SessionQueue {
    /// Starts the configuration thread.
    pub fn spawn(label: &str) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let label: Arc<str> = Arc::from(label);
        let thread_label = Arc::clone(&label);

        thread::Builder::new()
            .name(label.to_string())
            .spawn(move || {
                tracing::debug!(queue = %thread_label, "Session queue started");
                while let Ok(job) = receiver.recv() {
                    // The panicked job's reply sender is dropped while unwinding.
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        tracing::error!(queue = %thread_label, "Session queue job panicked");
                    }
                }
                tracing::debug!(queue = %thread_label, "Session queue stopped");
            })?;

        Ok(Self { label, sender })
    }

    /// Returns the queue's thread name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs `job` on the configuration thread and awaits its result.
    ///
    /// Fails with [`CameraError::QueueClosed`] if the thread is gone or this
    /// job panicked. Later jobs are unaffected by an earlier panic.
    pub async fn run<F, R>(&self, job: F) -> Result<R, CameraError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        self.sender
            .send(Box::new(move || {
                let _ = reply.send(job());
            }))
            .map_err(|_| CameraError::QueueClosed)?;

        result.await.map_err(|_| CameraError::QueueClosed)
    }
}

impl std::fmt::Debug for SessionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionQueue").field("label", &self.label).finish()
    }
}
