//! Deferred removal of temporary files
//!
//! A shared file has to outlive the share sheet reading it, so deletion runs
//! on a detached timer. Each timer can be cancelled, and scheduling the same
//! path again supersedes the earlier timer.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use crate::capability::FileTransfer;

struct PendingCleanup {
    ticket: Uuid,
    cancel: watch::Sender<bool>,
}

pub struct CleanupScheduler {
    transfer: Arc<dyn FileTransfer>,
    delay: Duration,
    pending: Arc<Mutex<HashMap<PathBuf, PendingCleanup>>>,
}

impl CleanupScheduler {
    pub fn new(transfer: Arc<dyn FileTransfer>, delay: Duration) -> Self {
        Self {
            transfer,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Delete `path` once the delay has elapsed. Must be called inside a
    /// tokio runtime.
    pub fn schedule(&self, path: PathBuf) {
        let ticket = Uuid::new_v4();
        let (cancel, mut cancelled) = watch::channel(false);

        if let Some(previous) = self
            .pending
            .lock()
            .insert(path.clone(), PendingCleanup { ticket, cancel })
        {
            let _ = previous.cancel.send(true);
            tracing::debug!(path = %path.display(), "Superseded pending cleanup");
        }

        tracing::debug!(
            path = %path.display(),
            delay_ms = self.delay.as_millis() as u64,
            "Scheduled cleanup"
        );

        let transfer = Arc::clone(&self.transfer);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancelled.changed() => return,
            }

            {
                let mut pending = pending.lock();
                match pending.get(&path) {
                    Some(entry) if entry.ticket == ticket => {
                        pending.remove(&path);
                    }
                    _ => return,
                }
            }

            remove_file(transfer.as_ref(), &path).await;
        });
    }

    /// Paths still waiting for their timer
    pub fn pending(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.pending.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Cancel every timer and delete the files now.
    pub async fn shutdown(&self) {
        let paths: Vec<PathBuf> = self
            .pending
            .lock()
            .drain()
            .map(|(path, entry)| {
                let _ = entry.cancel.send(true);
                path
            })
            .collect();

        for path in paths {
            remove_file(self.transfer.as_ref(), &path).await;
        }
    }
}

async fn remove_file(transfer: &dyn FileTransfer, path: &Path) {
    match transfer.delete(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed temporary file"),
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to remove temporary file"
        ),
    }
}
