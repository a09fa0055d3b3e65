//! Consumer side of a watch session.

use iniwatch_common::ChangeEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Receives change events from a running session and controls its lifetime.
///
/// Dropping the handle cancels the session.
#[derive(Debug)]
pub struct WatchHandle {
    events: mpsc::Receiver<ChangeEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    scope: String,
}

impl WatchHandle {
    pub(crate) fn new(
        events: mpsc::Receiver<ChangeEvent>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            events,
            cancel,
            task: Some(task),
            scope: String::new(),
        }
    }

    /// Only deliver key events from `group`. Errors are always delivered,
    /// and an empty group delivers everything.
    pub fn with_scope(mut self, group: impl Into<String>) -> Self {
        self.scope = group.into();
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Next event in scope, or `None` once the session has stopped and every
    /// queued event has been read.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            let event = self.events.recv().await?;
            if event.in_scope(&self.scope) {
                return Some(event);
            }
        }
    }

    /// Ask the session to stop. Events already queued stay readable.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the session and wait until it has released its file watch.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("watch session task failed: {e}");
            }
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
