//! Watch session: the background task behind every [`WatchHandle`].
//!
//! A session owns the change monitor for its source, re-parses the file on
//! every settle signal, diffs the result against the last good snapshot and
//! publishes the changes. Losing the watch is never fatal: the session
//! backs off and starts over until it is cancelled.

use crate::diff::diff;
use crate::ini_loader::IniSource;
use crate::settings::WatchSettings;
use crate::snapshot::Snapshot;
use crate::watcher::{MonitorHandle, MonitorSignal, StableChangeMonitor};
use iniwatch_common::{ChangeEvent, ConfigError};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::handle::WatchHandle;

/// Where a session is in its lifecycle.
#[derive(Debug)]
enum SessionState {
    Starting,
    Active(ActiveMonitor),
    Reconnecting,
    Stopped,
}

/// A monitor together with the token that stops only it.
#[derive(Debug)]
struct ActiveMonitor {
    handle: MonitorHandle,
    cancel: CancellationToken,
}

impl ActiveMonitor {
    async fn shutdown(self) {
        self.cancel.cancel();
        self.handle.join().await;
    }
}

/// Latest accepted snapshot, shared between a backend and its sessions.
pub(crate) type SharedSnapshot = Arc<watch::Sender<Arc<Snapshot>>>;

/// Watches one INI source and publishes its changes.
#[derive(Debug, Clone)]
pub struct WatchSession {
    source: IniSource,
    settings: WatchSettings,
    latest: Option<SharedSnapshot>,
}

impl WatchSession {
    pub fn new(source: IniSource, settings: WatchSettings) -> Self {
        Self {
            source,
            settings,
            latest: None,
        }
    }

    /// Also store every accepted snapshot in `latest`, ahead of the events
    /// it produces.
    pub(crate) fn sharing(mut self, latest: SharedSnapshot) -> Self {
        self.latest = Some(latest);
        self
    }

    /// Spawn the session task. Must be called from within a tokio runtime.
    ///
    /// The first events are `Added` for every key in the document, followed
    /// by the changes of each settled modification.
    pub fn spawn(self, cancel: CancellationToken) -> WatchHandle {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity.max(1));
        let task = tokio::spawn(self.run(tx, cancel.clone()));
        WatchHandle::new(rx, cancel, task)
    }

    async fn run(self, tx: mpsc::Sender<ChangeEvent>, cancel: CancellationToken) {
        info!("watch session started for {}", self.source.name());

        let mut retained = Snapshot::new();
        let mut state = SessionState::Starting;

        loop {
            state = match state {
                SessionState::Starting => match self.source.path() {
                    Some(path) => self.start(path, &tx, &cancel).await,
                    None => self.serve_static(&mut retained, &tx, &cancel).await,
                },
                SessionState::Active(mut monitor) => {
                    let next = self.drive(&mut monitor, &mut retained, &tx, &cancel).await;
                    monitor.shutdown().await;
                    next
                }
                SessionState::Reconnecting => self.back_off(&cancel).await,
                SessionState::Stopped => break,
            };
            debug!(?state, "watch session transition");
        }

        info!("watch session stopped for {}", self.source.name());
    }

    async fn start(
        &self,
        path: &Path,
        tx: &mpsc::Sender<ChangeEvent>,
        cancel: &CancellationToken,
    ) -> SessionState {
        if cancel.is_cancelled() {
            return SessionState::Stopped;
        }

        let monitor = StableChangeMonitor::new(path, self.settings.tick_interval());
        let monitor_cancel = cancel.child_token();
        match monitor.start(monitor_cancel.clone()) {
            Ok(handle) => SessionState::Active(ActiveMonitor {
                handle,
                cancel: monitor_cancel,
            }),
            Err(err) => {
                warn!("failed to start watching {}: {err}", path.display());
                if publish(tx, ChangeEvent::Error(err), cancel).await {
                    SessionState::Reconnecting
                } else {
                    SessionState::Stopped
                }
            }
        }
    }

    /// Run the active state until the watch is lost or the session ends.
    async fn drive(
        &self,
        monitor: &mut ActiveMonitor,
        retained: &mut Snapshot,
        tx: &mpsc::Sender<ChangeEvent>,
        cancel: &CancellationToken,
    ) -> SessionState {
        // Catch up with whatever changed while we were not watching
        if !self.reload(retained, tx, cancel).await {
            return SessionState::Stopped;
        }

        loop {
            let signal = tokio::select! {
                biased;
                _ = cancel.cancelled() => return SessionState::Stopped,
                signal = monitor.handle.next() => signal,
            };

            match signal {
                Some(MonitorSignal::Settled) => {
                    if !self.reload(retained, tx, cancel).await {
                        return SessionState::Stopped;
                    }
                }
                Some(MonitorSignal::Lost(err)) => {
                    warn!("lost watch on {}: {err}", self.source.name());
                    if !publish(tx, ChangeEvent::Error(err), cancel).await {
                        return SessionState::Stopped;
                    }
                    return SessionState::Reconnecting;
                }
                None if cancel.is_cancelled() => return SessionState::Stopped,
                None => return SessionState::Reconnecting,
            }
        }
    }

    /// Re-read the source and publish what changed. Returns `false` when the
    /// session has to stop.
    async fn reload(
        &self,
        retained: &mut Snapshot,
        tx: &mpsc::Sender<ChangeEvent>,
        cancel: &CancellationToken,
    ) -> bool {
        let snapshot = match self.source.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("reload of {} failed: {err}", self.source.name());
                return publish(tx, ChangeEvent::Error(err), cancel).await;
            }
        };

        let events = diff(retained, &snapshot);
        if let Some(latest) = &self.latest {
            latest.send_replace(Arc::new(snapshot.clone()));
        }
        info!(
            changes = events.len(),
            "reloaded {}",
            self.source.name()
        );

        for event in events {
            if !publish(tx, event, cancel).await {
                return false;
            }
        }
        *retained = snapshot;
        true
    }

    /// In-memory sources cannot change: report their content once, then
    /// wait for cancellation.
    async fn serve_static(
        &self,
        retained: &mut Snapshot,
        tx: &mpsc::Sender<ChangeEvent>,
        cancel: &CancellationToken,
    ) -> SessionState {
        if !self.reload(retained, tx, cancel).await {
            return SessionState::Stopped;
        }

        let err = ConfigError::Unsupported(format!(
            "{} is an in-memory source and cannot be watched",
            self.source.name()
        ));
        if publish(tx, ChangeEvent::Error(err), cancel).await {
            cancel.cancelled().await;
        }
        SessionState::Stopped
    }

    async fn back_off(&self, cancel: &CancellationToken) -> SessionState {
        debug!(
            backoff_ms = self.settings.reconnect_backoff_ms,
            "reconnecting to {}",
            self.source.name()
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => SessionState::Stopped,
            _ = tokio::time::sleep(self.settings.reconnect_backoff()) => SessionState::Starting,
        }
    }
}

/// Publish one event, waiting for channel capacity. Returns `false` once
/// the session is cancelled or the consumer is gone.
async fn publish(
    tx: &mpsc::Sender<ChangeEvent>,
    event: ChangeEvent,
    cancel: &CancellationToken,
) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(event) => sent.is_ok(),
    }
}
