//! Stable change monitor for a single file.
//!
//! Wraps a `notify` subscription and turns its bursts of raw events into
//! one [`MonitorSignal::Settled`] per quiet tick. Renames and removals
//! re-arm the subscription against the same path so a file replaced by an
//! editor or a symlink swap keeps being observed.

use iniwatch_common::ConfigError;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::{classify, MonitorState, TickAction};

/// Output of a running monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorSignal {
    /// The file changed and has been quiet for a tick; re-read it.
    Settled,
    /// The file vanished and could not be watched again. Always the last
    /// signal a monitor sends.
    Lost(ConfigError),
}

/// Watches one file path with a fixed debounce tick.
#[derive(Debug, Clone)]
pub struct StableChangeMonitor {
    path: PathBuf,
    tick: Duration,
}

impl StableChangeMonitor {
    pub fn new(path: impl Into<PathBuf>, tick: Duration) -> Self {
        Self {
            path: path.into(),
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Subscribe to the path and spawn the debounce task.
    ///
    /// Must be called from within a tokio runtime. Fails when the watcher
    /// cannot be created or the path cannot be watched (e.g. it does not
    /// exist yet). The subscription is registered before this returns, so
    /// no change made afterwards is missed.
    pub fn start(&self, cancel: CancellationToken) -> Result<MonitorHandle, ConfigError> {
        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                let _ = raw_tx.send(result);
            },
            notify::Config::default(),
        )
        .map_err(|e| ConfigError::WatchError(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ConfigError::WatchError(format!("failed to watch {}: {e}", self.path.display()))
            })?;

        info!(
            tick_ms = self.tick.as_millis() as u64,
            "watching {}",
            self.path.display()
        );

        let (signal_tx, signal_rx) = mpsc::channel(1);
        let task = tokio::spawn(run(
            watcher,
            raw_rx,
            signal_tx,
            self.path.clone(),
            self.tick,
            cancel,
        ));

        Ok(MonitorHandle {
            signals: signal_rx,
            task,
        })
    }
}

/// A running monitor: its signal stream and its task.
#[derive(Debug)]
pub struct MonitorHandle {
    signals: mpsc::Receiver<MonitorSignal>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Next signal, or `None` once the monitor has stopped.
    pub async fn next(&mut self) -> Option<MonitorSignal> {
        self.signals.recv().await
    }

    /// Wait for the monitor task to finish. The OS subscription is released
    /// by the time this returns. Cancel the token first, otherwise this only
    /// returns after the watch is lost.
    pub async fn join(self) {
        drop(self.signals);
        if let Err(e) = self.task.await {
            warn!("change monitor task failed: {e}");
        }
    }
}

async fn run(
    mut watcher: RecommendedWatcher,
    mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    signal_tx: mpsc::Sender<MonitorSignal>,
    path: PathBuf,
    tick: Duration,
    cancel: CancellationToken,
) {
    let mut state = MonitorState::default();
    let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Tick ahead of raw events: a steady stream must still settle
            biased;
            _ = cancel.cancelled() => {
                debug!("change monitor cancelled");
                break;
            }
            _ = ticker.tick() => {
                match state.on_tick(|| rearm(&mut watcher, &path)) {
                    TickAction::Idle => {}
                    TickAction::Rearmed => {
                        debug!("re-armed watch on {}", path.display());
                    }
                    TickAction::Settle => {
                        debug!("changes settled on {}", path.display());
                        if !publish(&signal_tx, MonitorSignal::Settled, &cancel).await {
                            break;
                        }
                    }
                    TickAction::Lost(err) => {
                        warn!("{err}");
                        publish(&signal_tx, MonitorSignal::Lost(err), &cancel).await;
                        break;
                    }
                }
            }
            raw = raw_rx.recv() => match raw {
                Some(Ok(event)) => {
                    if let Some(change) = classify(&event.kind) {
                        debug!(kind = ?event.kind, ?change, "file event");
                        state.record(change);
                    }
                }
                Some(Err(e)) => error!("file watcher error: {e}"),
                None => break,
            }
        }
    }

    drop(watcher);
    debug!(quiet = state.is_quiet(), "released watch on {}", path.display());
}

/// Drop the old subscription and watch the path again; its target may be a
/// different inode now.
fn rearm(watcher: &mut RecommendedWatcher, path: &Path) -> Result<(), ConfigError> {
    let _ = watcher.unwatch(path);
    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .map_err(|e| ConfigError::WatchLost(format!("{}: {e}", path.display())))
}

/// Send a signal unless cancelled first. Returns `false` when the monitor
/// should stop.
async fn publish(
    tx: &mpsc::Sender<MonitorSignal>,
    signal: MonitorSignal,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(signal) => sent.is_ok(),
    }
}
