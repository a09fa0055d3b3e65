//! Debounce state for the change monitor.
//!
//! Kept free of any I/O so the tick decisions can be exercised directly;
//! the monitor task owns exactly one [`MonitorState`] and feeds it raw
//! notifications and ticks.

use iniwatch_common::ConfigError;
use notify::event::ModifyKind;
use notify::EventKind;

/// The kinds of raw notification the monitor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FsChange {
    Write,
    Rename,
    Remove,
}

/// Map a `notify` event kind onto the changes we track. Metadata-only
/// changes, access and create events are ignored.
pub(crate) fn classify(kind: &EventKind) -> Option<FsChange> {
    match kind {
        EventKind::Modify(ModifyKind::Name(_)) => Some(FsChange::Rename),
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(FsChange::Write),
        EventKind::Remove(_) => Some(FsChange::Remove),
        _ => None,
    }
}

/// What the monitor should do at the end of a tick.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TickAction {
    /// Nothing happened this interval.
    Idle,
    /// Writes settled; tell the consumer to re-read.
    Settle,
    /// The watch was re-established after a rename/remove. Counts as a
    /// write, reported on the next tick.
    Rearmed,
    /// The path could not be watched again.
    Lost(ConfigError),
}

#[derive(Debug, Default)]
pub(crate) struct MonitorState {
    last_write: Option<FsChange>,
    pending_identity: Option<FsChange>,
}

impl MonitorState {
    pub(crate) fn record(&mut self, change: FsChange) {
        match change {
            FsChange::Write => self.last_write = Some(change),
            FsChange::Rename | FsChange::Remove => self.pending_identity = Some(change),
        }
    }

    /// Decide the outcome of one tick. `rearm` is only invoked when a
    /// rename or remove is pending.
    pub(crate) fn on_tick<F>(&mut self, rearm: F) -> TickAction
    where
        F: FnOnce() -> Result<(), ConfigError>,
    {
        if let Some(pending) = self.pending_identity.take() {
            return match rearm() {
                Ok(()) => {
                    self.last_write = Some(pending);
                    TickAction::Rearmed
                }
                Err(e) => TickAction::Lost(e),
            };
        }

        if self.last_write.take().is_some() {
            TickAction::Settle
        } else {
            TickAction::Idle
        }
    }

    pub(crate) fn is_quiet(&self) -> bool {
        self.last_write.is_none() && self.pending_identity.is_none()
    }
}
