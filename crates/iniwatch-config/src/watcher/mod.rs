//! File watching for live reload.
//!
//! Uses the `notify` crate to watch one file, debouncing bursts of writes
//! on a fixed tick and re-arming across renames and removals.

mod stable_monitor;
mod state;

#[cfg(test)]
mod tests;

pub use stable_monitor::{MonitorHandle, MonitorSignal, StableChangeMonitor};
