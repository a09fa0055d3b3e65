//! Live-reloading INI configuration backend.
//!
//! Parses INI documents into flat snapshots of `(group, name) -> value`
//! pairs, watches the backing file for settled changes and streams the
//! difference between successive snapshots as typed change events.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use iniwatch_config::{Backend, IniBackend};
//! use iniwatch_common::Key;
//!
//! # async fn example() -> Result<(), iniwatch_common::ConfigError> {
//! let backend = IniBackend::from_file("/etc/app/app.ini", "")?;
//! println!("{}", backend.get(&Key::new("database", "host"))?.value);
//!
//! let mut changes = backend.watch(&Key::root(""));
//! while let Some(event) = changes.recv().await {
//!     println!("{event}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod diff;
pub mod ini_loader;
pub mod reload;
pub mod settings;
pub mod snapshot;
pub mod watcher;

// Re-export core types for convenience
pub use backend::{watch_scope, Backend, IniBackend};
pub use diff::diff;
pub use ini_loader::{parse, read, IniSource};
pub use reload::{WatchHandle, WatchSession};
pub use settings::WatchSettings;
pub use snapshot::Snapshot;
pub use watcher::{MonitorSignal, StableChangeMonitor};
