//! Live reload sessions.
//!
//! Combines the change monitor with INI loading and snapshot diffing to
//! stream typed change events whenever the watched file changes on disk.

mod handle;
mod session;


pub use handle::WatchHandle;
pub(crate) use session::SharedSnapshot;
pub use session::WatchSession;
