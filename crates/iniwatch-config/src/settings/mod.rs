//! Watch settings: tick and backoff timing, channel sizing.

mod loader;
mod schema;
mod validation;


pub use loader::{default_settings_path, from_toml_str, load_default, load_from_path};
pub use schema::{Settings, WatchSettings};
pub use validation::validate;
