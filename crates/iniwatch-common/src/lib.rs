pub mod errors;
pub mod events;
pub mod types;

pub use errors::ConfigError;
pub use events::ChangeEvent;
pub use types::{Key, Pair};
