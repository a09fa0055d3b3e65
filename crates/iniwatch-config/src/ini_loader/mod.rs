//! INI document loading: reading sources and parsing them into snapshots.

mod loader;
mod parser;


pub use loader::{load_from_path, read, IniSource};
pub use parser::parse;
