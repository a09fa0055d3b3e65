//! Reading INI documents from disk or memory.

use crate::snapshot::Snapshot;
use iniwatch_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::parser::parse;

/// Where a document comes from.
#[derive(Debug, Clone)]
pub enum IniSource {
    /// A file on disk; the only kind of source that can be watched.
    File(PathBuf),
    /// An in-memory document. `name` is used in log and error messages.
    Buffer { name: String, data: Vec<u8> },
}

impl IniSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        IniSource::File(path.into())
    }

    pub fn buffer(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        IniSource::Buffer {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Human-readable name for logs and errors.
    pub fn name(&self) -> String {
        match self {
            IniSource::File(path) => path.display().to_string(),
            IniSource::Buffer { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            IniSource::File(path) => Some(path),
            IniSource::Buffer { .. } => None,
        }
    }

    /// Read and parse the current content of this source.
    pub fn load(&self) -> Result<Snapshot, ConfigError> {
        match self {
            IniSource::File(path) => load_from_path(path),
            IniSource::Buffer { name, data } => parse(data).map_err(|e| with_origin(e, name)),
        }
    }
}

/// Read the raw bytes of a document.
pub fn read(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))
}

/// Read and parse an INI file.
pub fn load_from_path(path: &Path) -> Result<Snapshot, ConfigError> {
    let raw = read(path)?;
    debug!(bytes = raw.len(), "read {}", path.display());

    let snapshot = parse(&raw).map_err(|e| with_origin(e, &path.display().to_string()))?;

    info!(
        keys = snapshot.len(),
        "loaded ini document from {}",
        path.display()
    );
    Ok(snapshot)
}

fn with_origin(err: ConfigError, origin: &str) -> ConfigError {
    match err {
        ConfigError::ParseError(msg) => ConfigError::ParseError(format!("{origin}: {msg}")),
        other => other,
    }
}
