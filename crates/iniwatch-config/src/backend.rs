//! Read-only key/value backend over an INI document.
//!
//! [`Backend`] is the contract a configuration consumer programs against;
//! [`IniBackend`] serves it from a parsed snapshot and streams live changes
//! through [`WatchSession`]s.

use crate::diff::diff;
use crate::ini_loader::IniSource;
use crate::reload::{SharedSnapshot, WatchHandle, WatchSession};
use crate::settings::WatchSettings;
use crate::snapshot::Snapshot;
use iniwatch_common::{ChangeEvent, ConfigError, Key, Pair};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Generic key/value configuration backend.
pub trait Backend {
    /// Look up a single key.
    fn get(&self, key: &Key) -> Result<Pair, ConfigError>;

    /// Every pair under a group, in document order.
    fn list(&self, group: &Key) -> Vec<Pair>;

    /// Store a value. Read-only backends always fail.
    fn set(&self, key: &Key, value: &str) -> Result<(), ConfigError>;

    /// Stream changes for the group `key` belongs to. Must be called from
    /// within a tokio runtime.
    fn watch(&self, key: &Key) -> WatchHandle;

    /// Default group name; empty when the document is read ungrouped.
    fn root_key(&self) -> &str;

    /// Cancel every watch started from this backend. Idempotent.
    fn close(&self);
}

/// The group whose events a watch on `key` delivers: the root key when one
/// is configured, otherwise the key's own group.
pub fn watch_scope(root_key: &str, key: &Key) -> String {
    if root_key.is_empty() {
        key.group.clone()
    } else {
        root_key.to_string()
    }
}

pub struct IniBackend {
    source: IniSource,
    section: String,
    settings: WatchSettings,
    latest: SharedSnapshot,
    cancel: CancellationToken,
}

impl IniBackend {
    /// Load a backend from a file on disk.
    ///
    /// With a non-empty `section`, every key is looked up inside that
    /// section under its joined `group/name`. Otherwise sections act as
    /// groups.
    pub fn from_file(
        path: impl Into<PathBuf>,
        section: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_source(IniSource::file(path), section)
    }

    /// Load a backend from an in-memory document. Such a backend cannot be
    /// watched for changes.
    pub fn from_buffer(
        name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        section: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_source(IniSource::buffer(name, data), section)
    }

    pub fn from_source(source: IniSource, section: impl Into<String>) -> Result<Self, ConfigError> {
        let snapshot = source.load()?;
        let section = section.into();
        info!(
            keys = snapshot.len(),
            section = %section,
            "opened ini backend {}",
            source.name()
        );
        let (latest, _) = watch::channel(Arc::new(snapshot));
        Ok(Self {
            source,
            section,
            settings: WatchSettings::default(),
            latest: Arc::new(latest),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_settings(mut self, settings: WatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn source(&self) -> &IniSource {
        &self.source
    }

    /// The document `get` and `list` currently answer from. Watches started
    /// from this backend replace it after every successful re-parse.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.latest.borrow().clone()
    }

    /// Re-read the source and return what changed since the current
    /// snapshot. On failure the current snapshot is kept.
    pub fn reload(&self) -> Result<Vec<ChangeEvent>, ConfigError> {
        let snapshot = self.source.load()?;
        let events = diff(&self.snapshot(), &snapshot);
        self.latest.send_replace(Arc::new(snapshot));
        debug!(changes = events.len(), "reloaded {}", self.source.name());
        Ok(events)
    }
}

impl Backend for IniBackend {
    fn get(&self, key: &Key) -> Result<Pair, ConfigError> {
        let lookup = if self.section.is_empty() {
            key.clone()
        } else {
            Key::new(
                self.section.as_str(),
                key.join(&self.settings.key_separator),
            )
        };

        let snapshot = self.snapshot();
        if !snapshot.has_group(&lookup.group) {
            return Err(ConfigError::NotFound(format!(
                "section '{}' in {}",
                lookup.group,
                self.source.name()
            )));
        }

        snapshot
            .value(&lookup)
            .map(|value| Pair::new(key.clone(), value))
            .ok_or_else(|| {
                ConfigError::NotFound(format!(
                    "key '{}' in {}",
                    lookup.join(&self.settings.key_separator),
                    self.source.name()
                ))
            })
    }

    fn list(&self, group: &Key) -> Vec<Pair> {
        let snapshot = self.snapshot();
        if !self.section.is_empty() {
            return snapshot.group(&self.section).cloned().collect();
        }
        if group.group.is_empty() {
            return snapshot.pairs().to_vec();
        }
        snapshot.group(&group.group).cloned().collect()
    }

    fn set(&self, key: &Key, _value: &str) -> Result<(), ConfigError> {
        Err(ConfigError::Unsupported(format!(
            "cannot set '{}': ini backend is read-only",
            key.join(&self.settings.key_separator)
        )))
    }

    fn watch(&self, key: &Key) -> WatchHandle {
        let scope = watch_scope(&self.section, key);
        debug!(scope = %scope, "starting watch on {}", self.source.name());
        WatchSession::new(self.source.clone(), self.settings.clone())
            .sharing(self.latest.clone())
            .spawn(self.cancel.child_token())
            .with_scope(scope)
    }

    fn root_key(&self) -> &str {
        &self.section
    }

    fn close(&self) {
        if !self.cancel.is_cancelled() {
            info!("closing ini backend {}", self.source.name());
            self.cancel.cancel();
        }
    }
}
