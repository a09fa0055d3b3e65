use serde::{Serialize, Serializer};
use std::fmt;

use crate::errors::ConfigError;
use crate::types::Key;

/// One change observed between two snapshots of a document, or a
/// watch-level failure delivered on the same stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ChangeEvent {
    Added {
        key: Key,
        value: String,
    },
    Updated {
        key: Key,
        value: String,
    },
    Deleted {
        key: Key,
        last_value: String,
    },
    Error(#[serde(serialize_with = "serialize_display")] ConfigError),
}

impl ChangeEvent {
    /// The key this event refers to; `None` for errors.
    pub fn key(&self) -> Option<&Key> {
        match self {
            ChangeEvent::Added { key, .. }
            | ChangeEvent::Updated { key, .. }
            | ChangeEvent::Deleted { key, .. } => Some(key),
            ChangeEvent::Error(_) => None,
        }
    }

    /// Current value for added/updated keys, last known value for deleted ones.
    pub fn value(&self) -> Option<&str> {
        match self {
            ChangeEvent::Added { value, .. } | ChangeEvent::Updated { value, .. } => Some(value),
            ChangeEvent::Deleted { last_value, .. } => Some(last_value),
            ChangeEvent::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ChangeEvent::Error(_))
    }

    /// Whether this event falls inside `group`. An empty group matches
    /// everything, and errors are never filtered out.
    pub fn in_scope(&self, group: &str) -> bool {
        if group.is_empty() {
            return true;
        }
        match self.key() {
            Some(key) => key.group == group,
            None => true,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Added { key, value } => write!(f, "added {key} = {value}"),
            ChangeEvent::Updated { key, value } => write!(f, "updated {key} = {value}"),
            ChangeEvent::Deleted { key, last_value } => {
                write!(f, "deleted {key} (was {last_value})")
            }
            ChangeEvent::Error(err) => write!(f, "error: {err}"),
        }
    }
}

fn serialize_display<S: Serializer>(err: &ConfigError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}
