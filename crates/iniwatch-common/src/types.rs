use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one configuration entry. An empty `group` is the root section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    pub group: String,
    pub name: String,
}

impl Key {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
        }
    }

    /// A key in the root (ungrouped) section.
    pub fn root(name: impl Into<String>) -> Self {
        Self::new("", name)
    }

    /// Render as `group<sep>name`, or just `name` for root keys.
    pub fn join(&self, sep: &str) -> String {
        if self.group.is_empty() {
            self.name.clone()
        } else {
            format!("{}{sep}{}", self.group, self.name)
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "[{}] {}", self.group, self.name)
        }
    }
}

/// A key and its raw value as read from the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub key: Key,
    pub value: String,
}

impl Pair {
    pub fn new(key: Key, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}
