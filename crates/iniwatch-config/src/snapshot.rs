//! Parsed document state at one point in time.
//!
//! A [`Snapshot`] keeps pairs in document order for deterministic
//! enumeration, plus a key index so lookups and diffs stay linear.

use iniwatch_common::{Key, Pair};
use std::collections::HashMap;

/// Flat, ordered list of `(group, name) -> value` pairs.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pairs: Vec<Pair>,
    index: HashMap<Key, usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a pair. An overwritten key keeps its original
    /// position and takes the new value.
    pub fn insert(&mut self, key: Key, value: impl Into<String>) {
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.pairs[pos].value = value,
            None => {
                self.index.insert(key.clone(), self.pairs.len());
                self.pairs.push(Pair::new(key, value));
            }
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Pair> {
        self.index.get(key).map(|&pos| &self.pairs[pos])
    }

    pub fn value(&self, key: &Key) -> Option<&str> {
        self.get(key).map(|pair| pair.value.as_str())
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Every pair in document order.
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }

    /// Pairs belonging to `group`, in document order.
    pub fn group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Pair> + 'a {
        self.pairs.iter().filter(move |pair| pair.key.group == group)
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.pairs.iter().any(|pair| pair.key.group == group)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<Pair> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for pair in iter {
            snapshot.insert(pair.key, pair.value);
        }
        snapshot
    }
}

impl PartialEq for Snapshot {
    /// Snapshots are equal when they hold the same keys with the same
    /// values, regardless of order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .pairs
                .iter()
                .all(|pair| other.value(&pair.key) == Some(pair.value.as_str()))
    }
}

impl Eq for Snapshot {}
