//! Snapshot diffing.
//!
//! Produces the minimal set of [`ChangeEvent`]s that turns one snapshot
//! into another. Deletions and updates come first (walking the old
//! snapshot), then additions (walking the new one).

use crate::snapshot::Snapshot;
use iniwatch_common::ChangeEvent;

/// Compare `old` against `new` and return the changes in deterministic order.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    for pair in old.iter() {
        match new.get(&pair.key) {
            None => events.push(ChangeEvent::Deleted {
                key: pair.key.clone(),
                last_value: pair.value.clone(),
            }),
            Some(current) if current.value != pair.value => events.push(ChangeEvent::Updated {
                key: pair.key.clone(),
                value: current.value.clone(),
            }),
            Some(_) => {}
        }
    }

    // Keys present in both were handled above
    for pair in new.iter() {
        if !old.contains(&pair.key) {
            events.push(ChangeEvent::Added {
                key: pair.key.clone(),
                value: pair.value.clone(),
            });
        }
    }

    events
}
