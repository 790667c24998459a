//! Binding table: key to ordered factories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::factory::Factory;
use crate::key::Key;

/// Factories bound to one key, in insertion order.
struct Entry {
    factories: Vec<Arc<Factory>>,
    most_recent: usize,
}

/// Binding table of one container.
///
/// Binding the same factory twice under a key does not duplicate it; the
/// existing position becomes most recent again.
#[derive(Default)]
pub(crate) struct Bindings {
    entries: HashMap<Key, Entry>,
    // First-bind order of keys, for diagnostics
    order: Vec<Key>,
}

impl Bindings {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: Key, factory: Arc<Factory>) {
        match self.entries.get_mut(&key) {
            Some(entry) => {
                let id = factory.id();
                match entry.factories.iter().position(|existing| existing.id() == id) {
                    Some(index) => entry.most_recent = index,
                    None => {
                        entry.factories.push(factory);
                        entry.most_recent = entry.factories.len() - 1;
                    }
                }
            }
            None => {
                self.order.push(key.clone());
                self.entries.insert(key, Entry { factories: vec![factory], most_recent: 0 });
            }
        }
    }

    pub(crate) fn most_recent(&self, key: &Key) -> Option<Arc<Factory>> {
        self.entries
            .get(key)
            .and_then(|entry| entry.factories.get(entry.most_recent))
            .cloned()
    }

    /// Every factory bound to `key`, in insertion order.
    pub(crate) fn all(&self, key: &Key) -> Vec<Arc<Factory>> {
        self.entries
            .get(key)
            .map(|entry| entry.factories.clone())
            .unwrap_or_default()
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of bound keys.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Keys with their factories, in first-bind order.
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &[Arc<Factory>])> + '_ {
        self.order.iter().filter_map(move |key| {
            self.entries
                .get(key)
                .map(|entry| (key, entry.factories.as_slice()))
        })
    }
}
