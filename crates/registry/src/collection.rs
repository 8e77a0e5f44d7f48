use std::{collections::BTreeMap, sync::Arc};

/// Entries of one kind keyed by name.
///
/// Values are shared as `Arc<T>` so dispatch code can hold an entry while the
/// registry keeps registering.
#[derive(Debug)]
pub struct Collection<T> {
    entries: BTreeMap<String, Arc<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` under `name`, returning the entry it replaced.
    pub fn insert(&mut self, name: impl Into<String>, entry: T) -> Option<Arc<T>> {
        self.entries.insert(name.into(), Arc::new(entry))
    }

    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}
