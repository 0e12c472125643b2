//! In-memory mirror of one server-owned collection.
//!
//! Entries are kept in insertion order behind [`Arc`] so that a snapshot is a
//! shallow copy of pointers. Values are never mutated in place; an upsert
//! swaps in a new `Arc`, so a snapshot can never observe later edits.

use std::sync::Arc;

use crate::domain::Keyed;

/// Keyed, ordered mirror of a remote collection.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    entries: Vec<Arc<T>>,
}

/// Immutable copy of a store's contents, used as a rollback target.
#[derive(Debug, Clone)]
pub struct StoreSnapshot<T> {
    entries: Vec<Arc<T>>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: Keyed> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from an authoritative listing, keeping its order.
    pub fn from_listing(items: impl IntoIterator<Item = T>) -> Self {
        let mut store = Self::new();
        store.replace_all(items);
        store
    }

    pub fn list(&self) -> Vec<&T> {
        self.entries.iter().map(Arc::as_ref).collect()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.position(key).map(|idx| self.entries[idx].as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `value` under its key, or replaces the entry already stored
    /// under that key in place. Renames are a remove of the old key plus an
    /// upsert of the new one; the store does not know about them.
    pub fn upsert(&mut self, value: T) {
        let value = Arc::new(value);
        match self.position(value.key()) {
            Some(idx) => self.entries[idx] = value,
            None => self.entries.push(value),
        }
    }

    /// Removes the entry under `key`. Absent keys are ignored.
    pub fn remove(&mut self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        let idx = self.position(key)?;
        let removed = self.entries.remove(idx);
        Some(Arc::unwrap_or_clone(removed))
    }

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        StoreSnapshot {
            entries: self.entries.clone(),
        }
    }

    /// Replaces the whole contents with `snapshot`. Nothing is merged.
    pub fn restore(&mut self, snapshot: StoreSnapshot<T>) {
        self.entries = snapshot.entries;
    }

    /// Replaces the whole contents with a fresh authoritative listing.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = T>) {
        self.entries.clear();
        for item in items {
            self.upsert(item);
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key() == key)
    }
}

impl<T: Keyed + PartialEq> PartialEq for EntityStore<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T> StoreSnapshot<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(Arc::as_ref)
    }
}

impl<T: PartialEq> PartialEq for StoreSnapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
