//! Dense id-keyed storage.
//!
//! Values live contiguously in a `Vec`; a map from id to slot gives O(1)
//! lookup. Removal swaps the last slot into the hole, so iteration order is
//! insertion order only until the first removal. Callers that need a stable
//! order (z-order, stroke age) keep it separately.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Arena<K, V> {
    slots: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or replace the value for `key`. Returns the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.slots[slot].1, value)),
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.slots.swap_remove(slot);
        if let Some((moved, _)) = self.slots.get(slot) {
            self.index.insert(*moved, slot);
        }
        Some(value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.slots[slot].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&slot) => Some(&mut self.slots[slot].1),
            None => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().map(|(_, v)| v)
    }

    /// Keep only the entries for which `keep` returns true. Returns the number removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) -> usize {
        let before = self.slots.len();
        self.slots.retain(|(k, v)| keep(k, v));
        if self.slots.len() != before {
            self.reindex();
        }
        before - self.slots.len()
    }

    /// Remove every entry, yielding the values.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.index.clear();
        self.slots.drain(..)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (slot, (key, _)) in self.slots.iter().enumerate() {
            self.index.insert(*key, slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_lookup_consistent() {
        let mut arena = Arena::new();
        for i in 0..5u32 {
            arena.insert(i, i * 10);
        }
        assert_eq!(arena.remove(&1), Some(10));
        assert_eq!(arena.len(), 4);
        for i in [0u32, 2, 3, 4] {
            assert_eq!(arena.get(&i), Some(&(i * 10)));
        }
        assert!(arena.get(&1).is_none());
        assert!(arena.remove(&1).is_none());
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut arena = Arena::new();
        assert!(arena.insert("a", 1).is_none());
        assert_eq!(arena.insert("a", 2), Some(1));
        assert_eq!(arena.len(), 1);
        *arena.get_mut(&"a").unwrap() += 1;
        assert_eq!(arena.get(&"a"), Some(&3));
    }

    #[test]
    fn test_retain_reindexes() {
        let mut arena = Arena::new();
        for i in 0..6u32 {
            arena.insert(i, i);
        }
        assert_eq!(arena.retain(|_, v| v % 2 == 0), 3);
        assert_eq!(arena.get(&4), Some(&4));
        assert!(!arena.contains(&3));
        assert_eq!(arena.drain().count(), 3);
        assert!(arena.is_empty());
    }
}
