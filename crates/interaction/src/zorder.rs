//! Z-order registry: dense stacking ranks for painting and hit priority.
//!
//! Ranks are 1-based and always contiguous: after any insertion, removal or
//! reorder the live entities hold exactly `1..=len`. Higher ranks paint
//! later and win pointer hits.

use std::hash::Hash;

/// Stacking order of opaque handles, bottom first.
#[derive(Debug, Clone)]
pub struct ZOrderRegistry<K> {
    order: Vec<K>,
}

impl<K: Copy + Eq + Hash + std::fmt::Display> Default for ZOrderRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Display> ZOrderRegistry<K> {
    pub fn new() -> Self {
        Self { order: Vec::new() }
    }

    /// Put `id` on top. Returns its rank (`len` after insertion).
    ///
    /// Appending an id that is already registered moves it to the top.
    pub fn append(&mut self, id: K) -> u32 {
        self.order.retain(|k| *k != id);
        self.order.push(id);
        self.order.len() as u32
    }

    /// Unregister `id` and close the gap. Returns false if it was unknown.
    pub fn remove(&mut self, id: K) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.order.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Swap with the neighbor one rank above. No-op at the top.
    ///
    /// Returns whether the order changed; `None` if `id` is unknown.
    pub fn move_up(&mut self, id: K) -> Option<bool> {
        let pos = self.position(id)?;
        if pos + 1 >= self.order.len() {
            return Some(false);
        }
        self.order.swap(pos, pos + 1);
        tracing::debug!(entity = %id, index = pos + 2, "Moved up");
        Some(true)
    }

    /// Swap with the neighbor one rank below. No-op at the bottom.
    pub fn move_down(&mut self, id: K) -> Option<bool> {
        let pos = self.position(id)?;
        if pos == 0 {
            return Some(false);
        }
        self.order.swap(pos, pos - 1);
        tracing::debug!(entity = %id, index = pos, "Moved down");
        Some(true)
    }

    /// Move `id` to an explicit rank, clamped to `1..=len`. Everything in
    /// between shifts by one. Returns the rank actually assigned.
    pub fn set_index(&mut self, id: K, index: u32) -> Option<u32> {
        let pos = self.position(id)?;
        self.order.remove(pos);
        let target = (index.max(1) as usize - 1).min(self.order.len());
        self.order.insert(target, id);
        Some(target as u32 + 1)
    }

    /// 1-based rank of `id`.
    pub fn index_of(&self, id: K) -> Option<u32> {
        self.position(id).map(|pos| pos as u32 + 1)
    }

    pub fn contains(&self, id: K) -> bool {
        self.order.contains(&id)
    }

    /// Ids bottom to top (ascending rank).
    pub fn ordered(&self) -> &[K] {
        &self.order
    }

    /// `(rank, id)` pairs bottom to top.
    pub fn ranked(&self) -> impl Iterator<Item = (u32, K)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(|(pos, id)| (pos as u32 + 1, *id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn position(&self, id: K) -> Option<usize> {
        self.order.iter().position(|k| *k == id)
    }
}
