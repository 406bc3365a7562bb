//! Entity Table
//!
//! Generic keyed container with an explicit ordered id sequence.
//! Entities live in a map keyed by id; a separate `order` vector defines
//! display/iteration order. The two are kept consistent on every mutation:
//! `order` is always a duplicate-free permutation of the map's keys.
//!
//! Also provides the ordered-relocation primitives (`reorder`, `transfer`)
//! used for drag-and-drop style moves within and across sequences.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Core trait for all stored entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + Hash + Debug + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Keyed container plus explicit ordered id sequence
#[derive(Debug, Clone)]
pub struct EntityTable<T: Entity> {
    by_id: HashMap<T::Id, T>,
    order: Vec<T::Id>,
}

impl<T: Entity> Default for EntityTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityTable<T> {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a table from entities, keeping their input order.
    /// A duplicate id replaces the earlier entity and keeps the earlier slot.
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Self {
        let mut table = Self::new();
        for entity in entities {
            table.upsert(entity);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Look up an entity. Missing ids are a normal read outcome, not an error.
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.by_id.get_mut(&id)
    }

    /// The ordered id sequence
    pub fn order(&self) -> &[T::Id] {
        &self.order
    }

    /// Position of `id` in the order, if present
    pub fn position(&self, id: T::Id) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    /// Entities in display order
    pub fn iter_ordered(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Insert or replace by id. New ids are appended to the order;
    /// existing ids keep their position.
    pub fn upsert(&mut self, entity: T) {
        let id = entity.id();
        if self.by_id.insert(id, entity).is_none() {
            self.order.push(id);
        }
        self.assert_consistent();
    }

    /// Insert or replace by id, placing a new id at `index` in the order
    /// (clamped to append). Existing ids keep their position.
    pub fn upsert_at(&mut self, entity: T, index: usize) {
        let id = entity.id();
        if self.by_id.insert(id, entity).is_none() {
            let index = index.min(self.order.len());
            self.order.insert(index, id);
        }
        self.assert_consistent();
    }

    /// Remove by id, splicing it out of the order. Idempotent: removing an
    /// absent id is a no-op.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let removed = self.by_id.remove(&id);
        if removed.is_some() {
            self.order.retain(|other| *other != id);
        }
        self.assert_consistent();
        removed
    }

    /// Reorder `id` to `index` with drag semantics (see [`reorder`]).
    /// Returns false when `id` is not in the table.
    pub fn move_to(&mut self, id: T::Id, index: usize) -> bool {
        let moved = reorder(&mut self.order, id, index);
        self.assert_consistent();
        moved
    }

    /// Replace the entry stored under `old` with `replacement`, which carries
    /// the new id. The order slot is rewritten in place, so the entity keeps
    /// its position. Fails when `old` is absent or the new id is already
    /// taken by another entry.
    pub fn rekey(&mut self, old: T::Id, replacement: T) -> bool {
        if !self.by_id.contains_key(&old) {
            return false;
        }
        let new = replacement.id();
        if new != old && self.by_id.contains_key(&new) {
            return false;
        }
        self.by_id.remove(&old);
        self.by_id.insert(new, replacement);
        if let Some(slot) = self.order.iter_mut().find(|slot| **slot == old) {
            *slot = new;
        }
        self.assert_consistent();
        true
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.order.clear();
    }

    /// Debug/test builds check that `order` is a duplicate-free permutation
    /// of the map's keys after every mutation.
    #[inline]
    fn assert_consistent(&self) {
        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(
                self.order.len(),
                self.by_id.len(),
                "order and byId disagree on length"
            );
            let mut seen = std::collections::HashSet::with_capacity(self.order.len());
            for id in &self.order {
                debug_assert!(seen.insert(*id), "duplicate id {:?} in order", id);
                debug_assert!(
                    self.by_id.contains_key(id),
                    "id {:?} is ordered but not stored",
                    id
                );
            }
        }
    }
}

/// Move `id` within `seq` so it lands at `to` relative to the *other* items:
/// the sequence with the moved id taken out is the frame `to` indexes into,
/// which is what a drag gesture visually means. Past-end clamps to append;
/// moving to the current position is a no-op. Returns false when `id` is not
/// in the sequence.
pub fn reorder<I: Copy + Eq>(seq: &mut Vec<I>, id: I, to: usize) -> bool {
    let from = match seq.iter().position(|other| *other == id) {
        Some(from) => from,
        None => return false,
    };
    seq.remove(from);
    let to = to.min(seq.len());
    seq.insert(to, id);
    true
}

/// Move `id` out of `source` and into `dest` at `to` (clamped to append).
/// Returns false, leaving both sequences untouched, when `id` is not in
/// `source`. A drained source stays alive as an empty sequence.
pub fn transfer<I: Copy + Eq>(source: &mut Vec<I>, dest: &mut Vec<I>, id: I, to: usize) -> bool {
    let from = match source.iter().position(|other| *other == id) {
        Some(from) => from,
        None => return false,
    };
    source.remove(from);
    let to = to.min(dest.len());
    dest.insert(to, id);
    true
}
