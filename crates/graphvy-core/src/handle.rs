use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Stable identity of a vertex. Never reused, never an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexHandle(pub u64);

/// Stable identity of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeHandle(pub u64);

impl fmt::Display for VertexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for EdgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

pub trait Handle: Copy + Eq + Hash + fmt::Debug {
    fn from_raw(raw: u64) -> Self;
}

impl Handle for VertexHandle {
    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl Handle for EdgeHandle {
    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// The element that moved into a vacated slot during swap-with-last removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation<H> {
    pub handle: H,
    pub from: usize,
    pub to: usize,
}

/// Maps stable handles to dense storage indices `0..len`.
///
/// Removal swaps the last slot into the vacated one, so at most one other
/// handle changes index per removal; that move is reported as a [`Relocation`].
#[derive(Debug, Clone)]
pub struct HandleTable<H> {
    next: u64,
    index_of: HashMap<H, usize>,
    slots: Vec<H>,
}

impl<H: Handle> Default for HandleTable<H> {
    fn default() -> Self {
        Self {
            next: 0,
            index_of: HashMap::new(),
            slots: Vec::new(),
        }
    }
}

impl<H: Handle> HandleTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle bound to the next free index.
    pub fn issue(&mut self) -> (H, usize) {
        let handle = H::from_raw(self.next);
        self.next = self.next.wrapping_add(1);
        let index = self.slots.len();
        self.slots.push(handle);
        self.index_of.insert(handle, index);
        (handle, index)
    }

    pub fn resolve(&self, handle: H) -> Option<usize> {
        self.index_of.get(&handle).copied()
    }

    pub fn handle_at(&self, index: usize) -> Option<H> {
        self.slots.get(index).copied()
    }

    pub fn contains(&self, handle: H) -> bool {
        self.index_of.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handles in index order.
    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.slots.iter().copied()
    }

    /// Unbind `handle`. Returns the index it occupied and, unless it was the
    /// last slot, the relocation of the former last element.
    pub fn remove(&mut self, handle: H) -> Option<(usize, Option<Relocation<H>>)> {
        let index = self.index_of.remove(&handle)?;
        let last = self.slots.len().saturating_sub(1);
        self.slots.swap_remove(index);
        if index == last {
            return Some((index, None));
        }
        let moved = *self.slots.get(index)?;
        self.index_of.insert(moved, index);
        Some((
            index,
            Some(Relocation {
                handle: moved,
                from: last,
                to: index,
            }),
        ))
    }

    /// Both directions of the mapping agree.
    pub fn is_consistent(&self) -> bool {
        self.index_of.len() == self.slots.len()
            && self
                .slots
                .iter()
                .enumerate()
                .all(|(i, h)| self.index_of.get(h) == Some(&i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_last_slot_relocates_nothing() {
        let mut table: HandleTable<VertexHandle> = HandleTable::new();
        let (a, _) = table.issue();
        let (b, _) = table.issue();

        let (index, relocated) = table.remove(b).expect("b is live");

        assert_eq!(index, 1);
        assert!(relocated.is_none());
        assert_eq!(table.resolve(a), Some(0));
        assert!(table.is_consistent());
    }

    #[test]
    fn removing_inner_slot_moves_only_the_last_handle() {
        let mut table: HandleTable<VertexHandle> = HandleTable::new();
        let handles: Vec<_> = (0..5).map(|_| table.issue().0).collect();

        let (index, relocated) = table.remove(handles[1]).expect("live");

        assert_eq!(index, 1);
        assert_eq!(
            relocated,
            Some(Relocation {
                handle: handles[4],
                from: 4,
                to: 1
            })
        );
        assert_eq!(table.resolve(handles[0]), Some(0));
        assert_eq!(table.resolve(handles[2]), Some(2));
        assert_eq!(table.resolve(handles[3]), Some(3));
        assert_eq!(table.resolve(handles[4]), Some(1));
        assert_eq!(table.resolve(handles[1]), None);
        assert!(table.is_consistent());
    }

    #[test]
    fn handles_are_never_reused() {
        let mut table: HandleTable<EdgeHandle> = HandleTable::new();
        let (a, _) = table.issue();
        table.remove(a);
        let (b, index) = table.issue();

        assert_ne!(a, b);
        assert_eq!(index, 0);
        assert!(table.remove(a).is_none());
    }
}
