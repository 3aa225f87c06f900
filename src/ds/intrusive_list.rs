//! Recency-ordered doubly linked list whose nodes live in a [`SlotArena`].
//!
//! Nodes refer to their neighbours by [`SlotId`] rather than by pointer, so
//! the list is plain safe Rust and every node handle stays valid for as long
//! as the node is linked. Handles are generational: after a node is removed
//! (or the list is cleared) its id never resolves again, which makes a second
//! `remove` of the same id a harmless `None`.
//!
//! ```text
//!   head                                        tail
//!    │                                            │
//!    ▼                                            ▼
//!  [MRU] ◄──prev── [ .. ] ◄──prev── [ .. ] ◄── [LRU]
//!        ──next──►        ──next──►       ──►
//! ```
//!
//! Every structural change is expressed through two primitives: `unlink`
//! closes the gap a node leaves behind, `splice` threads a node between two
//! neighbours. A missing neighbour (`None`) stands for the list's own
//! `head`/`tail` pointer, so the edge cases at either end need no special
//! branches.
//!
//! All operations except iteration are O(1).

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Doubly linked list with stable, generational node handles.
///
/// The front is the most recently used end; the back is the least recently
/// used end.
///
/// # Example
///
/// ```
/// use purgekit::ds::IntrusiveList;
///
/// let mut list = IntrusiveList::new();
/// let old = list.push_front("old");
/// list.push_front("new");
///
/// assert!(list.move_to_front(old));
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["old", "new"]);
///
/// assert_eq!(list.remove(old), Some("old"));
/// assert_eq!(list.remove(old), None);
/// ```
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    capacity: usize,
}

impl<T> IntrusiveList<T> {
    /// Creates an empty list with no capacity hint.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list and reserves arena space for `capacity` nodes.
    ///
    /// The capacity is a hint recorded for the owner; pushes past it still
    /// succeed.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Capacity hint given at construction (0 when none was given).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `id` names a node that is still linked.
    pub fn contains(&self, id: SlotId) -> bool {
        self.arena.contains(id)
    }

    pub fn front_id(&self) -> Option<SlotId> {
        self.head
    }

    pub fn back_id(&self) -> Option<SlotId> {
        self.tail
    }

    /// Most recently used value.
    pub fn front(&self) -> Option<&T> {
        self.get(self.head?)
    }

    /// Least recently used value.
    pub fn back(&self) -> Option<&T> {
        self.get(self.tail?)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// Walks `(id, value)` pairs from front to back.
    pub fn iter_entries(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Walks values from front to back.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> {
        self.iter_entries().map(|(_, value)| value)
    }

    /// Walks node ids from front to back.
    pub fn iter_ids(&self) -> impl ExactSizeIterator<Item = SlotId> {
        self.iter_entries().map(|(id, _)| id)
    }

    /// Links `value` in as the new front and returns its handle.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let id = self.allocate(value);
        self.splice(id, None, self.head);
        id
    }

    /// Links `value` in as the new back and returns its handle.
    pub fn push_back(&mut self, value: T) -> SlotId {
        let id = self.allocate(value);
        self.splice(id, self.tail, None);
        id
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.remove(self.head?)
    }

    pub fn pop_back(&mut self) -> Option<T> {
        self.remove(self.tail?)
    }

    /// Unlinks node `id` and returns its value.
    ///
    /// A stale or foreign id yields `None` and leaves the list unchanged.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Relinks `id` as the front. Returns `false` if `id` is not linked.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.head == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.splice(id, None, self.head);
        true
    }

    /// Relinks `id` as the back. Returns `false` if `id` is not linked.
    pub fn move_to_back(&mut self, id: SlotId) -> bool {
        if self.tail == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.splice(id, self.tail, None);
        true
    }

    /// Drops every node. Handles issued before the call become stale.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    fn allocate(&mut self, value: T) -> SlotId {
        self.arena.insert(Node {
            value,
            prev: None,
            next: None,
        })
    }

    // `None` as `at` addresses the list's head pointer.
    fn set_next(&mut self, at: Option<SlotId>, next: Option<SlotId>) {
        match at {
            Some(id) => {
                if let Some(node) = self.arena.get_mut(id) {
                    node.next = next;
                }
            },
            None => self.head = next,
        }
    }

    // `None` as `at` addresses the list's tail pointer.
    fn set_prev(&mut self, at: Option<SlotId>, prev: Option<SlotId>) {
        match at {
            Some(id) => {
                if let Some(node) = self.arena.get_mut(id) {
                    node.prev = prev;
                }
            },
            None => self.tail = prev,
        }
    }

    /// Joins the neighbours of `id` to each other. The node's own links are
    /// left dangling until the next `splice`.
    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let node = self.arena.get(id)?;
        let (prev, next) = (node.prev, node.next);
        self.set_next(prev, next);
        self.set_prev(next, prev);
        Some(())
    }

    /// Threads `id` between `prev` and `next`, which must be adjacent.
    fn splice(&mut self, id: SlotId, prev: Option<SlotId>, next: Option<SlotId>) {
        if let Some(node) = self.arena.get_mut(id) {
            node.prev = prev;
            node.next = next;
        }
        self.set_next(prev, Some(id));
        self.set_prev(next, Some(id));
    }

    /// Panics unless the forward walk, the backward walk and the arena all
    /// agree on the same node sequence.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let mut forward = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            assert!(forward.len() < self.len(), "forward walk overruns len");
            let Some(node) = self.arena.get(id) else {
                panic!("dangling next link to {id:?}");
            };
            assert_eq!(node.prev, forward.last().copied(), "prev link mismatch");
            forward.push(id);
            cursor = node.next;
        }

        let mut backward = Vec::with_capacity(self.len());
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            assert!(backward.len() < self.len(), "backward walk overruns len");
            let Some(node) = self.arena.get(id) else {
                panic!("dangling prev link to {id:?}");
            };
            backward.push(id);
            cursor = node.prev;
        }
        backward.reverse();

        assert_eq!(forward.len(), self.len());
        assert_eq!(forward, backward);
        assert_eq!(self.head, forward.first().copied());
        assert_eq!(self.tail, forward.last().copied());
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back cursor over `(SlotId, &T)` pairs.
pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    cursor: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.arena.get(id)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((id, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
