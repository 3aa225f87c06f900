//! Vec-backed slot storage with generational handles.
//!
//! Every slot carries a generation counter that is bumped when the slot is
//! freed. A [`SlotId`] records the generation it was issued under, so a
//! handle that outlives its value never resolves to whatever later reuses the
//! same slot.
//!
//! ```text
//!   slots: [ (gen 0, Some(A)) | (gen 1, None) | (gen 0, Some(C)) ]
//!   free_list: [1]
//!
//!   SlotId { index: 1, generation: 0 }  -> stale, resolves to nothing
//!   insert(D)                           -> SlotId { index: 1, generation: 1 }
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u32,
}

impl SlotId {
    /// Position of the slot in the backing vector.
    pub fn index(self) -> usize {
        self.index
    }

    /// Generation the handle was issued under.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> SlotId {
        let id = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            SlotId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            SlotId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        };
        self.len += 1;
        id
    }

    /// Frees the slot behind `id`. Stale or unknown handles return `None`.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Drops every value. Generations are bumped rather than reset so handles
    /// issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(index);
        }
        // Hand out low indices first after a clear.
        self.free_list.reverse();
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    SlotId {
                        index,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}
