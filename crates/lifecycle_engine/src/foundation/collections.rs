//! Specialized collection types
//!
//! - [`ObjectId`]: stable slot-map key identifying every event-capable object
//! - [`CursorList`]: ordered list that tolerates removal while it is being iterated

use std::cell::RefCell;

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Identity of an event-capable object or external subscriber.
    ///
    /// Minted by the engine's identity table. The null key stands for
    /// "no subscriber" and is rejected wherever a subscriber is required.
    pub struct ObjectId;
}

/// Ordered collection whose iteration survives re-entrant mutation.
///
/// Items are cloned out of the list one at a time, so the callback of
/// [`try_for_each`](Self::try_for_each) is free to push, remove or even start
/// another pass over the same list. Every active pass keeps its own cursor
/// (the index of the next item it will visit); removing an index below a
/// cursor shifts that cursor back by one so the pass neither skips the item
/// that slid into the freed slot nor revisits one it already saw.
///
/// Items pushed during a pass land past every cursor and are visited by it.
pub struct CursorList<T> {
    items: RefCell<Vec<T>>,
    // One entry per active pass, innermost last
    cursors: RefCell<Vec<usize>>,
}

impl<T: Clone> CursorList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RefCell::new(Vec::with_capacity(capacity)),
            cursors: RefCell::new(Vec::new()),
        }
    }

    /// Number of items currently in the list
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the list holds no items
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Whether at least one pass is iterating the list right now
    pub fn is_iterating(&self) -> bool {
        !self.cursors.borrow().is_empty()
    }

    /// Append an item
    pub fn push(&self, item: T) {
        self.items.borrow_mut().push(item);
    }

    /// Index of the first item matching `predicate`
    pub fn position(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.borrow().iter().position(predicate)
    }

    /// Whether any item matches `predicate`
    pub fn any(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.items.borrow().iter().any(predicate)
    }

    /// Clone of the first item matching `predicate`
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        self.items.borrow().iter().find(|item| predicate(item)).cloned()
    }

    /// Clone of the item at `index`
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    /// Remove the item at `index`, correcting every active cursor
    pub fn remove_at(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };

        for cursor in self.cursors.borrow_mut().iter_mut() {
            if index < *cursor {
                *cursor -= 1;
            }
        }

        Some(removed)
    }

    /// Remove the first item matching `predicate`
    pub fn remove_first(&self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.position(predicate)?;
        self.remove_at(index)
    }

    /// Remove every item matching `predicate`, returning how many were removed
    pub fn remove_all(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while let Some(item) = self.get(index) {
            if predicate(&item) {
                self.remove_at(index);
                removed += 1;
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Clone the current contents in order
    pub fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Visit every live item in order, stopping at the first error.
    ///
    /// No borrow of the list is held while `visit` runs.
    pub fn try_for_each<E>(&self, mut visit: impl FnMut(T) -> Result<(), E>) -> Result<(), E> {
        let depth = {
            let mut cursors = self.cursors.borrow_mut();
            cursors.push(0);
            cursors.len() - 1
        };
        let _pass = PassGuard { cursors: &self.cursors, depth };

        loop {
            let item = {
                let mut cursors = self.cursors.borrow_mut();
                let next = cursors[depth];
                match self.items.borrow().get(next) {
                    Some(item) => {
                        cursors[depth] = next + 1;
                        item.clone()
                    }
                    None => break,
                }
            };
            visit(item)?;
        }

        Ok(())
    }

    /// Visit every live item in order
    pub fn for_each(&self, mut visit: impl FnMut(T)) {
        let _ = self.try_for_each::<std::convert::Infallible>(|item| {
            visit(item);
            Ok(())
        });
    }
}

impl<T: Clone> Default for CursorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for CursorList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

/// Drops the cursor of a finished (or unwinding) pass
struct PassGuard<'a> {
    cursors: &'a RefCell<Vec<usize>>,
    depth: usize,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.cursors.borrow_mut().truncate(self.depth);
    }
}
