use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dojo_protocol::Identified;

/// Ordered entity arena with an id-keyed index.
///
/// Rendering order is the arena order; the index only accelerates identity
/// lookups. Cloning captures content and order together, which is what makes
/// an exact rollback possible.
#[derive(Debug, Clone)]
pub struct Collection<T: Identified> {
    items: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Identified> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Identified> Collection<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let mut collection = Self {
            items,
            index: HashMap::new(),
        };
        collection.reindex();
        collection
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, item) in self.items.iter().enumerate() {
            self.index.insert(item.id(), pos);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.index.get(id).and_then(|&pos| self.items.get(pos))
    }

    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Replace in place when the id is known, append otherwise.
    pub fn upsert(&mut self, item: T) {
        match self.index.get(&item.id()).copied() {
            Some(pos) => self.items[pos] = item,
            None => {
                self.index.insert(item.id(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Remove by id, preserving the order of the remainder.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let pos = self.index.remove(id)?;
        let item = self.items.remove(pos);
        // Every position after the removal shifted left.
        self.reindex();
        Some(item)
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.reindex();
    }
}

impl<T: Identified + Clone> Collection<T> {
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

/// Shared handle to one screen's entity list.
///
/// Every mutator of the screen holds a clone, so optimistic applies and
/// rollbacks from different action kinds all converge on the same state.
#[derive(Debug)]
pub struct ListStore<T: Identified> {
    inner: Arc<Mutex<Collection<T>>>,
}

impl<T: Identified> Clone for ListStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Identified> Default for ListStore<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Collection::default())),
        }
    }
}

impl<T: Identified> ListStore<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Collection::new(items))),
        }
    }

    /// A poisoned lock still holds coherent data: writers never leave the
    /// collection mid-edit, so recovery is safe and rollback stays possible.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Collection<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.lock().contains(id)
    }

    pub fn replace_all(&self, items: Vec<T>) {
        self.lock().replace_all(items);
    }

    pub(crate) fn restore(&self, snapshot: Collection<T>) {
        *self.lock() = snapshot;
    }
}

impl<T: Identified + Clone> ListStore<T> {
    /// Cloned view of the items, in rendering order.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.lock().to_vec()
    }

    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.lock().get(id).cloned()
    }
}
