//! Groups of a grouping projection.

use std::fmt;
use std::hash::{Hash, Hasher};

use parking_lot::Mutex;
use reflux_core::{ConnectionId, Signal};

use crate::collection::{CollectionChange, ObservableCollection, ReadOnlyCollection};
use crate::shared::Shared;

/// One bucket of a [`GroupingProjection`](super::GroupingProjection): the
/// ordered, filtered items that share a group key.
///
/// Groups compare and hash by key alone, so a group computed during
/// re-projection matches the live group with the same key.
pub struct Group<K, T> {
    key: K,
    items: ObservableCollection<Shared<T>>,
    /// Forwards this group's item changes to the projection.
    pub(super) forwarder: Mutex<Option<ConnectionId>>,
}

impl<K, T> Group<K, T>
where
    T: Send + Sync + 'static,
{
    pub(super) fn new(key: K, items: Vec<Shared<T>>) -> Self {
        Self {
            key,
            items: ObservableCollection::from_vec(items),
            forwarder: Mutex::new(None),
        }
    }

    /// The key every item in this group shares.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// A read-only view of the group's items, in order.
    pub fn items(&self) -> ReadOnlyCollection<'_, Shared<T>> {
        ReadOnlyCollection::new(&self.items)
    }

    /// Number of items in the group.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the group holds no items.
    ///
    /// Live groups of a projection are never empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A point-in-time copy of the group's items.
    pub fn snapshot(&self) -> Vec<Shared<T>> {
        self.items.snapshot()
    }

    /// The structural change signal of the group's items.
    pub fn collection_changed(&self) -> &Signal<CollectionChange<Shared<T>>> {
        self.items.collection_changed()
    }

    pub(super) fn items_mut(&self) -> &ObservableCollection<Shared<T>> {
        &self.items
    }

    /// Stops forwarding this group's changes, if it was forwarding.
    pub(super) fn detach(&self) {
        if let Some(id) = self.forwarder.lock().take() {
            self.items.collection_changed().disconnect(id);
        }
    }
}

impl<K: PartialEq, T> PartialEq for Group<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq, T> Eq for Group<K, T> {}

impl<K: Hash, T> Hash for Group<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl<K, T> fmt::Debug for Group<K, T>
where
    K: fmt::Debug,
    T: fmt::Debug + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("key", &self.key)
            .field("items", &self.items)
            .finish()
    }
}

/// A change to the items of one group, tagged with the group's key.
#[derive(Debug)]
pub struct GroupItemsChange<K, T> {
    /// Key of the group whose items changed.
    pub key: K,
    /// The structural change to that group's items.
    pub change: CollectionChange<Shared<T>>,
}

// Manual impls: items are compared by identity, so `T` needs no bounds.
impl<K: Clone, T> Clone for GroupItemsChange<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            change: self.change.clone(),
        }
    }
}

impl<K: PartialEq, T> PartialEq for GroupItemsChange<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.change == other.change
    }
}

impl<K: Eq, T> Eq for GroupItemsChange<K, T> {}
