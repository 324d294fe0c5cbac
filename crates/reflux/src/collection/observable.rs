//! Generic ordered collection with change notification.
//!
//! `ObservableCollection<T>` is the storage type every other collection in
//! this crate wraps: the batching collection, each group of a projection, and
//! typically the source a projection observes.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};

use super::change::{CollectionChange, CollectionSignals};
use super::traits::{CollectionView, OrderedCollectionMut};
use crate::error::{CollectionError, Result};

/// An ordered collection that announces every structural change.
///
/// Mutations take the write lock only while touching storage; notifications
/// are emitted afterwards, so slots may read the collection freely.
///
/// Each mutation also holds the emission lock until its notifications have
/// been delivered, so notifications arrive in the order the mutations were
/// applied. The lock is reentrant: a slot may mutate the collection it is
/// observing.
///
/// # Example
///
/// ```
/// use reflux::ObservableCollection;
///
/// let list = ObservableCollection::new();
/// list.collection_changed().connect(|change| println!("{:?}", change));
///
/// list.push("first");
/// list.insert(0, "zeroth").unwrap();
/// assert_eq!(list.snapshot(), vec!["zeroth", "first"]);
/// ```
pub struct ObservableCollection<T> {
    items: RwLock<Vec<T>>,
    emission: ReentrantMutex<()>,
    signals: CollectionSignals<T>,
}

impl<T> Default for ObservableCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ObservableCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a collection holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            emission: ReentrantMutex::new(()),
            signals: CollectionSignals::new(),
        }
    }

    /// Returns the signals for this collection.
    pub fn signals(&self) -> &CollectionSignals<T> {
        &self.signals
    }

    /// Shorthand for `signals().collection_changed`.
    pub fn collection_changed(&self) -> &reflux_core::Signal<CollectionChange<T>> {
        &self.signals.collection_changed
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Returns a clone of the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.read().get(index).cloned()
    }

    /// Returns the index of the first element equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.read().iter().position(|x| x == item)
    }

    /// Returns a point-in-time copy of the elements.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    /// Reads the elements in place, under the read lock.
    ///
    /// The closure must not mutate this collection.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        f(&self.items.read())
    }

    /// Serializes emissions with the mutators of this collection.
    ///
    /// Held by wrappers that emit notifications of their own, such as a
    /// batch flush.
    pub(crate) fn lock_emission(&self) -> ReentrantMutexGuard<'_, ()> {
        self.emission.lock()
    }

    /// Appends an item to the end.
    pub fn push(&self, item: T) {
        let _emitting = self.emission.lock();
        let index = {
            let mut items = self.items.write();
            items.push(item.clone());
            items.len() - 1
        };
        self.signals
            .emit_change(CollectionChange::Added { index, item }, true);
    }

    /// Inserts an item at `index`.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        let _emitting = self.emission.lock();
        {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(CollectionError::out_of_range(index, items.len()));
            }
            items.insert(index, item.clone());
        }
        self.signals
            .emit_change(CollectionChange::Added { index, item }, true);
        Ok(())
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        let _emitting = self.emission.lock();
        let item = {
            let mut items = self.items.write();
            if index >= items.len() {
                return Err(CollectionError::out_of_range(index, items.len()));
            }
            items.remove(index)
        };
        self.signals.emit_change(
            CollectionChange::Removed {
                index,
                item: item.clone(),
            },
            true,
        );
        Ok(item)
    }

    /// Removes the first element equal to `item`, returning whether one was found.
    pub fn remove(&self, item: &T) -> bool {
        let _emitting = self.emission.lock();
        let removed = {
            let mut items = self.items.write();
            items
                .iter()
                .position(|x| x == item)
                .map(|index| (index, items.remove(index)))
        };
        match removed {
            Some((index, item)) => {
                self.signals
                    .emit_change(CollectionChange::Removed { index, item }, true);
                true
            }
            None => false,
        }
    }

    /// Replaces the element at `index`, returning the old one.
    pub fn replace_at(&self, index: usize, item: T) -> Result<T> {
        let _emitting = self.emission.lock();
        let old = {
            let mut items = self.items.write();
            let len = items.len();
            let slot = items
                .get_mut(index)
                .ok_or(CollectionError::out_of_range(index, len))?;
            std::mem::replace(slot, item.clone())
        };
        self.signals.emit_change(
            CollectionChange::Replaced {
                index,
                old: old.clone(),
                new: item,
            },
            false,
        );
        Ok(old)
    }

    /// Moves the element at `old_index` to `new_index`.
    ///
    /// Moving an element onto its own index is a no-op and raises nothing.
    pub fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        let _emitting = self.emission.lock();
        let item = {
            let mut items = self.items.write();
            let len = items.len();
            if old_index >= len {
                return Err(CollectionError::out_of_range(old_index, len));
            }
            if new_index >= len {
                return Err(CollectionError::out_of_range(new_index, len));
            }
            if old_index == new_index {
                return Ok(());
            }
            let item = items.remove(old_index);
            items.insert(new_index, item.clone());
            item
        };
        self.signals.emit_change(
            CollectionChange::Moved {
                item,
                old_index,
                new_index,
            },
            false,
        );
        Ok(())
    }

    /// Removes every element and raises a reset.
    pub fn clear(&self) {
        let _emitting = self.emission.lock();
        let had_items = {
            let mut items = self.items.write();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        self.signals.emit_change(CollectionChange::Reset, had_items);
    }

    /// Replaces the whole contents and raises a reset.
    pub fn set_items(&self, new_items: Vec<T>) {
        let _emitting = self.emission.lock();
        let len_changed = {
            let mut items = self.items.write();
            let len_changed = items.len() != new_items.len();
            *items = new_items;
            len_changed
        };
        self.signals.emit_change(CollectionChange::Reset, len_changed);
    }

    /// Appends every item under one lock acquisition.
    ///
    /// One `Added` change is raised per item, after the lock is released.
    pub fn push_range<I>(&self, new_items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let _emitting = self.emission.lock();
        let changes: Vec<_> = {
            let mut items = self.items.write();
            new_items
                .into_iter()
                .map(|item| {
                    items.push(item.clone());
                    CollectionChange::Added {
                        index: items.len() - 1,
                        item,
                    }
                })
                .collect()
        };
        self.emit_all(changes);
    }

    /// Inserts every item starting at `index`, under one lock acquisition.
    pub fn insert_range<I>(&self, index: usize, new_items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let _emitting = self.emission.lock();
        let changes: Vec<_> = {
            let mut items = self.items.write();
            if index > items.len() {
                return Err(CollectionError::out_of_range(index, items.len()));
            }
            new_items
                .into_iter()
                .enumerate()
                .map(|(offset, item)| {
                    items.insert(index + offset, item.clone());
                    CollectionChange::Added {
                        index: index + offset,
                        item,
                    }
                })
                .collect()
        };
        self.emit_all(changes);
        Ok(())
    }

    /// Removes `count` elements starting at `index`, under one lock acquisition.
    ///
    /// Each removal is reported at `index`, as if removed one at a time.
    pub fn remove_range(&self, index: usize, count: usize) -> Result<Vec<T>> {
        let _emitting = self.emission.lock();
        let removed: Vec<T> = {
            let mut items = self.items.write();
            let end = index
                .checked_add(count)
                .filter(|&end| end <= items.len())
                .ok_or(CollectionError::out_of_range(
                    index.saturating_add(count),
                    items.len(),
                ))?;
            items.drain(index..end).collect()
        };
        self.emit_all(
            removed
                .iter()
                .cloned()
                .map(|item| CollectionChange::Removed { index, item })
                .collect(),
        );
        Ok(removed)
    }

    /// Removes the first occurrence of each of `targets`, under one lock
    /// acquisition. Returns how many were found.
    pub fn remove_items<'i, I>(&self, targets: I) -> usize
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        let _emitting = self.emission.lock();
        let changes: Vec<_> = {
            let mut items = self.items.write();
            targets
                .into_iter()
                .filter_map(|target| {
                    let index = items.iter().position(|x| x == target)?;
                    Some(CollectionChange::Removed {
                        index,
                        item: items.remove(index),
                    })
                })
                .collect()
        };
        let count = changes.len();
        self.emit_all(changes);
        count
    }

    fn emit_all(&self, changes: Vec<CollectionChange<T>>) {
        for change in changes {
            let len_changed = change.changes_len();
            self.signals.emit_change(change, len_changed);
        }
    }
}

impl<T> CollectionView<T> for ObservableCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        ObservableCollection::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        ObservableCollection::get(self, index)
    }

    fn snapshot(&self) -> Vec<T> {
        ObservableCollection::snapshot(self)
    }

    fn signals(&self) -> &CollectionSignals<T> {
        &self.signals
    }

    fn index_of(&self, item: &T) -> Option<usize> {
        ObservableCollection::index_of(self, item)
    }
}

impl<T> OrderedCollectionMut<T> for ObservableCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn insert(&self, index: usize, item: T) -> Result<()> {
        ObservableCollection::insert(self, index, item)
    }

    fn remove_at(&self, index: usize) -> Result<T> {
        ObservableCollection::remove_at(self, index)
    }

    fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        ObservableCollection::move_item(self, old_index, new_index)
    }

    fn clear(&self) -> Result<()> {
        ObservableCollection::clear(self);
        Ok(())
    }

    fn push(&self, item: T) -> Result<()> {
        ObservableCollection::push(self, item);
        Ok(())
    }
}

impl<T> FromIterator<T> for ObservableCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> std::fmt::Debug for ObservableCollection<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.read().iter()).finish()
    }
}

static_assertions::assert_impl_all!(ObservableCollection<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<CollectionChange<&'static str>>>>;

    fn record(list: &ObservableCollection<&'static str>) -> Log {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let recv = changes.clone();
        list.collection_changed()
            .connect(move |change| recv.lock().push(change.clone()));
        changes
    }

    #[test]
    fn test_push_and_insert() {
        let list = ObservableCollection::new();
        let changes = record(&list);

        list.push("b");
        list.insert(0, "a").unwrap();

        assert_eq!(list.snapshot(), vec!["a", "b"]);
        assert_eq!(
            *changes.lock(),
            vec![
                CollectionChange::Added { index: 0, item: "b" },
                CollectionChange::Added { index: 0, item: "a" },
            ]
        );
    }

    #[test]
    fn test_insert_out_of_range() {
        let list = ObservableCollection::from_vec(vec!["a"]);
        let changes = record(&list);

        assert_eq!(
            list.insert(3, "x"),
            Err(CollectionError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(changes.lock().is_empty());
    }

    #[test]
    fn test_remove_and_replace() {
        let list = ObservableCollection::from_vec(vec!["a", "b", "c"]);
        let changes = record(&list);

        assert_eq!(list.remove_at(1), Ok("b"));
        assert!(list.remove(&"c"));
        assert!(!list.remove(&"zzz"));
        assert_eq!(list.replace_at(0, "z"), Ok("a"));

        assert_eq!(list.snapshot(), vec!["z"]);
        assert_eq!(
            *changes.lock(),
            vec![
                CollectionChange::Removed { index: 1, item: "b" },
                CollectionChange::Removed { index: 1, item: "c" },
                CollectionChange::Replaced {
                    index: 0,
                    old: "a",
                    new: "z"
                },
            ]
        );
    }

    #[test]
    fn test_move_item() {
        let list = ObservableCollection::from_vec(vec!["a", "b", "c"]);
        let changes = record(&list);

        list.move_item(2, 0).unwrap();
        list.move_item(1, 1).unwrap();

        assert_eq!(list.snapshot(), vec!["c", "a", "b"]);
        assert_eq!(
            *changes.lock(),
            vec![CollectionChange::Moved {
                item: "c",
                old_index: 2,
                new_index: 0
            }]
        );
        assert!(list.move_item(0, 3).is_err());
    }

    #[test]
    fn test_len_property_only_when_count_changes() {
        let list = ObservableCollection::from_vec(vec![1, 2]);
        let names = Arc::new(Mutex::new(Vec::new()));
        let recv = names.clone();
        list.signals()
            .property_changed
            .connect(move |change| recv.lock().push(change.name().to_string()));

        list.move_item(0, 1).unwrap();
        list.push(3);

        assert_eq!(*names.lock(), vec!["items", "len", "items"]);
    }

    #[test]
    fn test_ranges_emit_per_item() {
        let list = ObservableCollection::from_vec(vec!["a", "d"]);
        let changes = record(&list);

        list.insert_range(1, ["b", "c"]).unwrap();
        list.push_range(["e"]);
        assert_eq!(list.snapshot(), vec!["a", "b", "c", "d", "e"]);

        let removed = list.remove_range(1, 2).unwrap();
        assert_eq!(removed, vec!["b", "c"]);
        assert_eq!(list.snapshot(), vec!["a", "d", "e"]);

        assert_eq!(
            *changes.lock(),
            vec![
                CollectionChange::Added { index: 1, item: "b" },
                CollectionChange::Added { index: 2, item: "c" },
                CollectionChange::Added { index: 4, item: "e" },
                CollectionChange::Removed { index: 1, item: "b" },
                CollectionChange::Removed { index: 1, item: "c" },
            ]
        );
        assert!(list.remove_range(2, 5).is_err());
    }

    #[test]
    fn test_clear_raises_reset() {
        let list = ObservableCollection::from_vec(vec!["a", "b"]);
        let changes = record(&list);

        list.clear();

        assert!(list.is_empty());
        assert_eq!(*changes.lock(), vec![CollectionChange::Reset]);
    }

    #[test]
    fn test_slot_can_read_during_notification() {
        let list = Arc::new(ObservableCollection::<i32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&list);
        let recv = seen.clone();
        list.collection_changed().connect(move |_| {
            if let Some(list) = weak.upgrade() {
                recv.lock().push(list.len());
            }
        });

        list.push(1);
        list.push(2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }
}
