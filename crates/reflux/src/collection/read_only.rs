//! Read-only façade over an observable collection.

use reflux_core::Signal;

use super::change::{CollectionChange, CollectionSignals};
use super::observable::ObservableCollection;
use super::traits::CollectionView;

/// A read-only view of an [`ObservableCollection`].
///
/// Useful for exposing a collection publicly while keeping mutation private.
/// The view reads through to the live collection and exposes its signals, so
/// consumers can observe every change but cannot cause one.
pub struct ReadOnlyCollection<'a, T> {
    inner: &'a ObservableCollection<T>,
}

impl<'a, T> ReadOnlyCollection<'a, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a read-only view of a collection.
    pub fn new(collection: &'a ObservableCollection<T>) -> Self {
        Self { inner: collection }
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns a clone of the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.get(index)
    }

    /// Returns the index of the first element equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.index_of(item)
    }

    /// Returns `true` if an element equal to `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.inner.index_of(item).is_some()
    }

    /// Returns a point-in-time copy of the elements.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.snapshot()
    }

    /// Reads the elements in place.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        self.inner.with_items(f)
    }

    /// The structural change signal of the underlying collection.
    pub fn collection_changed(&self) -> &'a Signal<CollectionChange<T>> {
        self.inner.collection_changed()
    }
}

impl<T> CollectionView<T> for ReadOnlyCollection<'_, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.inner.get(index)
    }

    fn snapshot(&self) -> Vec<T> {
        self.inner.snapshot()
    }

    fn signals(&self) -> &CollectionSignals<T> {
        self.inner.signals()
    }

    fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.index_of(item)
    }
}

impl<T> Clone for ReadOnlyCollection<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadOnlyCollection<'_, T> {}
