//! Core traits for ordered observable collections.
//!
//! Reading and writing are split into two capabilities:
//!
//! - [`CollectionView`] is what consumers get: length, element access,
//!   snapshots and the change signals.
//! - [`OrderedCollectionMut`] adds structural mutation. Derived collections
//!   implement it only to reject every call with
//!   [`CollectionError::NotSupported`](crate::CollectionError::NotSupported).
//!
//! All methods take `&self`; implementations use interior mutability.

use super::change::CollectionSignals;
use crate::error::Result;

/// Read access to an ordered, observable collection.
pub trait CollectionView<T>: Send + Sync
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns the element at `index`, if any.
    fn get(&self, index: usize) -> Option<T>;

    /// Returns a point-in-time copy of every element.
    fn snapshot(&self) -> Vec<T>;

    /// Returns the signals raised when this collection changes.
    fn signals(&self) -> &CollectionSignals<T>;

    /// Returns `true` if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the index of the first element equal to `item`.
    fn index_of(&self, item: &T) -> Option<usize> {
        self.snapshot().iter().position(|x| x == item)
    }

    /// Returns `true` if the collection holds an element equal to `item`.
    fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }
}

/// Structural mutation of an ordered, observable collection.
///
/// Each successful call raises exactly the notification its kind implies:
/// one `Added`, `Removed` or `Moved` change (or a `Reset` for `clear`).
pub trait OrderedCollectionMut<T>: CollectionView<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Inserts `item` at `index`, shifting later elements.
    fn insert(&self, index: usize, item: T) -> Result<()>;

    /// Removes and returns the element at `index`.
    fn remove_at(&self, index: usize) -> Result<T>;

    /// Moves the element at `old_index` to `new_index`.
    fn move_item(&self, old_index: usize, new_index: usize) -> Result<()>;

    /// Removes every element.
    fn clear(&self) -> Result<()>;

    /// Appends `item` to the end.
    fn push(&self, item: T) -> Result<()> {
        self.insert(self.len(), item)
    }

    /// Removes the first element equal to `item`.
    ///
    /// Returns `false` if no such element exists.
    fn remove(&self, item: &T) -> Result<bool> {
        match self.index_of(item) {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }
}
