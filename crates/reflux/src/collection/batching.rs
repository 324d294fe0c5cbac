//! Observable collection with update batching and context dispatch.
//!
//! `BatchingCollection<T>` wraps an [`ObservableCollection`] and sits between
//! its notifications and the outside world:
//!
//! - Between [`begin_update`](BatchingCollection::begin_update) and the
//!   matching [`end_update`](BatchingCollection::end_update), outward
//!   notifications are held back. Property changes are buffered in order; any
//!   structural change only sets a flag.
//! - When the outermost block ends, the buffered property changes are emitted
//!   one by one, followed by a single [`CollectionChange::Reset`] if the
//!   structure changed.
//! - With a [`DispatchContext`], every outward notification is posted to the
//!   context instead of being emitted on the mutating thread.
//!
//! Mutations always apply to storage immediately, so reads and
//! [`snapshot`](BatchingCollection::snapshot) see the latest state even while
//! an update is in progress.
//!
//! # Example
//!
//! ```
//! use reflux::BatchingCollection;
//!
//! let list = BatchingCollection::new();
//! list.collection_changed().connect(|change| println!("{:?}", change));
//!
//! {
//!     let _batch = list.batch();
//!     list.push(1);
//!     list.push(2);
//! } // one Reset is emitted here
//!
//! assert_eq!(list.snapshot(), vec![1, 2]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use reflux_core::logging::targets;
use reflux_core::{DispatchContext, PropertyChange, Signal};

use super::change::{CollectionChange, CollectionSignals};
use super::observable::ObservableCollection;
use super::traits::{CollectionView, OrderedCollectionMut};
use crate::error::{CollectionError, Result};

#[derive(Default)]
struct BatchState {
    depth: usize,
    pending_properties: Vec<PropertyChange>,
    collection_changed: bool,
}

/// The outward-facing half: owns the public signals and the batch state.
///
/// Held behind an `Arc` so posted emissions can outlive the call that
/// produced them.
struct Outlet<T> {
    signals: CollectionSignals<T>,
    state: Mutex<BatchState>,
    context: Option<Arc<dyn DispatchContext>>,
}

impl<T> Outlet<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn on_property_changed(self: &Arc<Self>, change: &PropertyChange) {
        {
            let mut state = self.state.lock();
            if state.depth > 0 {
                state.pending_properties.push(change.clone());
                return;
            }
        }
        self.publish_property(change.clone());
    }

    fn on_collection_changed(self: &Arc<Self>, change: &CollectionChange<T>) {
        {
            let mut state = self.state.lock();
            if state.depth > 0 {
                state.collection_changed = true;
                return;
            }
        }
        self.publish_collection(change.clone());
    }

    fn publish_property(self: &Arc<Self>, change: PropertyChange) {
        match &self.context {
            Some(context) => {
                let outlet = Arc::clone(self);
                context.post(Box::new(move || outlet.signals.property_changed.emit(change)));
            }
            None => self.signals.property_changed.emit(change),
        }
    }

    fn publish_collection(self: &Arc<Self>, change: CollectionChange<T>) {
        match &self.context {
            Some(context) => {
                let outlet = Arc::clone(self);
                context.post(Box::new(move || outlet.signals.collection_changed.emit(change)));
            }
            None => self.signals.collection_changed.emit(change),
        }
    }
}

/// An observable collection whose notifications can be batched and
/// dispatched to a caller-supplied context.
pub struct BatchingCollection<T> {
    inner: ObservableCollection<T>,
    outlet: Arc<Outlet<T>>,
}

impl<T> Default for BatchingCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BatchingCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates an empty collection that emits on the mutating thread.
    pub fn new() -> Self {
        Self::with_context(Vec::new(), None)
    }

    /// Creates a collection holding `items` that emits on the mutating thread.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::with_context(items, None)
    }

    /// Creates a collection holding `items`, posting every outward
    /// notification to `context` when one is given.
    pub fn with_context(items: Vec<T>, context: Option<Arc<dyn DispatchContext>>) -> Self {
        let inner = ObservableCollection::from_vec(items);
        let outlet = Arc::new(Outlet {
            signals: CollectionSignals::new(),
            state: Mutex::new(BatchState::default()),
            context,
        });

        let forward = Arc::clone(&outlet);
        inner
            .signals()
            .property_changed
            .connect(move |change| forward.on_property_changed(change));
        let forward = Arc::clone(&outlet);
        inner
            .signals()
            .collection_changed
            .connect(move |change| forward.on_collection_changed(change));

        Self { inner, outlet }
    }

    /// Returns the outward signals of this collection.
    pub fn signals(&self) -> &CollectionSignals<T> {
        &self.outlet.signals
    }

    /// Shorthand for `signals().collection_changed`.
    pub fn collection_changed(&self) -> &Signal<CollectionChange<T>> {
        &self.outlet.signals.collection_changed
    }

    /// Shorthand for `signals().property_changed`.
    pub fn property_changed(&self) -> &Signal<PropertyChange> {
        &self.outlet.signals.property_changed
    }

    /// Whether outward notifications are posted to a context.
    pub fn has_context(&self) -> bool {
        self.outlet.context.is_some()
    }

    // -------------------------------------------------------------------------
    // Batching
    // -------------------------------------------------------------------------

    /// Opens an update block. Blocks nest.
    pub fn begin_update(&self) {
        let mut state = self.outlet.state.lock();
        state.depth += 1;
        if state.depth == 1 {
            state.pending_properties.clear();
            state.collection_changed = false;
            tracing::trace!(target: targets::BATCH, "update started");
        }
    }

    /// Closes an update block, flushing when the outermost block closes.
    ///
    /// Fails with [`CollectionError::UnmatchedEndUpdate`] if no block is open.
    pub fn end_update(&self) -> Result<()> {
        let _emitting = self.inner.lock_emission();
        let (properties, collection_changed) = {
            let mut state = self.outlet.state.lock();
            if state.depth == 0 {
                tracing::warn!(target: targets::BATCH, "end_update without begin_update");
                return Err(CollectionError::UnmatchedEndUpdate);
            }
            state.depth -= 1;
            if state.depth > 0 {
                return Ok(());
            }
            (
                std::mem::take(&mut state.pending_properties),
                std::mem::replace(&mut state.collection_changed, false),
            )
        };

        tracing::debug!(
            target: targets::BATCH,
            properties = properties.len(),
            collection_changed,
            "flushing update"
        );
        for change in properties {
            self.outlet.publish_property(change);
        }
        if collection_changed {
            self.outlet.publish_collection(CollectionChange::Reset);
        }
        Ok(())
    }

    /// Returns `true` while at least one update block is open.
    pub fn is_updating(&self) -> bool {
        self.outlet.state.lock().depth > 0
    }

    /// Opens an update block that closes when the returned guard drops.
    pub fn batch(&self) -> UpdateGuard<'_, T> {
        self.begin_update();
        UpdateGuard { collection: self }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

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

    /// Returns a point-in-time copy of the elements.
    ///
    /// Safe to call from any thread; never observes a half-applied mutation.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.snapshot()
    }

    /// Reads the elements in place, under the read lock.
    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[T]) -> R,
    {
        self.inner.with_items(f)
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Appends an item to the end.
    pub fn push(&self, item: T) {
        self.inner.push(item);
    }

    /// Inserts an item at `index`.
    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        self.inner.insert(index, item)
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.inner.remove_at(index)
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&self, item: &T) -> bool {
        self.inner.remove(item)
    }

    /// Replaces the element at `index`, returning the old one.
    pub fn replace_at(&self, index: usize, item: T) -> Result<T> {
        self.inner.replace_at(index, item)
    }

    /// Moves the element at `old_index` to `new_index`.
    pub fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        self.inner.move_item(old_index, new_index)
    }

    /// Removes every element.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Replaces the whole contents.
    pub fn set_items(&self, items: Vec<T>) {
        self.inner.set_items(items);
    }

    /// Appends every item under one lock acquisition.
    ///
    /// This does not open an update block; use [`batch`](Self::batch) for
    /// that.
    pub fn push_range<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.inner.push_range(items);
    }

    /// Inserts every item starting at `index`, under one lock acquisition.
    pub fn insert_range<I>(&self, index: usize, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        self.inner.insert_range(index, items)
    }

    /// Removes `count` elements starting at `index`, under one lock acquisition.
    pub fn remove_range(&self, index: usize, count: usize) -> Result<Vec<T>> {
        self.inner.remove_range(index, count)
    }

    /// Removes the first occurrence of each of `items`, under one lock
    /// acquisition. Returns how many were found.
    pub fn remove_items<'i, I>(&self, items: I) -> usize
    where
        I: IntoIterator<Item = &'i T>,
        T: 'i,
    {
        self.inner.remove_items(items)
    }
}

impl<T> CollectionView<T> for BatchingCollection<T>
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
        &self.outlet.signals
    }

    fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.index_of(item)
    }
}

impl<T> OrderedCollectionMut<T> for BatchingCollection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn insert(&self, index: usize, item: T) -> Result<()> {
        self.inner.insert(index, item)
    }

    fn remove_at(&self, index: usize) -> Result<T> {
        self.inner.remove_at(index)
    }

    fn move_item(&self, old_index: usize, new_index: usize) -> Result<()> {
        self.inner.move_item(old_index, new_index)
    }

    fn clear(&self) -> Result<()> {
        self.inner.clear();
        Ok(())
    }

    fn push(&self, item: T) -> Result<()> {
        self.inner.push(item);
        Ok(())
    }
}

/// An open update block on a [`BatchingCollection`].
///
/// Created by [`BatchingCollection::batch`]; ends the block when dropped.
#[must_use = "the update block ends as soon as the guard is dropped"]
pub struct UpdateGuard<'a, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    collection: &'a BatchingCollection<T>,
}

impl<T> Drop for UpdateGuard<'_, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Err(err) = self.collection.end_update() {
            tracing::warn!(target: targets::BATCH, %err, "update guard could not close its block");
        }
    }
}

static_assertions::assert_impl_all!(BatchingCollection<String>: Send, Sync);
