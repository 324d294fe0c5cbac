//! The grouping projection engine.
//!
//! A [`GroupingProjection`] keeps a live, grouped, ordered and filtered view
//! of an [`ItemSource`]. Every trigger (a structural change of the source, a
//! property change of a source item, or an explicit
//! [`refresh`](GroupingProjection::refresh)) recomputes the whole desired
//! view and reconciles the live one against it:
//!
//! 1. Snapshot the source, filter it and stable-sort it by the order key.
//! 2. Partition by group key, keeping the order within each bucket, and sort
//!    the buckets by group key.
//! 3. Synchronize the group list (groups match by key, so live groups are
//!    reused), then each group's item list, both with
//!    [`SyncMode::KeepOrderByMove`].
//!
//! Passes never interleave. A trigger raised on the thread that is already
//! re-projecting (a subscriber mutating the source from inside a
//! notification) marks the running pass dirty and it repeats once done.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use reflux_core::logging::targets;
use reflux_core::{
    ConnectionId, DispatchContext, NotifyPropertyChanged, PerfSpan, PropertyChange, Signal,
};

use super::builder::{FilterFn, GroupingProjectionBuilder, ItemCompareFn, KeyCompareFn, KeyFn};
use super::group::{Group, GroupItemsChange};
use super::source::ItemSource;
use crate::collection::{
    BatchingCollection, CollectionChange, CollectionSignals, CollectionView, OrderedCollectionMut,
    UpdateGuard,
};
use crate::error::{CollectionError, Result};
use crate::shared::Shared;
use crate::sync::{SyncMode, Synchronizer, synchronize};

/// The caller-supplied functions that shape a projection.
pub(super) struct Selectors<K, T> {
    pub(super) group_key: KeyFn<K, T>,
    pub(super) group_compare: KeyCompareFn<K>,
    pub(super) order_compare: Option<ItemCompareFn<T>>,
    pub(super) filter: Option<FilterFn<T>>,
}

#[derive(Default)]
struct PassState {
    running: Cell<bool>,
    rerun: Cell<bool>,
}

/// Clears the running flag even if a pass unwinds.
struct RunningGuard<'a>(&'a PassState);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.running.set(false);
    }
}

struct ItemSubscription {
    id: ConnectionId,
    /// How many times the item occurs in the source.
    count: usize,
}

struct Subscriptions<T> {
    source: Option<ConnectionId>,
    items: HashMap<Shared<T>, ItemSubscription>,
}

struct ProjectionInner<K, T> {
    this: Weak<Self>,
    source: Arc<dyn ItemSource<T>>,
    groups: BatchingCollection<Arc<Group<K, T>>>,
    selectors: Selectors<K, T>,
    group_items_changed: Signal<GroupItemsChange<K, T>>,
    pass: ReentrantMutex<PassState>,
    subscriptions: Mutex<Subscriptions<T>>,
    disposed: AtomicBool,
}

impl<K, T> ProjectionInner<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Re-projection
    // -------------------------------------------------------------------------

    fn reproject(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(CollectionError::Disposed);
        }

        let pass = self.pass.lock();
        if pass.running.get() {
            pass.rerun.set(true);
            tracing::trace!(target: targets::PROJECTION, "re-projection requested while running");
            return Ok(());
        }
        pass.running.set(true);
        let _running = RunningGuard(&pass);

        loop {
            pass.rerun.set(false);
            self.project_once()?;
            if !pass.rerun.get() || self.is_disposed() {
                return Ok(());
            }
        }
    }

    fn project_once(&self) -> Result<()> {
        let _span = PerfSpan::new("reproject");

        let mut visible: Vec<Shared<T>> = self
            .source
            .snapshot()
            .into_iter()
            .filter(|item| self.selectors.filter.as_ref().is_none_or(|f| f(&**item)))
            .collect();
        if let Some(compare) = &self.selectors.order_compare {
            visible.sort_by(|a, b| compare(&**a, &**b));
        }

        let mut slots: HashMap<K, usize> = HashMap::new();
        let mut partitions: Vec<(K, Vec<Shared<T>>)> = Vec::new();
        for item in visible {
            let key = (self.selectors.group_key)(&*item);
            match slots.get(&key) {
                Some(&slot) => partitions[slot].1.push(item),
                None => {
                    slots.insert(key.clone(), partitions.len());
                    partitions.push((key, vec![item]));
                }
            }
        }
        partitions.sort_by(|(a, _), (b, _)| (self.selectors.group_compare)(a, b));

        let desired: Vec<Arc<Group<K, T>>> = partitions
            .iter()
            .map(|(key, items)| Arc::new(Group::new(key.clone(), items.clone())))
            .collect();

        let group_report = Synchronizer::new(SyncMode::KeepOrderByMove)
            .on_removed(|group: Arc<Group<K, T>>| group.detach())
            .run(&self.groups, desired)?;

        // The group list now matches `partitions` position for position.
        let mut item_ops = 0;
        for (group, (_, items)) in self.groups.snapshot().into_iter().zip(partitions) {
            self.attach_forwarder(&group);
            let report = synchronize(group.items_mut(), items, SyncMode::KeepOrderByMove)?;
            item_ops += report.removed + report.inserted + report.moved;
        }

        tracing::debug!(
            target: targets::PROJECTION,
            groups = self.groups.len(),
            groups_removed = group_report.removed,
            groups_inserted = group_report.inserted,
            groups_moved = group_report.moved,
            item_ops,
            "re-projected"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Starts republishing `group`'s item changes, if not already doing so.
    fn attach_forwarder(&self, group: &Arc<Group<K, T>>) {
        let mut forwarder = group.forwarder.lock();
        if forwarder.is_some() {
            return;
        }
        let weak = self.this.clone();
        let key = group.key().clone();
        let id = group.collection_changed().connect(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.group_items_changed.emit(GroupItemsChange {
                    key: key.clone(),
                    change: change.clone(),
                });
            }
        });
        *forwarder = Some(id);
    }

    fn attach_source(&self) {
        let Some(feed) = self.source.collection_changed() else {
            return;
        };
        let weak = self.this.clone();
        let id = feed.connect(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.on_source_changed(change);
            }
        });
        self.subscriptions.lock().source = Some(id);
    }

    fn subscribe(&self, item: &Shared<T>) {
        let mut subs = self.subscriptions.lock();
        if let Some(existing) = subs.items.get_mut(item) {
            existing.count += 1;
            return;
        }
        let Some(feed) = item.property_changed() else {
            return;
        };
        let weak = self.this.clone();
        let id = feed.connect(move |change| {
            if let Some(inner) = weak.upgrade() {
                inner.on_item_changed(change);
            }
        });
        subs.items.insert(item.clone(), ItemSubscription { id, count: 1 });
    }

    fn unsubscribe(&self, item: &Shared<T>) {
        let mut subs = self.subscriptions.lock();
        let Some(existing) = subs.items.get_mut(item) else {
            return;
        };
        existing.count -= 1;
        if existing.count > 0 {
            return;
        }
        if let Some(sub) = subs.items.remove(item)
            && let Some(feed) = item.property_changed()
        {
            feed.disconnect(sub.id);
        }
    }

    fn unsubscribe_all_items(&self) {
        let items: Vec<_> = self.subscriptions.lock().items.drain().collect();
        for (item, sub) in items {
            if let Some(feed) = item.property_changed() {
                feed.disconnect(sub.id);
            }
        }
    }

    fn subscribe_snapshot(&self) {
        for item in self.source.snapshot() {
            self.subscribe(&item);
        }
    }

    // -------------------------------------------------------------------------
    // Handlers
    // -------------------------------------------------------------------------

    fn on_source_changed(&self, change: &CollectionChange<Shared<T>>) {
        if self.is_disposed() {
            return;
        }
        tracing::trace!(target: targets::PROJECTION, kind = change.kind(), "source changed");
        match change {
            CollectionChange::Added { item, .. } => self.subscribe(item),
            CollectionChange::Removed { item, .. } => self.unsubscribe(item),
            CollectionChange::Replaced { old, new, .. } => {
                self.subscribe(new);
                self.unsubscribe(old);
            }
            CollectionChange::Moved { .. } => {}
            CollectionChange::Reset => {
                self.unsubscribe_all_items();
                self.subscribe_snapshot();
            }
        }
        self.reproject_or_log();
    }

    fn on_item_changed(&self, change: &PropertyChange) {
        if self.is_disposed() {
            return;
        }
        tracing::trace!(target: targets::PROJECTION, property = %change, "item changed");
        self.reproject_or_log();
    }

    fn reproject_or_log(&self) {
        if let Err(err) = self.reproject() {
            tracing::error!(target: targets::PROJECTION, %err, "re-projection failed");
        }
    }

    // -------------------------------------------------------------------------
    // Disposal
    // -------------------------------------------------------------------------

    fn dispose(&self) {
        let _pass = self.pass.lock();
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        let source = self.subscriptions.lock().source.take();
        if let (Some(id), Some(feed)) = (source, self.source.collection_changed()) {
            feed.disconnect(id);
        }
        self.unsubscribe_all_items();
        for group in self.groups.snapshot() {
            group.detach();
        }
        tracing::debug!(
            target: targets::PROJECTION,
            groups = self.groups.len(),
            "projection disposed"
        );
    }
}

/// A live view of a source, grouped by key, ordered and filtered.
///
/// The group list is a [`BatchingCollection`]: its notifications can be
/// batched with [`begin_update`](Self::begin_update) /
/// [`end_update`](Self::end_update) and posted to the context given to the
/// builder. Each group's item changes are also republished on
/// [`group_items_changed`](Self::group_items_changed), tagged with the key.
///
/// The shape is derived from the source only. Mutating it through
/// [`OrderedCollectionMut`] fails with [`CollectionError::NotSupported`].
///
/// Dropping the projection disposes it.
pub struct GroupingProjection<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    inner: Arc<ProjectionInner<K, T>>,
}

impl<K, T> GroupingProjection<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    /// Starts building a projection over `source`, grouped by `group_key`.
    pub fn builder<S, F>(source: Arc<S>, group_key: F) -> GroupingProjectionBuilder<K, T>
    where
        S: ItemSource<T> + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        GroupingProjectionBuilder::new(source, group_key)
    }

    pub(super) fn from_parts(
        source: Arc<dyn ItemSource<T>>,
        selectors: Selectors<K, T>,
        context: Option<Arc<dyn DispatchContext>>,
    ) -> Result<Self> {
        let inner = Arc::new_cyclic(|this| ProjectionInner {
            this: this.clone(),
            source,
            groups: BatchingCollection::with_context(Vec::new(), context),
            selectors,
            group_items_changed: Signal::new(),
            pass: ReentrantMutex::new(PassState::default()),
            subscriptions: Mutex::new(Subscriptions {
                source: None,
                items: HashMap::new(),
            }),
            disposed: AtomicBool::new(false),
        });
        inner.subscribe_snapshot();
        inner.attach_source();

        let projection = Self { inner };
        projection.inner.reproject()?;
        tracing::debug!(
            target: targets::PROJECTION,
            groups = projection.len(),
            dispatched = projection.inner.groups.has_context(),
            "projection created"
        );
        Ok(projection)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.inner.groups.len()
    }

    /// Returns `true` if no item is visible.
    pub fn is_empty(&self) -> bool {
        self.inner.groups.is_empty()
    }

    /// The group at `index`.
    pub fn get(&self, index: usize) -> Option<Arc<Group<K, T>>> {
        self.inner.groups.get(index)
    }

    /// The group whose key is `key`.
    pub fn group(&self, key: &K) -> Option<Arc<Group<K, T>>> {
        self.inner
            .groups
            .with_items(|groups| groups.iter().find(|g| g.key() == key).cloned())
    }

    /// Position of the group whose key is `key`.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.inner
            .groups
            .with_items(|groups| groups.iter().position(|g| g.key() == key))
    }

    /// A point-in-time copy of the groups, in order.
    pub fn snapshot(&self) -> Vec<Arc<Group<K, T>>> {
        self.inner.groups.snapshot()
    }

    /// Same as [`snapshot`](Self::snapshot).
    pub fn groups(&self) -> Vec<Arc<Group<K, T>>> {
        self.snapshot()
    }

    /// Number of visible items across all groups.
    pub fn item_count(&self) -> usize {
        self.inner
            .groups
            .with_items(|groups| groups.iter().map(|g| g.len()).sum())
    }

    // -------------------------------------------------------------------------
    // Signals
    // -------------------------------------------------------------------------

    /// Signals of the group list.
    pub fn signals(&self) -> &CollectionSignals<Arc<Group<K, T>>> {
        self.inner.groups.signals()
    }

    /// Groups added, removed or moved, or `Reset` after an update block.
    pub fn collection_changed(&self) -> &Signal<CollectionChange<Arc<Group<K, T>>>> {
        self.inner.groups.collection_changed()
    }

    /// The `"len"` and `"items"` notifications of the group list.
    pub fn property_changed(&self) -> &Signal<PropertyChange> {
        self.inner.groups.property_changed()
    }

    /// Item changes of every group, tagged with the group's key.
    ///
    /// These are emitted on the re-projecting thread; they are not batched
    /// and not posted to the context.
    pub fn group_items_changed(&self) -> &Signal<GroupItemsChange<K, T>> {
        &self.inner.group_items_changed
    }

    // -------------------------------------------------------------------------
    // Batching
    // -------------------------------------------------------------------------

    /// Opens an update block on the group list. Blocks nest.
    pub fn begin_update(&self) {
        self.inner.groups.begin_update();
    }

    /// Closes an update block; see [`BatchingCollection::end_update`].
    pub fn end_update(&self) -> Result<()> {
        self.inner.groups.end_update()
    }

    /// Returns `true` while an update block on the group list is open.
    pub fn is_updating(&self) -> bool {
        self.inner.groups.is_updating()
    }

    /// Opens an update block that closes when the guard drops.
    pub fn batch(&self) -> UpdateGuard<'_, Arc<Group<K, T>>> {
        self.inner.groups.batch()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Recomputes the projection now.
    ///
    /// Needed only when items change in ways they do not announce.
    pub fn refresh(&self) -> Result<()> {
        self.inner.reproject()
    }

    /// Releases the source, item and group subscriptions.
    ///
    /// The groups keep their last state. Calling this again does nothing.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl<K, T> Drop for GroupingProjection<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl<K, T> CollectionView<Arc<Group<K, T>>> for GroupingProjection<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    fn len(&self) -> usize {
        self.inner.groups.len()
    }

    fn get(&self, index: usize) -> Option<Arc<Group<K, T>>> {
        self.inner.groups.get(index)
    }

    fn snapshot(&self) -> Vec<Arc<Group<K, T>>> {
        self.inner.groups.snapshot()
    }

    fn signals(&self) -> &CollectionSignals<Arc<Group<K, T>>> {
        self.inner.groups.signals()
    }
}

impl<K, T> OrderedCollectionMut<Arc<Group<K, T>>> for GroupingProjection<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    fn insert(&self, _index: usize, _item: Arc<Group<K, T>>) -> Result<()> {
        Err(CollectionError::not_supported("insert"))
    }

    fn remove_at(&self, _index: usize) -> Result<Arc<Group<K, T>>> {
        Err(CollectionError::not_supported("remove_at"))
    }

    fn move_item(&self, _old_index: usize, _new_index: usize) -> Result<()> {
        Err(CollectionError::not_supported("move_item"))
    }

    fn clear(&self) -> Result<()> {
        Err(CollectionError::not_supported("clear"))
    }

    fn push(&self, _item: Arc<Group<K, T>>) -> Result<()> {
        Err(CollectionError::not_supported("push"))
    }

    fn remove(&self, _item: &Arc<Group<K, T>>) -> Result<bool> {
        Err(CollectionError::not_supported("remove"))
    }
}

static_assertions::assert_impl_all!(GroupingProjection<u32, String>: Send, Sync);
