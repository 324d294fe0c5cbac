//! Minimal-diff synchronization of an ordered collection.
//!
//! [`Synchronizer`] makes a target [`OrderedCollectionMut`] hold exactly the
//! elements of a desired sequence using single-element operations only, so
//! every change reaches observers as the ordinary `Added`, `Removed` or
//! `Moved` notification of the target. No batching happens here; wrap the
//! target in a [`BatchingCollection`](crate::BatchingCollection) for that.
//!
//! # Algorithm
//!
//! 1. Remove, in target order, every element that is not in the desired
//!    sequence, handing each to the removal hook.
//! 2. Walk the desired sequence by position `i`: insert missing elements at
//!    `i`; for an element found later than `i`, reconcile per [`SyncMode`].
//!
//! # Example
//!
//! ```
//! use reflux::{ObservableCollection, SyncMode, synchronize};
//!
//! let target = ObservableCollection::from_vec(vec!['a', 'b', 'c']);
//! let report = synchronize(&target, ['c', 'a', 'd'], SyncMode::KeepOrderByMove).unwrap();
//!
//! assert_eq!(target.snapshot(), vec!['c', 'a', 'd']);
//! assert_eq!((report.removed, report.inserted, report.moved), (1, 1, 1));
//! ```

use std::collections::HashSet;
use std::hash::Hash;

use reflux_core::logging::targets;

use crate::collection::OrderedCollectionMut;
use crate::error::Result;

/// How the synchronizer treats elements that exist in the target but sit
/// after their desired position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncMode {
    /// Leave misplaced elements where they are. Only membership is
    /// guaranteed; newly inserted elements still land at their desired index.
    IgnoreOrder,
    /// Move a misplaced element into place (one `Moved` notification).
    #[default]
    KeepOrderByMove,
    /// Remove a misplaced element and re-insert it in place (a `Removed` and
    /// an `Added` notification).
    KeepOrderByRemoveInsert,
}

/// What one synchronization run did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Elements removed because they were absent from the desired sequence.
    pub removed: usize,
    /// Elements inserted because they were absent from the target.
    pub inserted: usize,
    /// Elements put back in order, by move or by remove and re-insert.
    pub moved: usize,
}

impl SyncReport {
    /// Returns `true` if the run left the target untouched.
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.inserted == 0 && self.moved == 0
    }
}

type FilterFn<'f, T> = Box<dyn Fn(&T) -> bool + 'f>;
type RemovedHook<'f, T> = Box<dyn FnMut(T) + 'f>;

/// Configurable ordered-view synchronizer.
///
/// Built with a [`SyncMode`] and optionally a filter and removal hook, then
/// consumed by [`run`](Self::run).
pub struct Synchronizer<'f, T> {
    mode: SyncMode,
    filter: Option<FilterFn<'f, T>>,
    on_removed: Option<RemovedHook<'f, T>>,
}

impl<'f, T> Synchronizer<'f, T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    /// Creates a synchronizer with the given mode.
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            filter: None,
            on_removed: None,
        }
    }

    /// Keeps only desired elements for which `filter` returns `true`.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + 'f,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Calls `hook` with every element the removal pass takes out.
    ///
    /// Elements moved by [`SyncMode::KeepOrderByRemoveInsert`] are not
    /// reported; they stay in the target.
    pub fn on_removed<F>(mut self, hook: F) -> Self
    where
        F: FnMut(T) + 'f,
    {
        self.on_removed = Some(Box::new(hook));
        self
    }

    /// Makes `target` match `desired`.
    ///
    /// `desired` should be duplicate-free; later duplicates are ignored.
    pub fn run<C, I>(mut self, target: &C, desired: I) -> Result<SyncReport>
    where
        C: OrderedCollectionMut<T> + ?Sized,
        I: IntoIterator<Item = T>,
    {
        let mut seen = HashSet::new();
        let desired: Vec<T> = desired
            .into_iter()
            .filter(|item| self.filter.as_ref().is_none_or(|f| f(item)))
            .filter(|item| seen.insert(item.clone()))
            .collect();

        let mut report = SyncReport::default();

        for (index, item) in target.snapshot().into_iter().enumerate() {
            if seen.contains(&item) {
                continue;
            }
            let removed = target.remove_at(index - report.removed)?;
            tracing::trace!(target: targets::SYNC, index = index - report.removed, "removed");
            report.removed += 1;
            if let Some(hook) = self.on_removed.as_mut() {
                hook(removed);
            }
        }

        for (index, item) in desired.into_iter().enumerate() {
            match target.index_of(&item) {
                None => {
                    target.insert(index, item)?;
                    tracing::trace!(target: targets::SYNC, index, "inserted");
                    report.inserted += 1;
                }
                Some(current) if current > index => match self.mode {
                    SyncMode::IgnoreOrder => {}
                    SyncMode::KeepOrderByMove => {
                        target.move_item(current, index)?;
                        tracing::trace!(target: targets::SYNC, from = current, to = index, "moved");
                        report.moved += 1;
                    }
                    SyncMode::KeepOrderByRemoveInsert => {
                        let item = target.remove_at(current)?;
                        target.insert(index, item)?;
                        tracing::trace!(
                            target: targets::SYNC,
                            from = current,
                            to = index,
                            "removed and re-inserted"
                        );
                        report.moved += 1;
                    }
                },
                Some(_) => {}
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                target: targets::SYNC,
                mode = ?self.mode,
                removed = report.removed,
                inserted = report.inserted,
                moved = report.moved,
                "synchronized view"
            );
        }
        Ok(report)
    }
}

/// Makes `target` match `desired` with no filter and no removal hook.
pub fn synchronize<T, C, I>(target: &C, desired: I, mode: SyncMode) -> Result<SyncReport>
where
    T: Clone + Eq + Hash + Send + 'static,
    C: OrderedCollectionMut<T> + ?Sized,
    I: IntoIterator<Item = T>,
{
    Synchronizer::new(mode).run(target, desired)
}
