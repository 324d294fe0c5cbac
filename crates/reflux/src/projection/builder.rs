//! Builder for grouping projections.

use std::cmp::Ordering;
use std::hash::Hash;
use std::sync::Arc;

use reflux_core::{DispatchContext, NotifyPropertyChanged};

use super::grouping::{GroupingProjection, Selectors};
use super::source::ItemSource;
use crate::error::Result;

/// Type alias for a group key selector.
pub type KeyFn<K, T> = Box<dyn Fn(&T) -> K + Send + Sync>;

/// Type alias for a comparer of group keys.
pub type KeyCompareFn<K> = Box<dyn Fn(&K, &K) -> Ordering + Send + Sync>;

/// Type alias for a comparer of items, derived from an order key.
pub type ItemCompareFn<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Type alias for a filter predicate.
///
/// Returns `true` if the item should be visible, `false` to hide it.
pub type FilterFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Builder pattern for creating grouping projections.
///
/// Only the source and the group key selector are required. Unless told
/// otherwise, groups are ordered by the natural order of their keys, items
/// keep their source order within a group, and every item is visible.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use reflux::{GroupingProjectionBuilder, ObservableCollection, Shared};
///
/// let source = Arc::new(ObservableCollection::from_vec(vec![
///     Shared::new(31),
///     Shared::new(12),
///     Shared::new(25),
/// ]));
///
/// let by_tens = GroupingProjectionBuilder::new(source, |n: &i32| n / 10)
///     .order_by(|n: &i32| *n)
///     .build()
///     .unwrap();
///
/// assert_eq!(by_tens.len(), 3);
/// assert_eq!(by_tens.get(0).map(|g| *g.key()), Some(1));
/// ```
pub struct GroupingProjectionBuilder<K, T> {
    source: Arc<dyn ItemSource<T>>,
    group_key: KeyFn<K, T>,
    group_compare: Option<KeyCompareFn<K>>,
    order_compare: Option<ItemCompareFn<T>>,
    filter: Option<FilterFn<T>>,
    context: Option<Arc<dyn DispatchContext>>,
}

impl<K, T> GroupingProjectionBuilder<K, T>
where
    K: Ord + Hash + Clone + Send + Sync + 'static,
    T: NotifyPropertyChanged + Send + Sync + 'static,
{
    /// Creates a new builder over `source`, grouping by `group_key`.
    pub fn new<S, F>(source: Arc<S>, group_key: F) -> Self
    where
        S: ItemSource<T> + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            source,
            group_key: Box::new(group_key),
            group_compare: None,
            order_compare: None,
            filter: None,
            context: None,
        }
    }

    /// Orders items within each group by the natural order of `order_key`.
    pub fn order_by<O, F>(self, order_key: F) -> Self
    where
        O: Ord + 'static,
        F: Fn(&T) -> O + Send + Sync + 'static,
    {
        self.order_by_with(order_key, O::cmp)
    }

    /// Orders items within each group by `order_key` under `compare`.
    pub fn order_by_with<O, F, C>(mut self, order_key: F, compare: C) -> Self
    where
        O: 'static,
        F: Fn(&T) -> O + Send + Sync + 'static,
        C: Fn(&O, &O) -> Ordering + Send + Sync + 'static,
    {
        self.order_compare = Some(Box::new(move |a, b| compare(&order_key(a), &order_key(b))));
        self
    }

    /// Orders the groups by `compare` instead of the natural key order.
    pub fn group_order_by<C>(mut self, compare: C) -> Self
    where
        C: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        self.group_compare = Some(Box::new(compare));
        self
    }

    /// Hides items for which `filter` returns `false`.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Posts every group-level notification to `context`.
    pub fn context(mut self, context: Arc<dyn DispatchContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the projection and computes its initial state.
    pub fn build(self) -> Result<GroupingProjection<K, T>> {
        let selectors = Selectors {
            group_key: self.group_key,
            group_compare: self.group_compare.unwrap_or_else(|| Box::new(K::cmp)),
            order_compare: self.order_compare,
            filter: self.filter,
        };
        GroupingProjection::from_parts(self.source, selectors, self.context)
    }
}
