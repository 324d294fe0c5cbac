//! Sources a projection can observe.

use reflux_core::Signal;

use crate::collection::{BatchingCollection, CollectionChange, ObservableCollection};
use crate::shared::Shared;

/// A sequence of items a [`GroupingProjection`](super::GroupingProjection)
/// can be built over.
///
/// A source without a change feed is projected once and then only on
/// [`refresh`](super::GroupingProjection::refresh) or item property changes.
pub trait ItemSource<T>: Send + Sync {
    /// A point-in-time copy of the source's items.
    fn snapshot(&self) -> Vec<Shared<T>>;

    /// The source's structural change feed, if it has one.
    fn collection_changed(&self) -> Option<&Signal<CollectionChange<Shared<T>>>> {
        None
    }
}

impl<T> ItemSource<T> for ObservableCollection<Shared<T>>
where
    T: Send + Sync + 'static,
{
    fn snapshot(&self) -> Vec<Shared<T>> {
        ObservableCollection::snapshot(self)
    }

    fn collection_changed(&self) -> Option<&Signal<CollectionChange<Shared<T>>>> {
        Some(ObservableCollection::collection_changed(self))
    }
}

impl<T> ItemSource<T> for BatchingCollection<Shared<T>>
where
    T: Send + Sync + 'static,
{
    fn snapshot(&self) -> Vec<Shared<T>> {
        BatchingCollection::snapshot(self)
    }

    fn collection_changed(&self) -> Option<&Signal<CollectionChange<Shared<T>>>> {
        Some(BatchingCollection::collection_changed(self))
    }
}

impl<T> ItemSource<T> for Vec<Shared<T>>
where
    T: Send + Sync,
{
    fn snapshot(&self) -> Vec<Shared<T>> {
        self.clone()
    }
}
