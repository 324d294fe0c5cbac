//! Ordered observable collections.
//!
//! - [`ObservableCollection`]: storage plus change notification
//! - [`BatchingCollection`]: adds update batching and context dispatch
//! - [`ReadOnlyCollection`]: a consumer-facing view with no mutators
//! - [`CollectionView`] / [`OrderedCollectionMut`]: the read and write
//!   capabilities every collection here implements

mod batching;
mod change;
mod observable;
mod read_only;
mod traits;

pub use batching::{BatchingCollection, UpdateGuard};
pub use change::{CollectionChange, CollectionSignals, ITEMS_PROPERTY, LEN_PROPERTY};
pub use observable::ObservableCollection;
pub use read_only::ReadOnlyCollection;
pub use traits::{CollectionView, OrderedCollectionMut};
