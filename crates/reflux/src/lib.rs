//! Reflux - live grouped views over observable collections.
//!
//! This crate builds on the signal and property primitives of
//! [`reflux_core`] (re-exported here) and adds:
//!
//! - [`ObservableCollection`] and the [`CollectionView`] /
//!   [`OrderedCollectionMut`] capability split
//! - [`BatchingCollection`], which coalesces notifications between
//!   `begin_update` and `end_update` and can post them to a
//!   [`DispatchContext`]
//! - [`synchronize`] / [`Synchronizer`], minimal-diff reconciliation of an
//!   ordered collection
//! - [`GroupingProjection`], a live grouped, ordered and filtered view
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reflux::{CollectionChange, GroupingProjection, ObservableCollection, Shared};
//!
//! let words = Arc::new(ObservableCollection::from_vec(vec![
//!     Shared::new("apple"),
//!     Shared::new("avocado"),
//!     Shared::new("banana"),
//! ]));
//!
//! let by_initial = GroupingProjection::builder(words.clone(), |w: &&str| w.chars().next())
//!     .order_by(|w: &&str| w.len())
//!     .build()?;
//! assert_eq!(by_initial.len(), 2);
//!
//! by_initial.collection_changed().connect(|change| {
//!     if let CollectionChange::Added { item, .. } = change {
//!         println!("new group {:?}", item.key());
//!     }
//! });
//! words.push(Shared::new("cherry"));
//! assert_eq!(by_initial.len(), 3);
//! # Ok::<(), reflux::CollectionError>(())
//! ```

pub use reflux_core::*;

pub mod collection;
mod error;
pub mod prelude;
pub mod projection;
mod shared;
pub mod sync;

pub use collection::{
    BatchingCollection, CollectionChange, CollectionSignals, CollectionView, ITEMS_PROPERTY,
    LEN_PROPERTY, ObservableCollection, OrderedCollectionMut, ReadOnlyCollection, UpdateGuard,
};
pub use error::{CollectionError, Result};
pub use projection::{
    Group, GroupItemsChange, GroupingProjection, GroupingProjectionBuilder, ItemSource,
    ProjectionTreeDebug,
};
pub use shared::Shared;
pub use sync::{SyncMode, SyncReport, Synchronizer, synchronize};
