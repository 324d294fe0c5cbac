//! Prelude module for Reflux.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use reflux::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use reflux_core::{
    ConnectionId, DispatchContext, NotifyPropertyChanged, Property, PropertyChange, Signal,
    TaskQueue,
};

// ============================================================================
// Collections
// ============================================================================

pub use crate::collection::{
    BatchingCollection, CollectionChange, CollectionView, ObservableCollection, ReadOnlyCollection,
};
pub use crate::shared::Shared;
pub use crate::sync::{SyncMode, synchronize};

// ============================================================================
// Projections
// ============================================================================

pub use crate::projection::{Group, GroupItemsChange, GroupingProjection, ItemSource};
