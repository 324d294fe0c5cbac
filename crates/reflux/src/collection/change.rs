//! Structural change descriptions and the signals that carry them.

use reflux_core::{PropertyChange, Signal};

/// Property name raised when a collection's element count changes.
pub const LEN_PROPERTY: &str = "len";

/// Property name raised on every structural change of a collection.
pub const ITEMS_PROPERTY: &str = "items";

/// A description of one structural change to an ordered collection.
///
/// Indices refer to the collection state immediately before (`Removed`,
/// `Moved::old_index`) or after (`Added`, `Moved::new_index`) the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange<T> {
    /// `item` was inserted at `index`.
    Added { index: usize, item: T },
    /// `item` was removed from `index`.
    Removed { index: usize, item: T },
    /// The element at `index` was replaced.
    Replaced { index: usize, old: T, new: T },
    /// `item` moved from `old_index` to `new_index`.
    Moved {
        item: T,
        old_index: usize,
        new_index: usize,
    },
    /// The contents changed too much to describe; re-read everything.
    Reset,
}

impl<T> CollectionChange<T> {
    /// Returns `true` for [`CollectionChange::Reset`].
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Short name of the change kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Removed { .. } => "removed",
            Self::Replaced { .. } => "replaced",
            Self::Moved { .. } => "moved",
            Self::Reset => "reset",
        }
    }

    /// Whether this change alters the element count.
    ///
    /// A reset may or may not; callers that know the counts decide.
    pub fn changes_len(&self) -> bool {
        matches!(self, Self::Added { .. } | Self::Removed { .. })
    }
}

/// The pair of signals every observable collection raises.
///
/// For each structural change, `property_changed` fires first (`"len"` when
/// the count changed, then `"items"`), followed by `collection_changed`.
pub struct CollectionSignals<T> {
    /// Emitted after each structural change.
    pub collection_changed: Signal<CollectionChange<T>>,
    /// Emitted when a collection-level property changes.
    pub property_changed: Signal<PropertyChange>,
}

impl<T: Clone + Send + 'static> Default for CollectionSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> CollectionSignals<T> {
    /// Creates a new set of collection signals.
    pub fn new() -> Self {
        Self {
            collection_changed: Signal::new(),
            property_changed: Signal::new(),
        }
    }

    /// Emits the property notifications and then the structural change.
    pub fn emit_change(&self, change: CollectionChange<T>, len_changed: bool) {
        if len_changed {
            self.property_changed.emit(PropertyChange::new(LEN_PROPERTY));
        }
        self.property_changed.emit(PropertyChange::new(ITEMS_PROPERTY));
        self.collection_changed.emit(change);
    }
}
