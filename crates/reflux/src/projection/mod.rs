//! Grouped, ordered, filtered views over a source collection.
//!
//! Build a [`GroupingProjection`] with [`GroupingProjectionBuilder`]. The
//! projection owns its [`Group`]s; consumers read them, observe them, and
//! never edit them.

mod builder;
mod debug;
mod group;
mod grouping;
mod source;

pub use builder::{FilterFn, GroupingProjectionBuilder, ItemCompareFn, KeyCompareFn, KeyFn};
pub use debug::ProjectionTreeDebug;
pub use group::{Group, GroupItemsChange};
pub use grouping::GroupingProjection;
pub use source::ItemSource;
