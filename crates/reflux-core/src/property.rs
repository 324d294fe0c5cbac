//! Property system for Reflux.
//!
//! Properties hold the mutable state of observable items. When a property
//! changes, the owner announces it on a `Signal<PropertyChange>`, which is
//! what projections and collections listen to.
//!
//! # Types
//!
//! - **Property<T>**: A value with change detection
//! - **PropertyChange**: The payload of a property-change notification
//! - **NotifyPropertyChanged**: The optional capability of an item to report
//!   property changes
//!
//! # Example
//!
//! ```
//! use reflux_core::{NotifyPropertyChanged, Property, PropertyChange, Signal};
//!
//! struct Task {
//!     title: Property<String>,
//!     changed: Signal<PropertyChange>,
//! }
//!
//! impl Task {
//!     fn set_title(&self, title: &str) {
//!         self.title.set_notify(title.to_string(), &self.changed, "title");
//!     }
//! }
//!
//! impl NotifyPropertyChanged for Task {
//!     fn property_changed(&self) -> Option<&Signal<PropertyChange>> {
//!         Some(&self.changed)
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::Signal;

/// A property that tracks changes.
///
/// `Property<T>` wraps a value and provides change detection. When `set()` is
/// called, it compares the new value with the current one and returns whether
/// the value actually changed.
///
/// # Thread Safety
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
///
/// # Example
///
/// ```
/// use reflux_core::Property;
///
/// let prop = Property::new(42);
/// assert_eq!(prop.get(), 42);
///
/// assert!(!prop.set(42));
/// assert!(prop.set(100));
/// assert_eq!(prop.get(), 100);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification when this
    /// returns `true`; [`set_notify`](Self::set_notify) does both.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value and, if it changed, emit `name` on `notifier`.
    ///
    /// The write lock is released before the notification goes out, so
    /// listeners may read the property.
    pub fn set_notify(
        &self,
        value: T,
        notifier: &Signal<PropertyChange>,
        name: &'static str,
    ) -> bool {
        let changed = self.set(value);
        if changed {
            tracing::trace!(target: targets::PROPERTY, property = name, "property changed");
            notifier.emit(PropertyChange::new(name));
        }
        changed
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}

/// The payload of a property-change notification: the property's name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyChange {
    name: Cow<'static, str>,
}

impl PropertyChange {
    /// Create a notification for the named property.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }

    /// The name of the property that changed.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Optional capability of an item to announce its own property changes.
///
/// Items that cannot change (or whose changes nobody needs to see) keep the
/// default, which reports no feed at all.
pub trait NotifyPropertyChanged {
    /// The feed on which this item announces property changes, if any.
    fn property_changed(&self) -> Option<&Signal<PropertyChange>> {
        None
    }
}

macro_rules! impl_silent_items {
    ($($ty:ty),* $(,)?) => {
        $(impl NotifyPropertyChanged for $ty {})*
    };
}

impl_silent_items!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String,
    &'static str,
);
