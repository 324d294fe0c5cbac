//! Identity handles for externally owned items.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use reflux_core::{NotifyPropertyChanged, PropertyChange, Signal};

/// A shared handle to an item, compared by identity.
///
/// Two `Shared` handles are equal only when they point to the same allocation,
/// regardless of the item's contents. This is what lets a collection track an
/// item whose fields change while it sits in the collection.
///
/// # Example
///
/// ```
/// use reflux::Shared;
///
/// let a = Shared::new(String::from("same"));
/// let b = Shared::new(String::from("same"));
///
/// assert_ne!(a, b);
/// assert_eq!(a, a.clone());
/// ```
pub struct Shared<T: ?Sized>(Arc<T>);

impl<T> Shared<T> {
    /// Wrap a new item.
    pub fn new(item: T) -> Self {
        Self(Arc::new(item))
    }
}

impl<T: ?Sized> Shared<T> {
    /// Wrap an existing `Arc` without reallocating.
    pub fn from_arc(item: Arc<T>) -> Self {
        Self(item)
    }

    /// Borrow the underlying `Arc`.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    /// Returns `true` if both handles refer to the same item.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T: ?Sized> Eq for Shared<T> {}

impl<T: ?Sized> Hash for Shared<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T> From<T> for Shared<T> {
    fn from(item: T) -> Self {
        Self::new(item)
    }
}

impl<T: ?Sized> From<Arc<T>> for Shared<T> {
    fn from(item: Arc<T>) -> Self {
        Self::from_arc(item)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl<T: ?Sized + NotifyPropertyChanged> NotifyPropertyChanged for Shared<T> {
    fn property_changed(&self) -> Option<&Signal<PropertyChange>> {
        self.0.property_changed()
    }
}

static_assertions::assert_impl_all!(Shared<String>: Send, Sync, Clone);
