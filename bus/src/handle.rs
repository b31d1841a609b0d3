//! Shared-ownership handles for bus devices.
//!
//! - [Handle<T>] owns a strong [Arc] reference. The bus keeps one for every registered device
//!   and the caller that added the device keeps another; the device is torn down (its `Drop`
//!   runs) when the last of them goes away, from whichever thread releases it.
//! - [HandleRef<T>] is a weak back-reference, used by a peripheral to point at its controller
//!   without keeping it alive. Upgrade it with [HandleRef::get_handle] and handle [None].
use alloc::sync::{Arc, Weak};
use core::{fmt::Debug, ops::Deref};

/// Strong owning handle backed by [Arc<T>].
pub struct Handle<T> {
    inner: Arc<T>,
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> From<T> for Handle<T> {
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug> Debug for Handle<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T> Handle<T> {
    /// Create a non-owning [HandleRef<T>] to the same object.
    pub fn create_ref(&self) -> HandleRef<T> {
        HandleRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles point at the same device object.
    pub fn ptr_eq(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of strong holders, the bus included.
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

/// Weak (non-owning) handle backed by [Weak<T>].
pub struct HandleRef<T> {
    inner: Weak<T>,
}

impl<T> Clone for HandleRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Debug for HandleRef<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HandleRef(..)")
    }
}

impl<T> HandleRef<T> {
    /// Attempt to upgrade into a strong [Handle<T>].
    ///
    /// Return [None] once every strong holder has dropped the object.
    pub fn get_handle(&self) -> Option<Handle<T>> {
        Weak::upgrade(&self.inner).map(|inner| Handle { inner })
    }

    /// Whether this reference points at the object owned by `handle`.
    pub fn refers_to(&self, handle: &Handle<T>) -> bool {
        Weak::ptr_eq(&self.inner, &Arc::downgrade(&handle.inner))
    }
}

/// Identity comparison for shared driver objects.
///
/// Compares data addresses only, so two `Arc<dyn Trait>` built from the same allocation are
/// equal even if their vtable pointers differ.
pub(crate) fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
