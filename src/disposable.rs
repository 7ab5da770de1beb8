//! Cancellation handles.
//!
//! Every handle is idempotent: the second `dispose` is a no-op. User
//! teardown closures are never invoked while a handle holds its own lock.

use std::{
  fmt,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
};

use crate::rc::lock;

mod composite;
mod ref_count;
mod serial;
mod single_assignment;

pub use composite::CompositeDisposable;
pub use ref_count::RefCountDisposable;
pub use serial::SerialDisposable;
pub use single_assignment::SingleAssignmentDisposable;

pub trait Disposable: Send + Sync {
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

// ==================== BoxedDisposable ====================

/// A shared, type-erased disposable.
///
/// Clones refer to the same handle, so disposing any clone disposes all.
#[derive(Clone)]
pub struct BoxedDisposable(Arc<dyn Disposable>);

impl BoxedDisposable {
  pub fn new(d: impl Disposable + 'static) -> Self { Self(Arc::new(d)) }

  /// A disposable running `f` on its first dispose.
  pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
    Self::new(AnonymousDisposable::new(f))
  }

  /// A disposable with nothing to tear down.
  pub fn empty() -> Self { Self::new(BooleanDisposable::default()) }

  /// Whether both handles point at the same underlying disposable.
  pub fn ptr_eq(&self, other: &BoxedDisposable) -> bool {
    std::ptr::eq(
      Arc::as_ptr(&self.0) as *const (),
      Arc::as_ptr(&other.0) as *const (),
    )
  }

  /// Disposes this handle when the returned guard is dropped.
  #[must_use]
  pub fn into_guard(self) -> DisposeGuard { DisposeGuard(Some(self)) }
}

impl Disposable for BoxedDisposable {
  #[inline]
  fn dispose(&self) { self.0.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.is_disposed() }
}

impl<D: Disposable + 'static> From<Arc<D>> for BoxedDisposable {
  fn from(d: Arc<D>) -> Self { Self(d) }
}

impl fmt::Debug for BoxedDisposable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BoxedDisposable")
      .field("disposed", &self.is_disposed())
      .finish()
  }
}

// ==================== AnonymousDisposable ====================

/// Runs an action exactly once.
pub struct AnonymousDisposable {
  action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl AnonymousDisposable {
  pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
    Self { action: Mutex::new(Some(Box::new(action))) }
  }
}

impl Disposable for AnonymousDisposable {
  fn dispose(&self) {
    let action = lock(&self.action).take();
    if let Some(action) = action {
      action();
    }
  }

  fn is_disposed(&self) -> bool { lock(&self.action).is_none() }
}

// ==================== BooleanDisposable ====================

/// Only records whether it was disposed.
#[derive(Default)]
pub struct BooleanDisposable(AtomicBool);

impl Disposable for BooleanDisposable {
  fn dispose(&self) { self.0.store(true, Ordering::Release) }

  fn is_disposed(&self) -> bool { self.0.load(Ordering::Acquire) }
}

// ==================== DisposeGuard ====================

/// Disposes the wrapped handle when dropped.
#[must_use]
pub struct DisposeGuard(Option<BoxedDisposable>);

impl DisposeGuard {
  /// Gives the handle back without disposing it.
  pub fn into_inner(mut self) -> BoxedDisposable {
    self.0.take().unwrap_or_else(BoxedDisposable::empty)
  }
}

impl Drop for DisposeGuard {
  fn drop(&mut self) {
    if let Some(d) = self.0.take() {
      d.dispose();
    }
  }
}
