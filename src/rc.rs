use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared mutable state for one subscription.
///
/// A poisoned lock is recovered instead of propagated: a panicking observer
/// must not wedge the teardown of its siblings.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Runs `f` with the lock held and returns its result.
  #[inline]
  pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R { f(&mut self.rc_deref_mut()) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

/// Locks a plain mutex the same way [`MutArc`] does.
#[inline]
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}
