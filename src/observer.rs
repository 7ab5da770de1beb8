use std::sync::Arc;

use tracing::warn;

use crate::error::RxError;

mod auto_detach;
pub use auto_detach::AutoDetachObserver;

/// A sink for the notifications of one subscription.
///
/// Implementations receive `Next*` optionally followed by exactly one of
/// `on_error` or `on_completed`, never concurrently.
pub trait Observer<T>: Send + Sync {
  fn on_next(&self, value: T);

  fn on_error(&self, err: RxError);

  fn on_completed(&self);

  /// Whether the observer stopped accepting values. Sources use it to end
  /// synchronous loops early.
  fn is_closed(&self) -> bool { false }
}

pub type BoxedObserver<T> = Arc<dyn Observer<T>>;

impl<T, O: Observer<T> + ?Sized> Observer<T> for Arc<O> {
  #[inline]
  fn on_next(&self, value: T) { (**self).on_next(value) }

  #[inline]
  fn on_error(&self, err: RxError) { (**self).on_error(err) }

  #[inline]
  fn on_completed(&self) { (**self).on_completed() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

// ==================== FnObserver ====================

/// An observer built from three callbacks.
pub struct FnObserver<N, E, C> {
  next: N,
  error: E,
  complete: C,
}

impl<N, E, C> FnObserver<N, E, C> {
  pub fn new(next: N, error: E, complete: C) -> Self { Self { next, error, complete } }
}

impl<T, N, E, C> Observer<T> for FnObserver<N, E, C>
where
  N: Fn(T) + Send + Sync,
  E: Fn(RxError) + Send + Sync,
  C: Fn() + Send + Sync,
{
  #[inline]
  fn on_next(&self, value: T) { (self.next)(value) }

  #[inline]
  fn on_error(&self, err: RxError) { (self.error)(err) }

  #[inline]
  fn on_completed(&self) { (self.complete)() }
}

/// Error callback used when a subscriber only cares about values.
pub(crate) fn unhandled_error(err: RxError) {
  warn!(error = %err, "unhandled error reached a subscriber without an error callback");
}
