use std::sync::atomic::{AtomicBool, Ordering};

use super::{BoxedObserver, Observer};
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  error::{Result, RxError},
};

/// Enforces the terminal rule for a subscriber and tears down the upstream
/// subscription once a terminal notification went through.
///
/// Upstream is disposed even if the wrapped callback panics.
pub struct AutoDetachObserver<T> {
  observer: BoxedObserver<T>,
  stopped: AtomicBool,
  upstream: SingleAssignmentDisposable,
}

impl<T> AutoDetachObserver<T> {
  pub fn new(observer: BoxedObserver<T>) -> Self {
    Self {
      observer,
      stopped: AtomicBool::new(false),
      upstream: SingleAssignmentDisposable::new(),
    }
  }

  /// Binds the disposable returned by the upstream subscribe call.
  pub fn set_upstream(&self, d: BoxedDisposable) -> Result<()> { self.upstream.set(d) }

  pub fn is_stopped(&self) -> bool { self.stopped.load(Ordering::Acquire) }

  fn stop(&self) -> bool { !self.stopped.swap(true, Ordering::AcqRel) }
}

/// Disposes the upstream when dropped, including during unwinding.
struct Detach<'a>(&'a SingleAssignmentDisposable);

impl Drop for Detach<'_> {
  fn drop(&mut self) { self.0.dispose() }
}

impl<T> Observer<T> for AutoDetachObserver<T> {
  fn on_next(&self, value: T) {
    if !self.is_stopped() {
      self.observer.on_next(value);
    }
  }

  fn on_error(&self, err: RxError) {
    if self.stop() {
      let _detach = Detach(&self.upstream);
      self.observer.on_error(err);
    }
  }

  fn on_completed(&self) {
    if self.stop() {
      let _detach = Detach(&self.upstream);
      self.observer.on_completed();
    }
  }

  fn is_closed(&self) -> bool { self.is_stopped() || self.observer.is_closed() }
}

impl<T> Disposable for AutoDetachObserver<T> {
  fn dispose(&self) {
    self.stopped.store(true, Ordering::Release);
    self.upstream.dispose();
  }

  fn is_disposed(&self) -> bool { self.upstream.is_disposed() }
}
