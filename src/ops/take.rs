//! Take operator implementation
//!
//! Emits only the first `count` values, then completes and releases the
//! source.

use std::sync::Mutex;

use crate::{
  error::RxError,
  observable::{empty, Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

pub struct TakeObserver<T> {
  observer: BoxedObserver<T>,
  count: usize,
  taken: Mutex<usize>,
}

impl<T> Observer<T> for TakeObserver<T> {
  fn on_next(&self, value: T) {
    let last = {
      let mut taken = lock(&self.taken);
      if *taken >= self.count {
        return;
      }
      *taken += 1;
      *taken == self.count
    };
    self.observer.on_next(value);
    if last {
      self.observer.on_completed();
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { *lock(&self.taken) >= self.count || self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits the first `count` values and completes. `take(0)` is
  /// [`empty`].
  pub fn take(self, count: usize) -> Observable<T> {
    if count == 0 {
      return empty();
    }
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        TakeObserver { observer, count, taken: Mutex::new(0) },
        scheduler,
      )
    })
  }
}
