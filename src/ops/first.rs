use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct FirstObserver<T> {
  observer: BoxedObserver<T>,
  done: AtomicBool,
}

impl<T> Observer<T> for FirstObserver<T> {
  fn on_next(&self, value: T) {
    if !self.done.swap(true, Ordering::AcqRel) {
      self.observer.on_next(value);
      self.observer.on_completed();
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    if !self.done.load(Ordering::Acquire) {
      self.observer.on_error(RxError::SequenceContainsNoElements);
    }
  }

  fn is_closed(&self) -> bool { self.done.load(Ordering::Acquire) || self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits the first value and completes. An empty source fails with
  /// [`RxError::SequenceContainsNoElements`].
  pub fn first(self) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        FirstObserver { observer, done: AtomicBool::new(false) },
        scheduler,
      )
    })
  }
}
