use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct DefaultIfEmptyObserver<T> {
  observer: BoxedObserver<T>,
  default: T,
  found: AtomicBool,
}

impl<T: Value> Observer<T> for DefaultIfEmptyObserver<T> {
  fn on_next(&self, value: T) {
    self.found.store(true, Ordering::Release);
    self.observer.on_next(value);
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    if !self.found.load(Ordering::Acquire) {
      self.observer.on_next(self.default.clone());
    }
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits `default` if the source completes without any value.
  pub fn default_if_empty(self, default: T) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        DefaultIfEmptyObserver {
          observer,
          default: default.clone(),
          found: AtomicBool::new(false),
        },
        scheduler,
      )
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn empty_source_gets_default() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| empty().default_if_empty(7));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 7), RT::on_completed(200.)]
    );
  }

  #[test]
  fn non_empty_untouched() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| of(vec![1]).default_if_empty(7));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 1), RT::on_completed(200.)]
    );
  }

  #[test]
  fn error_not_replaced() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| throw(RxError::user("e")).default_if_empty(7));
    assert_eq!(observer.messages(), vec![RT::on_error(200., RxError::user("e"))]);
  }
}
