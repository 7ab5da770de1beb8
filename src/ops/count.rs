use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct CountObserver {
  observer: BoxedObserver<usize>,
  count: AtomicUsize,
}

impl<T> Observer<T> for CountObserver {
  fn on_next(&self, _: T) { self.count.fetch_add(1, Ordering::Relaxed); }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    self.observer.on_next(self.count.load(Ordering::Relaxed));
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits how many values the source produced, once it completes.
  pub fn count(self) -> Observable<usize> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        CountObserver { observer, count: AtomicUsize::new(0) },
        scheduler,
      )
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn counts() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| from_iter(0..4).count());
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 4), RT::on_completed(200.)]
    );
  }
}
