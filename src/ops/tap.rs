use std::sync::Arc;

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct TapObserver<T> {
  observer: BoxedObserver<T>,
  tap: Arc<dyn Fn(&T) + Send + Sync>,
}

impl<T> Observer<T> for TapObserver<T> {
  fn on_next(&self, value: T) {
    (self.tap)(&value);
    self.observer.on_next(value);
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Runs `f` on every value before forwarding it unchanged.
  pub fn tap(self, f: impl Fn(&T) + Send + Sync + 'static) -> Observable<T> {
    let tap: Arc<dyn Fn(&T) + Send + Sync> = Arc::new(f);
    Observable::new(move |observer, scheduler| {
      let tap = tap.clone();
      self.subscribe_with(TapObserver { observer, tap }, scheduler)
    })
  }
}
