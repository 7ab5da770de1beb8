use std::sync::Arc;

use crate::{
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool> + Send + Sync>;

pub struct FilterObserver<T> {
  observer: BoxedObserver<T>,
  predicate: Predicate<T>,
}

impl<T> Observer<T> for FilterObserver<T> {
  fn on_next(&self, value: T) {
    match (self.predicate)(&value) {
      Ok(true) => self.observer.on_next(value),
      Ok(false) => {}
      Err(e) => self.observer.on_error(e),
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Forwards only the values satisfying `predicate`.
  pub fn filter(self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Observable<T> {
    self.try_filter(move |v| Ok(predicate(v)))
  }

  /// Like [`filter`](Observable::filter); an `Err` from `predicate` ends the
  /// stream with that error.
  pub fn try_filter(
    self,
    predicate: impl Fn(&T) -> Result<bool> + Send + Sync + 'static,
  ) -> Observable<T> {
    let predicate: Predicate<T> = Arc::new(predicate);
    Observable::new(move |observer, scheduler| {
      let predicate = predicate.clone();
      self.subscribe_with(FilterObserver { observer, predicate }, scheduler)
    })
  }
}
