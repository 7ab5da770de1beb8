use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct IgnoreElementsObserver<T> {
  observer: BoxedObserver<T>,
}

impl<T> Observer<T> for IgnoreElementsObserver<T> {
  fn on_next(&self, _: T) {}

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Drops every value and forwards only the terminal notification.
  pub fn ignore_elements(self) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(IgnoreElementsObserver { observer }, scheduler)
    })
  }
}
