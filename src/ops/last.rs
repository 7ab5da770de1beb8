use std::sync::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

pub struct LastObserver<T> {
  observer: BoxedObserver<T>,
  last: Mutex<Option<T>>,
  default: Option<T>,
}

impl<T: Value> Observer<T> for LastObserver<T> {
  fn on_next(&self, value: T) { *lock(&self.last) = Some(value); }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    let last = lock(&self.last).take().or_else(|| self.default.clone());
    match last {
      Some(v) => {
        self.observer.on_next(v);
        self.observer.on_completed();
      }
      None => self.observer.on_error(RxError::SequenceContainsNoElements),
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits the final value once the source completes. An empty source
  /// fails with [`RxError::SequenceContainsNoElements`].
  pub fn last(self) -> Observable<T> { self.last_with(None) }

  /// Like [`last`](Observable::last), emitting `default` for an empty
  /// source.
  pub fn last_or_default(self, default: T) -> Observable<T> { self.last_with(Some(default)) }

  fn last_with(self, default: Option<T>) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        LastObserver {
          observer,
          last: Mutex::new(None),
          default: default.clone(),
        },
        scheduler,
      )
    })
  }
}
