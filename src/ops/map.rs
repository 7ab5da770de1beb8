//! Map operator implementation

use std::sync::Arc;

use crate::{
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

type Project<T, U> = Arc<dyn Fn(T) -> Result<U> + Send + Sync>;

pub struct MapObserver<T, U> {
  observer: BoxedObserver<U>,
  project: Project<T, U>,
}

impl<T, U> Observer<T> for MapObserver<T, U> {
  fn on_next(&self, value: T) {
    match (self.project)(value) {
      Ok(v) => self.observer.on_next(v),
      Err(e) => self.observer.on_error(e),
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Transforms every value with `f`.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// of(vec![1, 2, 3]).map(|v| v * 2).subscribe(|v| println!("{v}"));
  /// ```
  pub fn map<U: Value>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Observable<U> {
    self.try_map(move |v| Ok(f(v)))
  }

  /// Like [`map`](Observable::map); an `Err` from `f` terminates the stream
  /// with that error.
  pub fn try_map<U: Value>(
    self,
    f: impl Fn(T) -> Result<U> + Send + Sync + 'static,
  ) -> Observable<U> {
    let project: Project<T, U> = Arc::new(f);
    Observable::new(move |observer, scheduler| {
      let project = project.clone();
      self.subscribe_with(MapObserver { observer, project }, scheduler)
    })
  }
}
