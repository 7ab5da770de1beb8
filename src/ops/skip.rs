//! Skip operator implementation
//!
//! Ignores the first `count` values emitted by the source, then emits the
//! rest.

use std::sync::Mutex;

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

pub struct SkipObserver<T> {
  observer: BoxedObserver<T>,
  remaining: Mutex<usize>,
}

impl<T> Observer<T> for SkipObserver<T> {
  fn on_next(&self, value: T) {
    {
      let mut remaining = lock(&self.remaining);
      if *remaining > 0 {
        *remaining -= 1;
        return;
      }
    }
    self.observer.on_next(value);
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Drops the first `count` values.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// from_iter(1..=5).skip(2).subscribe(|v| println!("{v}"));
  /// // 3, 4, 5
  /// ```
  pub fn skip(self, count: usize) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(
        SkipObserver { observer, remaining: Mutex::new(count) },
        scheduler,
      )
    })
  }
}

#[cfg(test)]
mod test {
  use std::sync::Mutex;

  use crate::prelude::*;

  fn collect(source: Observable<i32>) -> (Vec<i32>, bool) {
    let seen = Arc::new(Mutex::new(vec![]));
    let done = Arc::new(Mutex::new(false));
    let (c_seen, c_done) = (seen.clone(), done.clone());
    source.subscribe_all(
      move |v| c_seen.lock().unwrap().push(v),
      |_| {},
      move || *c_done.lock().unwrap() = true,
    );
    let result = (seen.lock().unwrap().clone(), *done.lock().unwrap());
    result
  }

  #[test]
  fn base_function() {
    assert_eq!(collect(from_iter(0..10).skip(5)), ((5..10).collect(), true));
  }

  #[test]
  fn more_than_emitted() {
    assert_eq!(collect(from_iter(0..3).skip(5)), (vec![], true));
  }

  #[test]
  fn zero_is_identity() {
    assert_eq!(collect(of(vec![1, 2]).skip(0)), (vec![1, 2], true));
  }

  #[test]
  fn independent_per_subscription() {
    let source = from_iter(0..4).skip(2);
    assert_eq!(collect(source.clone()), (vec![2, 3], true));
    assert_eq!(collect(source), (vec![2, 3], true));
  }
}
