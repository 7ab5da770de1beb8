//! The Scan operator applies an accumulator to every value of the source
//! and emits each intermediate result.
//!
//! The seedless forms use the first value as the initial accumulator and
//! emit it unchanged. The seeded forms start from a given seed, so their
//! first emission is `f(seed, x0)`.

use std::sync::{Arc, Mutex};

use crate::{
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

type Start<T, A> = Arc<dyn Fn(T) -> Result<A> + Send + Sync>;
type Step<T, A> = Arc<dyn Fn(A, T) -> Result<A> + Send + Sync>;

pub struct ScanObserver<T, A> {
  observer: BoxedObserver<A>,
  acc: Mutex<Option<A>>,
  start: Start<T, A>,
  step: Step<T, A>,
}

impl<T, A: Value> Observer<T> for ScanObserver<T, A> {
  fn on_next(&self, value: T) {
    let next = {
      let mut acc = lock(&self.acc);
      let next = match acc.take() {
        None => (self.start)(value),
        Some(a) => (self.step)(a, value),
      };
      if let Ok(v) = &next {
        *acc = Some(v.clone());
      }
      next
    };
    match next {
      Ok(v) => self.observer.on_next(v),
      Err(e) => self.observer.on_error(e),
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

fn scan_with<T: Value, A: Value>(
  source: Observable<T>,
  start: Start<T, A>,
  step: Step<T, A>,
) -> Observable<A> {
  Observable::new(move |observer, scheduler| {
    source.subscribe_with(
      ScanObserver {
        observer,
        acc: Mutex::new(None),
        start: start.clone(),
        step: step.clone(),
      },
      scheduler,
    )
  })
}

impl<T: Value> Observable<T> {
  /// Running accumulation seeded by the first value.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// from_iter(1..=4).scan(|acc, v| acc + v).subscribe(|v| println!("{v}"));
  /// // 1, 3, 6, 10
  /// ```
  pub fn scan(self, f: impl Fn(T, T) -> T + Send + Sync + 'static) -> Observable<T> {
    self.try_scan(move |acc, v| Ok(f(acc, v)))
  }

  /// Running accumulation starting from `seed`.
  pub fn scan_seed<A: Value>(
    self,
    seed: A,
    f: impl Fn(A, T) -> A + Send + Sync + 'static,
  ) -> Observable<A> {
    self.try_scan_seed(seed, move |acc, v| Ok(f(acc, v)))
  }

  /// Seedless scan whose accumulator may fail; a failure terminates the
  /// stream with that error.
  pub fn try_scan(self, f: impl Fn(T, T) -> Result<T> + Send + Sync + 'static) -> Observable<T> {
    scan_with(self, Arc::new(Ok), Arc::new(f))
  }

  pub fn try_scan_seed<A: Value>(
    self,
    seed: A,
    f: impl Fn(A, T) -> Result<A> + Send + Sync + 'static,
  ) -> Observable<A> {
    let step: Step<T, A> = Arc::new(f);
    let c_step = step.clone();
    let start: Start<T, A> = Arc::new(move |v| c_step(seed.clone(), v));
    scan_with(self, start, step)
  }
}
