use crate::{
  disposable::BoxedDisposable,
  observable::{Observable, Value},
  observer::BoxedObserver,
  scheduler::SchedulerRef,
};

/// Creates an observable from a subscribe function.
///
/// ```
/// use rxflow::prelude::*;
///
/// let source = create(|observer, _scheduler| {
///   observer.on_next(1);
///   observer.on_completed();
///   BoxedDisposable::empty()
/// });
/// source.subscribe(|v: i32| println!("{v}"));
/// ```
pub fn create<T, F>(subscribe: F) -> Observable<T>
where
  T: Value,
  F: Fn(BoxedObserver<T>, Option<SchedulerRef>) -> BoxedDisposable + Send + Sync + 'static,
{
  Observable::new(subscribe)
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::disposable::Disposable;

  #[test]
  fn runs_per_subscription() {
    let runs = Arc::new(Mutex::new(0));
    let c_runs = runs.clone();
    let source = create(move |observer, _| {
      *c_runs.lock().unwrap() += 1;
      observer.on_next(1);
      observer.on_completed();
      BoxedDisposable::empty()
    });
    source.subscribe(|_: i32| {});
    source.subscribe(|_: i32| {});
    assert_eq!(*runs.lock().unwrap(), 2);
  }

  #[test]
  fn teardown_runs_on_dispose() {
    let torn_down = Arc::new(Mutex::new(false));
    let c_torn = torn_down.clone();
    let source = create(move |_: BoxedObserver<i32>, _| {
      let c_torn = c_torn.clone();
      BoxedDisposable::from_fn(move || *c_torn.lock().unwrap() = true)
    });
    let subscription = source.subscribe(|_| {});
    assert!(!*torn_down.lock().unwrap());
    subscription.dispose();
    assert!(*torn_down.lock().unwrap());
  }

  #[test]
  fn teardown_runs_on_completion() {
    let torn_down = Arc::new(Mutex::new(false));
    let c_torn = torn_down.clone();
    let source = create(move |observer: BoxedObserver<i32>, _| {
      observer.on_completed();
      let c_torn = c_torn.clone();
      BoxedDisposable::from_fn(move || *c_torn.lock().unwrap() = true)
    });
    source.subscribe(|_| {});
    assert!(*torn_down.lock().unwrap());
  }
}
