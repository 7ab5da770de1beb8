use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, SerialDisposable},
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  scheduler::SchedulerRef,
};

type Handler<T> = Arc<dyn Fn(RxError) -> Observable<T> + Send + Sync>;

pub struct CatchErrorObserver<T> {
  observer: BoxedObserver<T>,
  handler: Handler<T>,
  scheduler: Option<SchedulerRef>,
  current: Arc<SerialDisposable>,
}

impl<T: Value> Observer<T> for CatchErrorObserver<T> {
  fn on_next(&self, value: T) { self.observer.on_next(value) }

  fn on_error(&self, err: RxError) {
    let fallback = (self.handler)(err);
    let subscription = fallback.subscribe_with(self.observer.clone(), self.scheduler.clone());
    self.current.set(subscription);
  }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Switches to the observable returned by `handler` when the source
  /// errors.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// throw::<i32>(RxError::user("boom"))
  ///   .catch_error(|_| of(vec![0]))
  ///   .subscribe(|v| println!("{v}"));
  /// ```
  pub fn catch_error(
    self,
    handler: impl Fn(RxError) -> Observable<T> + Send + Sync + 'static,
  ) -> Observable<T> {
    let handler: Handler<T> = Arc::new(handler);
    Observable::new(move |observer, scheduler| {
      let current = Arc::new(SerialDisposable::new());
      let subscription = self.subscribe_with(
        CatchErrorObserver {
          observer,
          handler: handler.clone(),
          scheduler: scheduler.clone(),
          current: current.clone(),
        },
        scheduler,
      );
      // The fallback may already be in place if the source failed synchronously.
      if current.get().is_none() {
        current.set(subscription);
      }
      BoxedDisposable::from(current)
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn switches_to_fallback() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 1),
      RT::on_error(230., RxError::user("boom")),
    ]);
    let ys = scheduler.create_cold_observable(vec![RT::on_next(10., 99), RT::on_completed(20.)]);
    let c_ys = ys.clone();
    let observer = scheduler.start(move || xs.observable().catch_error(move |_| c_ys.observable()));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(210., 1), RT::on_next(240., 99), RT::on_completed(250.)]
    );
    assert_eq!(ys.subscriptions(), vec![RT::subscribe(230., 250.)]);
  }

  #[test]
  fn handler_sees_the_error() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      throw::<String>(RxError::user("bad input")).catch_error(|e| just(e.to_string()))
    });
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., "bad input".to_string()), RT::on_completed(200.)]
    );
  }

  #[test]
  fn fallback_error_is_forwarded() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      throw::<i32>(RxError::user("first")).catch_error(|_| throw(RxError::user("second")))
    });
    assert_eq!(observer.messages(), vec![RT::on_error(200., RxError::user("second"))]);
  }

  #[test]
  fn completion_passes_through() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| of(vec![1, 2]).catch_error(|_| of(vec![0])));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 1), RT::on_next(200., 2), RT::on_completed(200.)]
    );
  }
}
