//! Conversion between a stream and a stream of its notifications.

use crate::{
  error::RxError,
  notification::Notification,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
};

pub struct MaterializeObserver<T> {
  observer: BoxedObserver<Notification<T>>,
}

impl<T: Value> Observer<T> for MaterializeObserver<T> {
  fn on_next(&self, value: T) { self.observer.on_next(Notification::Next(value)) }

  fn on_error(&self, err: RxError) {
    self.observer.on_next(Notification::Error(err));
    self.observer.on_completed();
  }

  fn on_completed(&self) {
    self.observer.on_next(Notification::Completed);
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct DematerializeObserver<T> {
  observer: BoxedObserver<T>,
}

impl<T: Value> Observer<Notification<T>> for DematerializeObserver<T> {
  fn on_next(&self, value: Notification<T>) { value.accept(&*self.observer) }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) { self.observer.on_completed() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits every notification of the source as a value. The resulting
  /// stream never errors; it completes after forwarding the source's
  /// terminal.
  pub fn materialize(self) -> Observable<Notification<T>> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(MaterializeObserver { observer }, scheduler)
    })
  }
}

impl<T: Value> Observable<Notification<T>> {
  /// Replays materialized notifications as a regular stream.
  pub fn dematerialize(self) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      self.subscribe_with(DematerializeObserver { observer }, scheduler)
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn materialize_error() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 1),
      RT::on_error(220., RxError::user("boom")),
    ]);
    let observer = scheduler.start(move || xs.observable().materialize());
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(210., Notification::Next(1)),
        RT::on_next(220., Notification::Error(RxError::user("boom"))),
        RT::on_completed(220.)
      ]
    );
  }

  #[test]
  fn materialize_completion() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| just(7).materialize());
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(200., Notification::Next(7)),
        RT::on_next(200., Notification::Completed),
        RT::on_completed(200.)
      ]
    );
  }

  #[test]
  fn round_trip_is_identity() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 'a'),
      RT::on_next(230., 'b'),
      RT::on_completed(250.),
    ]);
    let observer = scheduler.start(move || xs.observable().materialize().dematerialize());
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(210., 'a'), RT::on_next(230., 'b'), RT::on_completed(250.)]
    );
  }

  #[test]
  fn dematerialize_stops_at_first_terminal() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      of(vec![
        Notification::Next(1),
        Notification::Error(RxError::user("x")),
        Notification::Next(2),
      ])
      .dematerialize()
    });
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 1), RT::on_error(200., RxError::user("x"))]
    );
  }
}
