//! Virtual-time scheduler measured in ticks, with the subscribe/dispose
//! lifecycle used by recorded-notification tests.
//!
//! One tick is one virtual millisecond. Tick values are `f64` so marble
//! diagrams with fractional timespans map onto the same clock.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use tracing::debug;

use super::{Action, PeriodicAction, Scheduler, SchedulerExt, VirtualTimeScheduler};
use crate::{
  disposable::{BoxedDisposable, Disposable},
  error::{Result, RxError},
  observable::{Observable, Value},
  rc::lock,
  testing::{ColdObservable, HotObservable, MockObserver, ReactiveTest, Recorded},
};

/// Converts a tick count into virtual time. Negative ticks saturate to zero.
pub fn from_ticks(ticks: f64) -> Duration {
  if ticks.is_finite() && ticks > 0. {
    Duration::from_nanos((ticks * 1e6).round() as u64)
  } else {
    Duration::ZERO
  }
}

pub fn to_ticks(time: Duration) -> f64 { time.as_nanos() as f64 / 1e6 }

/// When [`TestScheduler::start_with`] creates, subscribes to, and disposes
/// the observable under test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartTimes {
  pub created: f64,
  pub subscribed: f64,
  pub disposed: f64,
}

impl Default for StartTimes {
  fn default() -> Self {
    Self {
      created: ReactiveTest::CREATED,
      subscribed: ReactiveTest::SUBSCRIBED,
      disposed: ReactiveTest::DISPOSED,
    }
  }
}

impl StartTimes {
  pub fn created(mut self, ticks: f64) -> Self {
    self.created = ticks;
    self
  }

  pub fn subscribed(mut self, ticks: f64) -> Self {
    self.subscribed = ticks;
    self
  }

  pub fn disposed(mut self, ticks: f64) -> Self {
    self.disposed = ticks;
    self
  }
}

#[derive(Clone, Default)]
pub struct TestScheduler {
  inner: VirtualTimeScheduler,
}

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Current virtual time in ticks.
  pub fn clock(&self) -> f64 { to_ticks(self.inner.clock()) }

  /// The underlying virtual clock.
  pub fn virtual_time(&self) -> &VirtualTimeScheduler { &self.inner }

  /// Runs queued work until the queue is empty or [`stop`] is called.
  ///
  /// [`stop`]: TestScheduler::stop
  pub fn run(&self) { self.inner.start() }

  pub fn stop(&self) { self.inner.stop() }

  pub fn advance_to(&self, ticks: f64) -> Result<()> {
    if ticks < 0. {
      return Err(RxError::out_of_range(format!("negative virtual time {ticks}")));
    }
    self.inner.advance_to(from_ticks(ticks))
  }

  pub fn advance_by(&self, ticks: f64) -> Result<()> {
    if ticks < 0. {
      return Err(RxError::out_of_range(format!("cannot advance by {ticks} ticks")));
    }
    self.inner.advance_by(from_ticks(ticks))
  }

  /// Moves the clock forward by `ticks` without running anything.
  pub fn sleep(&self, ticks: f64) -> Result<()> {
    if ticks < 0. {
      return Err(RxError::out_of_range(format!("cannot sleep {ticks} ticks")));
    }
    self.inner.sleep(from_ticks(ticks));
    Ok(())
  }

  /// Runs `f` at the absolute tick `ticks`.
  pub fn schedule_at(&self, ticks: f64, f: impl FnOnce() + Send + 'static) -> BoxedDisposable {
    self.schedule_absolute_fn(from_ticks(ticks), f)
  }

  pub fn create_observer<T: Send + 'static>(&self) -> Arc<MockObserver<T>> {
    Arc::new(MockObserver::new(self.clone()))
  }

  pub fn create_cold_observable<T: Value>(&self, messages: Vec<Recorded<T>>) -> ColdObservable<T> {
    ColdObservable::new(self.clone(), messages)
  }

  pub fn create_hot_observable<T: Value>(&self, messages: Vec<Recorded<T>>) -> HotObservable<T> {
    HotObservable::new(self.clone(), messages)
  }

  /// Runs `create` with the default [`StartTimes`] and returns the observer
  /// that recorded the output.
  pub fn start<T: Value>(
    &self,
    create: impl FnOnce() -> Observable<T> + Send + 'static,
  ) -> Arc<MockObserver<T>> {
    self.start_with(create, StartTimes::default())
  }

  /// Creates the observable at `times.created`, subscribes at
  /// `times.subscribed` with this scheduler as the subscribe-time scheduler,
  /// disposes at `times.disposed`, and runs the clock to completion.
  pub fn start_with<T: Value>(
    &self,
    create: impl FnOnce() -> Observable<T> + Send + 'static,
    times: StartTimes,
  ) -> Arc<MockObserver<T>> {
    let observer = self.create_observer::<T>();
    let source: Arc<Mutex<Option<Observable<T>>>> = Arc::new(Mutex::new(None));
    let subscription: Arc<Mutex<Option<BoxedDisposable>>> = Arc::new(Mutex::new(None));

    let c_source = source.clone();
    self.schedule_at(times.created, move || {
      debug!("test observable created");
      *lock(&c_source) = Some(create());
    });

    let c_subscription = subscription.clone();
    let c_observer = observer.clone();
    let scheduler = self.clone();
    self.schedule_at(times.subscribed, move || {
      let Some(source) = lock(&source).take() else { return };
      debug!("test observable subscribed");
      let d = source.subscribe_with(c_observer, Some(Arc::new(scheduler)));
      *lock(&c_subscription) = Some(d);
    });

    self.schedule_at(times.disposed, move || {
      debug!("test subscription disposed");
      if let Some(d) = lock(&subscription).take() {
        d.dispose();
      }
    });

    self.run();
    observer
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { self.inner.now() }

  fn schedule(&self, action: Action) -> BoxedDisposable { self.inner.schedule(action) }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    self.inner.schedule_relative(delay, action)
  }

  fn schedule_absolute(&self, due: Duration, action: Action) -> BoxedDisposable {
    self.inner.schedule_absolute(due, action)
  }

  fn schedule_periodic(&self, period: Duration, action: PeriodicAction) -> BoxedDisposable {
    self.inner.schedule_periodic(period, action)
  }
}
