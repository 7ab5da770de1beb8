use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use tracing::warn;

use super::{ReactiveTest, Recorded, RecordedValue};
use crate::{
  error::Result,
  marbles::{self, MarbleOptions, MarbleValue},
  observable::{Observable, Value},
  scheduler::{SchedulerRef, TestScheduler},
};

/// Marble-driven test bench sharing one [`TestScheduler`].
///
/// `cold` and `hot` build sources, `start` runs the observable under test
/// with the default [`StartTimes`](crate::scheduler::StartTimes), and
/// `exp` turns the expected diagram into recorded messages on the same
/// time base, frame zero being the subscription tick.
pub struct MarblesContext {
  scheduler: TestScheduler,
  timespan: f64,
  started: AtomicBool,
}

/// A fresh context whose diagram frames last `timespan` ticks.
///
/// ```
/// use rxflow::{prelude::*, testing::test_context};
///
/// let ctx = test_context(1.);
/// let source = ctx.cold("-a-(b,1)|").unwrap();
/// let actual = ctx.start(move || source.take(2));
/// assert_eq!(actual, ctx.exp("-a-(b|)").unwrap());
/// ```
pub fn test_context(timespan: f64) -> MarblesContext {
  MarblesContext { scheduler: TestScheduler::new(), timespan, started: AtomicBool::new(false) }
}

impl MarblesContext {
  pub fn scheduler(&self) -> &TestScheduler { &self.scheduler }

  /// Options carrying this context's timespan.
  pub fn options(&self) -> MarbleOptions { MarbleOptions::default().timespan(self.timespan) }

  /// Runs the scheduler with `create` as the observable under test and
  /// returns what it emitted between subscription and disposal.
  pub fn start<T: Value>(&self, create: impl FnOnce() -> Observable<T> + Send + 'static) -> Vec<Recorded<T>> {
    if self.started.swap(true, Ordering::SeqCst) {
      warn!("test context started twice, the clock does not rewind");
    }
    self.scheduler.start(create).messages()
  }

  /// Like [`start`](MarblesContext::start) for an observable built up
  /// front.
  pub fn start_observable<T: Value>(&self, source: Observable<T>) -> Vec<Recorded<T>> {
    self.start(move || source)
  }

  pub fn cold(&self, diagram: &str) -> Result<Observable<MarbleValue>> {
    self.cold_with(diagram, self.options())
  }

  pub fn cold_with(&self, diagram: &str, options: MarbleOptions) -> Result<Observable<MarbleValue>> {
    marbles::from_marbles(diagram, options, None)
  }

  /// A hot source whose frame zero is the subscription tick.
  pub fn hot(&self, diagram: &str) -> Result<Observable<MarbleValue>> {
    self.hot_with(diagram, self.options())
  }

  pub fn hot_with(&self, diagram: &str, options: MarbleOptions) -> Result<Observable<MarbleValue>> {
    let scheduler: SchedulerRef = Arc::new(self.scheduler.clone());
    marbles::hot(diagram, options, ReactiveTest::SUBSCRIBED, scheduler)
  }

  pub fn exp(&self, diagram: &str) -> Result<Vec<Recorded<MarbleValue>>> {
    self.exp_with(diagram, self.options())
  }

  pub fn exp_with(&self, diagram: &str, options: MarbleOptions) -> Result<Vec<Recorded<MarbleValue>>> {
    let options = options.time_shift(ReactiveTest::SUBSCRIBED);
    Ok(
      marbles::parse(diagram, &options)?
        .into_iter()
        .filter(|(time, _)| time.is_finite())
        .map(|(time, n)| Recorded::new(time, RecordedValue::Notification(n)))
        .collect(),
    )
  }
}
