//! Virtual-time test harness: recorded notifications, a recording observer,
//! scripted cold and hot sources, and the marble-diagram test context.
//!
//! ```
//! use rxflow::{prelude::*, testing::ReactiveTest as RT};
//!
//! let scheduler = TestScheduler::new();
//! let xs = scheduler.create_hot_observable(vec![
//!   RT::on_next(150., 1),
//!   RT::on_next(210., 2),
//!   RT::on_completed(250.),
//! ]);
//! let observer = scheduler.start(move || xs.observable().map(|v| v * 10));
//! assert_eq!(observer.messages(), vec![RT::on_next(210., 20), RT::on_completed(250.)]);
//! ```

use crate::error::RxError;

mod cold_observable;
mod hot_observable;
mod marbles_context;
mod mock_observer;
mod recorded;

pub use cold_observable::ColdObservable;
pub use hot_observable::HotObservable;
pub use marbles_context::{test_context, MarblesContext};
pub use mock_observer::MockObserver;
pub use recorded::{Recorded, RecordedValue, Subscription};

/// Constructors for expected messages, and the default lifecycle ticks of
/// [`TestScheduler::start`](crate::scheduler::TestScheduler::start).
pub struct ReactiveTest;

impl ReactiveTest {
  pub const CREATED: f64 = 100.;
  pub const SUBSCRIBED: f64 = 200.;
  pub const DISPOSED: f64 = 1000.;

  pub fn on_next<T>(time: f64, value: T) -> Recorded<T> { Recorded::next(time, value) }

  /// Matches any value accepted by `predicate` at `time`.
  pub fn on_next_where<T>(time: f64, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Recorded<T> {
    Recorded::new(time, RecordedValue::NextWhere(std::sync::Arc::new(predicate)))
  }

  pub fn on_error<T>(time: f64, err: RxError) -> Recorded<T> { Recorded::error(time, err) }

  pub fn on_error_where<T>(
    time: f64,
    predicate: impl Fn(&RxError) -> bool + Send + Sync + 'static,
  ) -> Recorded<T> {
    Recorded::new(time, RecordedValue::ErrorWhere(std::sync::Arc::new(predicate)))
  }

  pub fn on_completed<T>(time: f64) -> Recorded<T> { Recorded::completed(time) }

  pub fn subscribe(start: f64, end: f64) -> Subscription { Subscription::new(start, end) }
}
