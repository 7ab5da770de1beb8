use std::sync::Mutex;

use super::Recorded;
use crate::{error::RxError, observer::Observer, rc::lock, scheduler::TestScheduler};

/// Records every notification together with the virtual tick it arrived at.
pub struct MockObserver<T> {
  scheduler: TestScheduler,
  messages: Mutex<Vec<Recorded<T>>>,
}

impl<T> MockObserver<T> {
  pub fn new(scheduler: TestScheduler) -> Self { Self { scheduler, messages: Mutex::new(vec![]) } }

  fn record(&self, message: impl FnOnce(f64) -> Recorded<T>) {
    let time = self.scheduler.clock();
    lock(&self.messages).push(message(time));
  }
}

impl<T: Clone> MockObserver<T> {
  pub fn messages(&self) -> Vec<Recorded<T>> { lock(&self.messages).clone() }
}

impl<T: Send> Observer<T> for MockObserver<T> {
  fn on_next(&self, value: T) { self.record(|t| Recorded::next(t, value)) }

  fn on_error(&self, err: RxError) { self.record(|t| Recorded::error(t, err)) }

  fn on_completed(&self) { self.record(Recorded::completed) }
}
