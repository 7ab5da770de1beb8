use std::{sync::Arc, thread, time::Duration};

use super::{
  invoke_action, wall_clock, Action, NewThreadScheduler, PeriodicAction, Scheduler,
};
use crate::disposable::{BoxedDisposable, SingleAssignmentDisposable};

/// Runs every action on the calling thread before `schedule*` returns.
///
/// Delayed work blocks the caller for the delay. Periodic work cannot run
/// inline and is handed to [`NewThreadScheduler`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    if !delay.is_zero() {
      thread::sleep(delay);
    }
    let slot = Arc::new(SingleAssignmentDisposable::new());
    invoke_action(action, self, &slot);
    BoxedDisposable::from(slot)
  }

  fn schedule_periodic(&self, period: Duration, action: PeriodicAction) -> BoxedDisposable {
    NewThreadScheduler.schedule_periodic(period, action)
  }
}
