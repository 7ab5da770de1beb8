use std::{
  sync::{Arc, Condvar, Mutex},
  thread,
  time::{Duration, Instant},
};

use super::{invoke_action, wall_clock, Action, PeriodicAction, Scheduler};
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  rc::lock,
};

/// Creates a new thread for each unit of work.
///
/// This is the default scheduler of the time-based operators when neither
/// the operator nor the subscriber names one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewThreadScheduler;

/// Wakes a sleeping worker thread when its work is cancelled.
#[derive(Default)]
struct CancelToken {
  cancelled: Mutex<bool>,
  wake: Condvar,
}

impl CancelToken {
  /// Sleeps for `delay`; returns `true` if cancelled meanwhile.
  fn wait(&self, delay: Duration) -> bool {
    let deadline = Instant::now() + delay;
    let mut cancelled = lock(&self.cancelled);
    while !*cancelled {
      let now = Instant::now();
      if now >= deadline {
        return false;
      }
      cancelled = match self.wake.wait_timeout(cancelled, deadline - now) {
        Ok((guard, _)) => guard,
        Err(poisoned) => poisoned.into_inner().0,
      };
    }
    true
  }
}

struct ThreadTask {
  token: CancelToken,
  slot: SingleAssignmentDisposable,
}

impl Disposable for ThreadTask {
  fn dispose(&self) {
    *lock(&self.token.cancelled) = true;
    self.token.wake.notify_all();
    self.slot.dispose();
  }

  fn is_disposed(&self) -> bool { self.slot.is_disposed() }
}

impl Scheduler for NewThreadScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    let task = Arc::new(ThreadTask {
      token: CancelToken::default(),
      slot: SingleAssignmentDisposable::new(),
    });
    let c_task = task.clone();
    thread::spawn(move || {
      if !c_task.token.wait(delay) {
        invoke_action(action, &NewThreadScheduler, &c_task.slot);
      }
    });
    BoxedDisposable::from(task)
  }

  fn schedule_periodic(&self, period: Duration, mut action: PeriodicAction) -> BoxedDisposable {
    let task = Arc::new(ThreadTask {
      token: CancelToken::default(),
      slot: SingleAssignmentDisposable::new(),
    });
    let c_task = task.clone();
    thread::spawn(move || {
      while !c_task.token.wait(period) {
        action();
      }
    });
    BoxedDisposable::from(task)
  }
}
