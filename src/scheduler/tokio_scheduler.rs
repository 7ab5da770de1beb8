use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, task::AbortHandle};

use super::{invoke_action, wall_clock, Action, PeriodicAction, Scheduler};
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  error::{Result, RxError},
};

/// Runs work as tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  pub fn new(handle: Handle) -> Self { Self { handle } }

  /// Binds to the runtime of the calling context.
  pub fn current() -> Result<Self> {
    Handle::try_current()
      .map(Self::new)
      .map_err(|e| RxError::InvalidState(e.to_string()))
  }
}

struct TokioTask {
  handle: AbortHandle,
  slot: Arc<SingleAssignmentDisposable>,
}

impl Disposable for TokioTask {
  fn dispose(&self) {
    self.handle.abort();
    self.slot.dispose();
  }

  fn is_disposed(&self) -> bool { self.slot.is_disposed() }
}

impl Scheduler for TokioScheduler {
  fn now(&self) -> Duration { wall_clock() }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    let slot = Arc::new(SingleAssignmentDisposable::new());
    let c_slot = slot.clone();
    let scheduler = self.clone();
    let task = self.handle.spawn(async move {
      if !delay.is_zero() {
        tokio::time::sleep(delay).await;
      }
      invoke_action(action, &scheduler, &c_slot);
    });
    BoxedDisposable::new(TokioTask { handle: task.abort_handle(), slot })
  }

  fn schedule_periodic(&self, period: Duration, mut action: PeriodicAction) -> BoxedDisposable {
    let task = self.handle.spawn(async move {
      let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
      loop {
        ticks.tick().await;
        action();
      }
    });
    BoxedDisposable::new(TokioTask { handle: task.abort_handle(), slot: Arc::default() })
  }
}
