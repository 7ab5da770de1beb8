//! Time and execution-context abstraction.
//!
//! A scheduler runs [`Action`]s now, after a delay, at an absolute time, or
//! periodically. Absolute times are [`Duration`]s measured from the
//! scheduler's own epoch: the start of virtual time for
//! [`VirtualTimeScheduler`], the unix epoch for wall-clock schedulers.
//!
//! Every `schedule*` call returns a [`BoxedDisposable`] cancelling the
//! pending work. If the action itself returns a disposable, disposing the
//! handle disposes that one too.

use std::{
  sync::{Arc, Mutex},
  time::{Duration, SystemTime, UNIX_EPOCH},
};

use tracing::warn;

use crate::{
  disposable::{BoxedDisposable, Disposable, SerialDisposable, SingleAssignmentDisposable},
  rc::lock,
};

mod immediate_scheduler;
mod test_scheduler;
mod thread_scheduler;
mod virtual_time_scheduler;

#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use immediate_scheduler::ImmediateScheduler;
pub use test_scheduler::{from_ticks, to_ticks, StartTimes, TestScheduler};
pub use thread_scheduler::NewThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;
pub use virtual_time_scheduler::{VirtualTimeScheduler, TICK};

/// Work handed to a scheduler. It receives the scheduler running it, so it
/// can schedule follow-up work on the same clock.
pub type Action = Box<dyn FnOnce(&dyn Scheduler) -> Option<BoxedDisposable> + Send>;

/// Work re-invoked every period.
pub type PeriodicAction = Box<dyn FnMut() + Send>;

pub trait Scheduler: Send + Sync {
  fn now(&self) -> Duration;

  fn schedule(&self, action: Action) -> BoxedDisposable {
    self.schedule_relative(Duration::ZERO, action)
  }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable;

  fn schedule_absolute(&self, due: Duration, action: Action) -> BoxedDisposable {
    self.schedule_relative(due.saturating_sub(self.now()), action)
  }

  fn schedule_periodic(&self, period: Duration, action: PeriodicAction) -> BoxedDisposable;
}

pub type SchedulerRef = Arc<dyn Scheduler>;

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  fn now(&self) -> Duration { (**self).now() }

  fn schedule(&self, action: Action) -> BoxedDisposable { (**self).schedule(action) }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    (**self).schedule_relative(delay, action)
  }

  fn schedule_absolute(&self, due: Duration, action: Action) -> BoxedDisposable {
    (**self).schedule_absolute(due, action)
  }

  fn schedule_periodic(&self, period: Duration, action: PeriodicAction) -> BoxedDisposable {
    (**self).schedule_periodic(period, action)
  }
}

/// Closure-friendly helpers available on every scheduler.
pub trait SchedulerExt: Scheduler {
  fn schedule_fn(&self, f: impl FnOnce() + Send + 'static) -> BoxedDisposable {
    self.schedule(Box::new(move |_| {
      f();
      None
    }))
  }

  fn schedule_relative_fn(
    &self,
    delay: Duration,
    f: impl FnOnce() + Send + 'static,
  ) -> BoxedDisposable {
    self.schedule_relative(
      delay,
      Box::new(move |_| {
        f();
        None
      }),
    )
  }

  fn schedule_absolute_fn(&self, due: Duration, f: impl FnOnce() + Send + 'static) -> BoxedDisposable {
    self.schedule_absolute(
      due,
      Box::new(move |_| {
        f();
        None
      }),
    )
  }

  /// Calls `f` every `period`, feeding each call the state the previous one
  /// returned.
  fn schedule_periodic_with_state<S: Send + 'static>(
    &self,
    period: Duration,
    state: S,
    mut f: impl FnMut(S) -> S + Send + 'static,
  ) -> BoxedDisposable {
    let mut state = Some(state);
    self.schedule_periodic(
      period,
      Box::new(move || {
        if let Some(s) = state.take() {
          state = Some(f(s));
        }
      }),
    )
  }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}

/// Picks the operator's own scheduler, else the subscribe-time one, else a
/// [`NewThreadScheduler`].
pub(crate) fn resolve(explicit: &Option<SchedulerRef>, subscribed: Option<SchedulerRef>) -> SchedulerRef {
  explicit
    .clone()
    .or(subscribed)
    .unwrap_or_else(|| Arc::new(NewThreadScheduler))
}

/// Wall-clock time since the unix epoch.
pub(crate) fn wall_clock() -> Duration {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
}

/// Runs `action` unless `slot` was disposed, binding whatever disposable the
/// action returns into `slot`.
pub(crate) fn invoke_action(action: Action, scheduler: &dyn Scheduler, slot: &SingleAssignmentDisposable) {
  if slot.is_disposed() {
    return;
  }
  if let Some(d) = action(scheduler) {
    if let Err(err) = slot.set(d) {
      warn!(error = %err, "scheduled action returned a disposable for a reused slot");
    }
  }
}

// ==================== Periodic by recursion ====================

struct Recurring {
  period: Duration,
  action: Mutex<PeriodicAction>,
  pending: SerialDisposable,
}

impl Disposable for Recurring {
  fn dispose(&self) { self.pending.dispose() }

  fn is_disposed(&self) -> bool { self.pending.is_disposed() }
}

fn arm(scheduler: &dyn Scheduler, run: Arc<Recurring>) {
  let c_run = run.clone();
  let handle = scheduler.schedule_relative(
    run.period,
    Box::new(move |scheduler| {
      if !c_run.is_disposed() {
        {
          let mut action = lock(&c_run.action);
          (*action)();
        }
        arm(scheduler, c_run);
      }
      None
    }),
  );
  run.pending.set(handle);
}

/// Periodic scheduling built from repeated relative scheduling. Suitable
/// for schedulers whose actions run on a single logical thread.
pub(crate) fn schedule_periodic_recursive(
  scheduler: &dyn Scheduler,
  period: Duration,
  action: PeriodicAction,
) -> BoxedDisposable {
  let run = Arc::new(Recurring {
    period,
    action: Mutex::new(action),
    pending: SerialDisposable::new(),
  });
  arm(scheduler, run.clone());
  BoxedDisposable::from(run)
}
