use std::time::Duration;

use crate::{
  observable::Observable,
  scheduler::{resolve, SchedulerExt, SchedulerRef},
};

/// Emits `0` after `delay`, then completes.
///
/// Runs on `scheduler`, else on the subscribe-time scheduler, else on a
/// new thread.
pub fn timer(delay: Duration, scheduler: Option<SchedulerRef>) -> Observable<usize> {
  Observable::new(move |observer, sub_scheduler| {
    resolve(&scheduler, sub_scheduler).schedule_relative_fn(delay, move || {
      observer.on_next(0);
      observer.on_completed();
    })
  })
}

/// Emits `0, 1, 2, …` every `period`, starting one period after subscribe.
pub fn interval(period: Duration, scheduler: Option<SchedulerRef>) -> Observable<usize> {
  Observable::new(move |observer, sub_scheduler| {
    resolve(&scheduler, sub_scheduler).schedule_periodic_with_state(period, 0, move |n| {
      observer.on_next(n);
      n + 1
    })
  })
}
