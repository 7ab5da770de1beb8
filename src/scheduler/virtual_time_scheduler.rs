//! Deterministic scheduler driven by an explicit clock.
//!
//! Virtual time only moves when [`start`], [`advance_to`], [`advance_by`]
//! or [`sleep`] is called. Work due at the same time runs in the order it
//! was scheduled.
//!
//! [`start`]: VirtualTimeScheduler::start
//! [`advance_to`]: VirtualTimeScheduler::advance_to
//! [`advance_by`]: VirtualTimeScheduler::advance_by
//! [`sleep`]: VirtualTimeScheduler::sleep

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc, time::Duration};

use tracing::{debug, trace};

use super::{
  invoke_action, schedule_periodic_recursive, Action, PeriodicAction, Scheduler,
};
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  error::{Result, RxError},
  rc::MutArc,
};

/// Smallest step of virtual time. Work scheduled in the past runs one tick
/// after the current clock.
pub const TICK: Duration = Duration::from_millis(1);

// ==================== Internal State ====================

struct ScheduledItem {
  due: Duration,
  seq: u64,
  action: Action,
  slot: Arc<SingleAssignmentDisposable>,
}

impl PartialEq for ScheduledItem {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for ScheduledItem {}

impl PartialOrd for ScheduledItem {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledItem {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier due first, then FIFO by seq
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct State {
  clock: Duration,
  queue: BinaryHeap<ScheduledItem>,
  next_seq: u64,
  enabled: bool,
}

// ==================== VirtualTimeScheduler ====================

/// A cloneable handle on one virtual clock and its queue.
#[derive(Clone, Default)]
pub struct VirtualTimeScheduler {
  state: MutArc<State>,
}

impl VirtualTimeScheduler {
  pub fn new() -> Self { Self::default() }

  /// A scheduler whose clock starts at `clock`.
  pub fn with_clock(clock: Duration) -> Self {
    let scheduler = Self::default();
    scheduler.state.rc_deref_mut().clock = clock;
    scheduler
  }

  pub fn clock(&self) -> Duration { self.state.rc_deref_mut().clock }

  pub fn is_enabled(&self) -> bool { self.state.rc_deref_mut().enabled }

  /// Number of queued items, cancelled ones included.
  pub fn pending_count(&self) -> usize { self.state.rc_deref_mut().queue.len() }

  /// Runs queued work in due order until the queue is empty or [`stop`] is
  /// called. Work scheduled by running actions is picked up as well.
  ///
  /// [`stop`]: VirtualTimeScheduler::stop
  pub fn start(&self) {
    if !self.enable() {
      return;
    }
    debug!(clock = ?self.clock(), "virtual scheduler started");
    while let Some(item) = self.next_item(None) {
      self.run(item);
    }
    self.state.rc_deref_mut().enabled = false;
    debug!(clock = ?self.clock(), "virtual scheduler stopped");
  }

  /// Makes a running [`start`] return after the current action.
  ///
  /// [`start`]: VirtualTimeScheduler::start
  pub fn stop(&self) { self.state.rc_deref_mut().enabled = false; }

  /// Runs everything due at or before `time`, then sets the clock to it.
  pub fn advance_to(&self, time: Duration) -> Result<()> {
    let clock = self.clock();
    if time < clock {
      return Err(RxError::out_of_range(format!(
        "cannot move virtual time backwards from {clock:?} to {time:?}"
      )));
    }
    if time == clock || !self.enable() {
      return Ok(());
    }
    while let Some(item) = self.next_item(Some(time)) {
      self.run(item);
    }
    let mut state = self.state.rc_deref_mut();
    state.enabled = false;
    if state.clock < time {
      state.clock = time;
    }
    debug!(clock = ?state.clock, "virtual scheduler advanced");
    Ok(())
  }

  pub fn advance_by(&self, delta: Duration) -> Result<()> {
    self.advance_to(self.clock() + delta)
  }

  /// Moves the clock forward without running anything.
  pub fn sleep(&self, delta: Duration) { self.state.rc_deref_mut().clock += delta; }

  fn enable(&self) -> bool {
    let mut state = self.state.rc_deref_mut();
    if state.enabled {
      return false;
    }
    state.enabled = true;
    true
  }

  fn next_item(&self, until: Option<Duration>) -> Option<ScheduledItem> {
    let mut state = self.state.rc_deref_mut();
    if !state.enabled {
      return None;
    }
    if let (Some(until), Some(head)) = (until, state.queue.peek()) {
      if head.due > until {
        return None;
      }
    }
    let item = state.queue.pop()?;
    if item.due > state.clock {
      state.clock = item.due;
    }
    Some(item)
  }

  fn run(&self, item: ScheduledItem) {
    if item.slot.is_disposed() {
      trace!(due = ?item.due, seq = item.seq, "skipping cancelled item");
      return;
    }
    trace!(due = ?item.due, seq = item.seq, "running scheduled item");
    invoke_action(item.action, self, &item.slot);
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Duration { self.clock() }

  fn schedule(&self, action: Action) -> BoxedDisposable {
    let now = self.clock();
    self.schedule_absolute(now, action)
  }

  fn schedule_relative(&self, delay: Duration, action: Action) -> BoxedDisposable {
    let now = self.clock();
    self.schedule_absolute(now + delay, action)
  }

  fn schedule_absolute(&self, due: Duration, action: Action) -> BoxedDisposable {
    let slot = Arc::new(SingleAssignmentDisposable::new());
    let mut state = self.state.rc_deref_mut();
    let due = if due < state.clock { state.clock + TICK } else { due };
    let seq = state.next_seq;
    state.next_seq += 1;
    state.queue.push(ScheduledItem { due, seq, action, slot: slot.clone() });
    BoxedDisposable::from(slot)
  }

  fn schedule_periodic(&self, period: Duration, action: PeriodicAction) -> BoxedDisposable {
    schedule_periodic_recursive(self, period.max(TICK), action)
  }
}

#[cfg(test)]
mod test {
  use std::sync::Mutex;

  use super::*;
  use crate::scheduler::SchedulerExt;

  fn ms(v: u64) -> Duration { Duration::from_millis(v) }

  fn log_at(
    scheduler: &VirtualTimeScheduler,
    log: &Arc<Mutex<Vec<(u64, &'static str)>>>,
    due: u64,
    tag: &'static str,
  ) -> BoxedDisposable {
    let c_log = log.clone();
    let c_scheduler = scheduler.clone();
    scheduler.schedule_absolute_fn(ms(due), move || {
      let now = c_scheduler.now().as_millis() as u64;
      c_log.lock().unwrap().push((now, tag));
    })
  }

  #[test]
  fn runs_in_due_then_insertion_order() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 20, "b");
    log_at(&scheduler, &log, 10, "a");
    log_at(&scheduler, &log, 20, "c");
    scheduler.start();
    assert_eq!(*log.lock().unwrap(), vec![(10, "a"), (20, "b"), (20, "c")]);
    assert!(!scheduler.is_enabled());
  }

  #[test]
  fn cancelled_items_are_skipped() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 10, "a");
    log_at(&scheduler, &log, 20, "b").dispose();
    scheduler.start();
    assert_eq!(*log.lock().unwrap(), vec![(10, "a")]);
  }

  #[test]
  fn past_due_moves_one_tick_forward() {
    let scheduler = VirtualTimeScheduler::with_clock(ms(50));
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 10, "late");
    log_at(&scheduler, &log, 50, "now");
    scheduler.start();
    assert_eq!(*log.lock().unwrap(), vec![(50, "now"), (51, "late")]);
  }

  #[test]
  fn reentrant_scheduling() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    scheduler.schedule_relative(
      ms(5),
      Box::new(move |s| {
        let c_log2 = c_log.clone();
        s.schedule_relative_fn(ms(5), move || c_log2.lock().unwrap().push("inner"));
        c_log.lock().unwrap().push("outer");
        None
      }),
    );
    scheduler.start();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    assert_eq!(scheduler.clock(), ms(10));
  }

  #[test]
  fn advance_to_runs_due_work_only() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 10, "a");
    log_at(&scheduler, &log, 30, "b");
    scheduler.advance_to(ms(20)).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![(10, "a")]);
    assert_eq!(scheduler.clock(), ms(20));
    scheduler.advance_by(ms(10)).unwrap();
    assert_eq!(*log.lock().unwrap(), vec![(10, "a"), (30, "b")]);
    assert!(matches!(
      scheduler.advance_to(ms(5)),
      Err(RxError::ArgumentOutOfRange(_))
    ));
  }

  #[test]
  fn sleep_does_not_run_work() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    log_at(&scheduler, &log, 10, "a");
    scheduler.sleep(ms(100));
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(scheduler.clock(), ms(100));
    scheduler.start();
    assert_eq!(*log.lock().unwrap(), vec![(100, "a")]);
  }

  #[test]
  fn stop_halts_start() {
    let scheduler = VirtualTimeScheduler::new();
    let log = Arc::new(Mutex::new(vec![]));
    let c_scheduler = scheduler.clone();
    scheduler.schedule_absolute_fn(ms(10), move || c_scheduler.stop());
    log_at(&scheduler, &log, 20, "never");
    scheduler.start();
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(scheduler.pending_count(), 1);
  }
}
