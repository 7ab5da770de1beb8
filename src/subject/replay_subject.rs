use std::{collections::VecDeque, sync::Arc, time::Duration};

use super::{broadcast, broadcast_terminal, SubjectCore, Terminal};
use crate::{
  error::RxError,
  notification::Notification,
  observable::{Observable, Value},
  observer::Observer,
  scheduler::{ImmediateScheduler, Scheduler, SchedulerRef},
};

struct Buffer<T> {
  items: VecDeque<(Duration, T)>,
  size: Option<usize>,
  window: Option<Duration>,
  scheduler: SchedulerRef,
}

impl<T> Buffer<T> {
  fn trim(&mut self, now: Duration) {
    if let Some(size) = self.size {
      while self.items.len() > size {
        self.items.pop_front();
      }
    }
    if let Some(window) = self.window {
      while self
        .items
        .front()
        .is_some_and(|(t, _)| now.saturating_sub(*t) > window)
      {
        self.items.pop_front();
      }
    }
  }
}

/// Replays buffered values to every new subscriber, then the terminal
/// notification if there was one.
///
/// The buffer can be bounded by count, by age, or both. Ages are measured
/// on the subject's scheduler clock.
pub struct ReplaySubject<T> {
  core: Arc<SubjectCore<T, Buffer<T>>>,
}

impl<T> Clone for ReplaySubject<T> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<T: Value> Default for ReplaySubject<T> {
  fn default() -> Self { Self::new() }
}

impl<T: Value> ReplaySubject<T> {
  /// An unbounded replay buffer.
  pub fn new() -> Self { Self::with_limits(None, None, None) }

  pub fn with_buffer_size(size: usize) -> Self { Self::with_limits(Some(size), None, None) }

  /// `size` bounds the number of values kept, `window` how long a value
  /// stays replayable on `scheduler`'s clock.
  pub fn with_limits(
    size: Option<usize>,
    window: Option<Duration>,
    scheduler: Option<SchedulerRef>,
  ) -> Self {
    let buffer = Buffer {
      items: VecDeque::new(),
      size,
      window,
      scheduler: scheduler.unwrap_or_else(|| Arc::new(ImmediateScheduler)),
    };
    Self { core: SubjectCore::new(buffer) }
  }

  pub fn observable(&self) -> Observable<T> {
    let core = self.core.clone();
    Observable::new(move |observer, _| {
      core.subscribe(observer, |buffer, terminal| {
        let now = buffer.scheduler.now();
        buffer
          .items
          .iter()
          .filter(|(t, _)| buffer.window.map_or(true, |w| now.saturating_sub(*t) <= w))
          .map(|(_, v)| Notification::Next(v.clone()))
          .chain(terminal.map(Terminal::notification))
          .collect()
      })
    })
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn dispose(&self) { self.core.dispose() }

  pub fn is_disposed(&self) -> bool { self.core.is_disposed() }
}

impl<T: Value> Observer<T> for ReplaySubject<T> {
  fn on_next(&self, value: T) {
    let observers = self.core.next(&value, |buffer, v| {
      let now = buffer.scheduler.now();
      buffer.items.push_back((now, v.clone()));
      buffer.trim(now);
    });
    if let Some(observers) = observers {
      broadcast(observers, value);
    }
  }

  fn on_error(&self, err: RxError) {
    let terminal = Terminal::Error(err);
    if let Some((observers, ())) = self.core.terminate(terminal.clone(), |_| ()) {
      broadcast_terminal(&observers, &terminal);
    }
  }

  fn on_completed(&self) {
    if let Some((observers, ())) = self.core.terminate(Terminal::Completed, |_| ()) {
      broadcast_terminal(&observers, &Terminal::Completed);
    }
  }
}

#[cfg(test)]
mod test {
  use std::sync::Mutex;

  use super::*;
  use crate::{scheduler::VirtualTimeScheduler, subject::test::recorder};

  #[test]
  fn replays_everything() {
    let log = Arc::new(Mutex::new(vec![]));
    let subject = ReplaySubject::new();
    subject.on_next(1);
    subject.on_next(2);
    subject.on_completed();
    subject.observable().subscribe_with(recorder::<i32>(&log, "a"), None);
    assert_eq!(*log.lock().unwrap(), vec!["a:1", "a:2", "a:done"]);
  }

  #[test]
  fn bounded_by_size() {
    let log = Arc::new(Mutex::new(vec![]));
    let subject = ReplaySubject::with_buffer_size(2);
    (1..=4).for_each(|v| subject.on_next(v));
    subject.observable().subscribe_with(recorder::<i32>(&log, "a"), None);
    subject.on_next(5);
    assert_eq!(*log.lock().unwrap(), vec!["a:3", "a:4", "a:5"]);
  }

  #[test]
  fn bounded_by_age() {
    let log = Arc::new(Mutex::new(vec![]));
    let clock = VirtualTimeScheduler::new();
    let subject = ReplaySubject::with_limits(
      None,
      Some(Duration::from_millis(10)),
      Some(Arc::new(clock.clone())),
    );
    subject.on_next(1);
    clock.sleep(Duration::from_millis(8));
    subject.on_next(2);
    clock.sleep(Duration::from_millis(5));
    subject.observable().subscribe_with(recorder::<i32>(&log, "a"), None);
    assert_eq!(*log.lock().unwrap(), vec!["a:2"]);
  }
}
