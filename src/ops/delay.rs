//! Delay operator: shifts every value and the completion forward in time.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  time::Duration,
};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable, SerialDisposable},
  error::RxError,
  notification::Notification,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  scheduler::{resolve, SchedulerExt, SchedulerRef},
};

struct Queue<T> {
  items: VecDeque<(Duration, Notification<T>)>,
  draining: bool,
  failed: bool,
}

struct DelayCore<T> {
  observer: BoxedObserver<T>,
  scheduler: SchedulerRef,
  delay: Duration,
  queue: Mutex<Queue<T>>,
  timer: Arc<SerialDisposable>,
}

impl<T: Value> DelayCore<T> {
  fn push(self: &Arc<Self>, n: Notification<T>) {
    let due = self.scheduler.now() + self.delay;
    {
      let mut queue = lock(&self.queue);
      if queue.failed {
        return;
      }
      queue.items.push_back((due, n));
      if queue.draining {
        return;
      }
      queue.draining = true;
    }
    self.arm(self.delay);
  }

  fn arm(self: &Arc<Self>, after: Duration) {
    let core = self.clone();
    let handle = self.scheduler.schedule_relative_fn(after, move || core.drain());
    self.timer.set(handle);
  }

  // Emits everything that is due, then re-arms for the next item.
  fn drain(self: &Arc<Self>) {
    let next_due = {
      let mut queue = lock(&self.queue);
      let now = self.scheduler.now();
      while let Some((due, _)) = queue.items.front() {
        if *due > now {
          break;
        }
        if let Some((_, n)) = queue.items.pop_front() {
          n.accept(&*self.observer);
        }
      }
      match queue.items.front() {
        Some((due, _)) => Some(due.saturating_sub(now)),
        _ => {
          queue.draining = false;
          None
        }
      }
    };
    if let Some(after) = next_due {
      self.arm(after);
    }
  }
}

pub struct DelayObserver<T> {
  core: Arc<DelayCore<T>>,
}

impl<T: Value> Observer<T> for DelayObserver<T> {
  fn on_next(&self, value: T) { self.core.push(Notification::Next(value)) }

  fn on_error(&self, err: RxError) {
    {
      let mut queue = lock(&self.core.queue);
      queue.failed = true;
      queue.items.clear();
    }
    self.core.timer.dispose();
    self.core.observer.on_error(err);
  }

  fn on_completed(&self) { self.core.push(Notification::Completed) }

  fn is_closed(&self) -> bool { self.core.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Shifts every value and the completion by `delay`. Errors are forwarded
  /// immediately and discard whatever is still pending.
  ///
  /// ```
  /// use std::time::Duration;
  /// use rxflow::prelude::*;
  ///
  /// let scheduler = TestScheduler::new();
  /// let observer = scheduler.start(|| of(vec![1]).delay(Duration::from_millis(30), None));
  /// assert_eq!(observer.messages()[0], ReactiveTest::on_next(230., 1));
  /// ```
  pub fn delay(self, delay: Duration, scheduler: Option<SchedulerRef>) -> Observable<T> {
    Observable::new(move |observer, subscribed| {
      let timer = Arc::new(SerialDisposable::new());
      let core = Arc::new(DelayCore {
        observer,
        scheduler: resolve(&scheduler, subscribed.clone()),
        delay,
        queue: Mutex::new(Queue { items: VecDeque::new(), draining: false, failed: false }),
        timer: timer.clone(),
      });
      let group = CompositeDisposable::new();
      group.add(BoxedDisposable::from(timer));
      group.add(self.subscribe_with(DelayObserver { core }, subscribed));
      BoxedDisposable::new(group)
    })
  }
}
