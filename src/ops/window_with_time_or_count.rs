use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, RefCountDisposable, SerialDisposable},
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  scheduler::{resolve, SchedulerExt, SchedulerRef},
  subject::Subject,
};

use super::window_with_count::open_window;

struct Current<T> {
  window: Subject<T>,
  filled: usize,
  // Bumped on every close so a stale timer cannot close a newer window.
  window_id: u64,
  stopped: bool,
}

struct TimeOrCountWindows<T> {
  observer: BoxedObserver<Observable<T>>,
  refs: Arc<RefCountDisposable>,
  scheduler: SchedulerRef,
  span: Duration,
  count: usize,
  timer: Arc<SerialDisposable>,
  state: Mutex<Current<T>>,
}

impl<T: Value> TimeOrCountWindows<T> {
  fn arm(self: &Arc<Self>, id: u64) {
    let this = self.clone();
    let handle = self.scheduler.schedule_relative_fn(self.span, move || {
      let next = {
        let mut state = lock(&this.state);
        if state.stopped || state.window_id != id {
          return;
        }
        this.rotate(&mut state)
      };
      this.arm(next);
    });
    self.timer.set(handle);
  }

  /// Closes the current window and opens the next one, returning its id.
  fn rotate(&self, state: &mut Current<T>) -> u64 {
    state.filled = 0;
    state.window_id += 1;
    state.window.on_completed();
    state.window = open_window(&self.observer, &self.refs);
    state.window_id
  }
}

pub struct WindowWithTimeOrCountObserver<T> {
  inner: Arc<TimeOrCountWindows<T>>,
}

impl<T: Value> Observer<T> for WindowWithTimeOrCountObserver<T> {
  fn on_next(&self, value: T) {
    let rotated = {
      let mut state = lock(&self.inner.state);
      if state.stopped {
        return;
      }
      state.window.on_next(value);
      state.filled += 1;
      if state.filled == self.inner.count {
        Some(self.inner.rotate(&mut state))
      } else {
        None
      }
    };
    if let Some(id) = rotated {
      self.inner.arm(id);
    }
  }

  fn on_error(&self, err: RxError) {
    let mut state = lock(&self.inner.state);
    state.stopped = true;
    state.window.on_error(err.clone());
    self.inner.observer.on_error(err);
  }

  fn on_completed(&self) {
    let mut state = lock(&self.inner.state);
    state.stopped = true;
    state.window.on_completed();
    self.inner.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.inner.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Keeps a single open window that closes after `span` or once it holds
  /// `count` items, whichever comes first. Every close opens the next
  /// window and restarts the timer.
  ///
  /// Fails with [`RxError::ArgumentOutOfRange`] for a zero `span` or
  /// `count`.
  pub fn window_with_time_or_count(
    self,
    span: Duration,
    count: usize,
    scheduler: Option<SchedulerRef>,
  ) -> Result<Observable<Observable<T>>> {
    if span.is_zero() {
      return Err(RxError::out_of_range("window span must be positive"));
    }
    if count == 0 {
      return Err(RxError::out_of_range("window count must be greater than zero"));
    }
    Ok(Observable::new(move |observer, subscribed| {
      let timer = Arc::new(SerialDisposable::new());
      let group = Arc::new(CompositeDisposable::new());
      group.add(BoxedDisposable::from(timer.clone()));
      let refs = Arc::new(RefCountDisposable::new(BoxedDisposable::from(group.clone())));
      let window = open_window(&observer, &refs);
      let inner = Arc::new(TimeOrCountWindows {
        observer,
        refs: refs.clone(),
        scheduler: resolve(&scheduler, subscribed.clone()),
        span,
        count,
        timer,
        state: Mutex::new(Current { window, filled: 0, window_id: 0, stopped: false }),
      });
      inner.arm(0);
      group.add(self.subscribe_with(WindowWithTimeOrCountObserver { inner }, subscribed));
      BoxedDisposable::from(refs)
    }))
  }
}

#[cfg(test)]
mod test {
  use std::time::Duration;

  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn closes_on_count_or_time() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(205., 1),
      RT::on_next(210., 2),
      RT::on_next(215., 3),
      RT::on_next(280., 4),
      RT::on_completed(300.),
    ]);
    let observer = scheduler.start(move || {
      xs.observable()
        .window_with_time_or_count(Duration::from_millis(50), 2, None)
        .unwrap()
        .flat_map(|w| w.to_vec())
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(210., vec![1, 2]),
        RT::on_next(260., vec![3]),
        RT::on_next(300., vec![4]),
        RT::on_completed(300.)
      ]
    );
  }

  #[test]
  fn idle_windows_close_on_time() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable::<i32>(vec![RT::on_completed(330.)]);
    let observer = scheduler.start(move || {
      xs.observable()
        .window_with_time_or_count(Duration::from_millis(100), 5, None)
        .unwrap()
        .flat_map(|w| w.count())
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(300., 0),
        RT::on_next(330., 0),
        RT::on_completed(330.)
      ]
    );
  }

  #[test]
  fn zero_count_rejected() {
    assert!(of(vec![1])
      .window_with_time_or_count(Duration::from_millis(1), 0, None)
      .is_err());
  }
}
