//! Time-based windowing: windows open every `shift` and live for `span`.

use std::{
  collections::VecDeque,
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

struct Schedule<T> {
  windows: VecDeque<Subject<T>>,
  next_span: Duration,
  next_shift: Duration,
  total: Duration,
  stopped: bool,
}

struct TimeWindows<T> {
  observer: BoxedObserver<Observable<T>>,
  refs: Arc<RefCountDisposable>,
  scheduler: SchedulerRef,
  span: Duration,
  shift: Duration,
  timer: Arc<SerialDisposable>,
  state: Mutex<Schedule<T>>,
}

impl<T: Value> TimeWindows<T> {
  /// Arms the timer for whichever comes first: the next window closing or
  /// the next one opening.
  fn arm(self: &Arc<Self>) {
    let (delay, is_span, is_shift) = {
      let mut state = lock(&self.state);
      if state.stopped {
        return;
      }
      let is_span = state.next_span <= state.next_shift;
      let is_shift = state.next_shift <= state.next_span;
      let due = if is_span { state.next_span } else { state.next_shift };
      let delay = due - state.total;
      state.total = due;
      if is_span {
        state.next_span += self.shift;
      }
      if is_shift {
        state.next_shift += self.shift;
      }
      (delay, is_span, is_shift)
    };
    let this = self.clone();
    let handle = self.scheduler.schedule_relative_fn(delay, move || {
      {
        let mut state = lock(&this.state);
        if state.stopped {
          return;
        }
        if is_shift {
          let window = open_window(&this.observer, &this.refs);
          state.windows.push_back(window);
        }
        if is_span {
          if let Some(w) = state.windows.pop_front() {
            w.on_completed();
          }
        }
      }
      this.arm();
    });
    self.timer.set(handle);
  }
}

pub struct WindowWithTimeObserver<T> {
  inner: Arc<TimeWindows<T>>,
}

impl<T: Value> Observer<T> for WindowWithTimeObserver<T> {
  fn on_next(&self, value: T) {
    let state = lock(&self.inner.state);
    for w in state.windows.iter() {
      w.on_next(value.clone());
    }
  }

  fn on_error(&self, err: RxError) {
    let mut state = lock(&self.inner.state);
    state.stopped = true;
    for w in state.windows.drain(..) {
      w.on_error(err.clone());
    }
    self.inner.observer.on_error(err);
  }

  fn on_completed(&self) {
    let mut state = lock(&self.inner.state);
    state.stopped = true;
    for w in state.windows.drain(..) {
      w.on_completed();
    }
    self.inner.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.inner.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Opens a window every `shift` and closes each one `span` after it
  /// opened; `None` makes `shift` equal to `span`. Windows overlap when
  /// `shift < span` and leave gaps when `shift > span`.
  ///
  /// Fails with [`RxError::ArgumentOutOfRange`] for a zero `span` or
  /// `shift`.
  pub fn window_with_time(
    self,
    span: Duration,
    shift: Option<Duration>,
    scheduler: Option<SchedulerRef>,
  ) -> Result<Observable<Observable<T>>> {
    let shift = shift.unwrap_or(span);
    if span.is_zero() || shift.is_zero() {
      return Err(RxError::out_of_range("window span and shift must be positive"));
    }
    Ok(Observable::new(move |observer, subscribed| {
      let timer = Arc::new(SerialDisposable::new());
      let group = Arc::new(CompositeDisposable::new());
      group.add(BoxedDisposable::from(timer.clone()));
      let refs = Arc::new(RefCountDisposable::new(BoxedDisposable::from(group.clone())));
      let first = open_window(&observer, &refs);
      let inner = Arc::new(TimeWindows {
        observer,
        refs: refs.clone(),
        scheduler: resolve(&scheduler, subscribed.clone()),
        span,
        shift,
        timer,
        state: Mutex::new(Schedule {
          windows: VecDeque::from([first]),
          next_span: span,
          next_shift: shift,
          total: Duration::ZERO,
          stopped: false,
        }),
      });
      inner.arm();
      group.add(self.subscribe_with(WindowWithTimeObserver { inner }, subscribed));
      BoxedDisposable::from(refs)
    }))
  }
}
