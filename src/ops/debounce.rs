use std::{sync::Arc, time::Duration};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable, SerialDisposable},
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::MutArc,
  scheduler::{resolve, SchedulerExt, SchedulerRef},
};

struct Trailing<T> {
  value: Option<T>,
  id: u64,
}

pub struct DebounceObserver<T> {
  observer: BoxedObserver<T>,
  scheduler: SchedulerRef,
  delay: Duration,
  trailing: MutArc<Trailing<T>>,
  timer: Arc<SerialDisposable>,
}

impl<T: Value> Observer<T> for DebounceObserver<T> {
  fn on_next(&self, value: T) {
    let id = self.trailing.with(|t| {
      t.value = Some(value);
      t.id += 1;
      t.id
    });
    let observer = self.observer.clone();
    let trailing = self.trailing.clone();
    let handle = self.scheduler.schedule_relative_fn(self.delay, move || {
      let mut t = trailing.rc_deref_mut();
      if t.id == id {
        if let Some(v) = t.value.take() {
          observer.on_next(v);
        }
      }
    });
    self.timer.set(handle);
  }

  fn on_error(&self, err: RxError) {
    self.timer.dispose();
    self.trailing.with(|t| t.value = None);
    self.observer.on_error(err);
  }

  fn on_completed(&self) {
    self.timer.dispose();
    let mut t = self.trailing.rc_deref_mut();
    if let Some(v) = t.value.take() {
      self.observer.on_next(v);
    }
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Emits a value only after `duration` passed without another value.
  /// A pending value is flushed when the source completes.
  ///
  /// Without an explicit `scheduler`, the subscribe-time scheduler is
  /// used, falling back to a new thread per timer.
  pub fn debounce(self, duration: Duration, scheduler: Option<SchedulerRef>) -> Observable<T> {
    Observable::new(move |observer, subscribed| {
      let timer = Arc::new(SerialDisposable::new());
      let debounce = DebounceObserver {
        observer,
        scheduler: resolve(&scheduler, subscribed.clone()),
        delay: duration,
        trailing: MutArc::own(Trailing { value: None, id: 0 }),
        timer: timer.clone(),
      };
      let group = CompositeDisposable::new();
      group.add(BoxedDisposable::from(timer));
      group.add(self.subscribe_with(debounce, subscribed));
      BoxedDisposable::new(group)
    })
  }
}
