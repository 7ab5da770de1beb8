use std::sync::{Arc, Mutex};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable},
  error::RxError,
  observable::{empty, Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

struct Joined<T> {
  last: Vec<Option<T>>,
  remaining: usize,
  stopped: bool,
}

struct ForkJoinState<T> {
  observer: BoxedObserver<Vec<T>>,
  group: Arc<CompositeDisposable>,
  joined: Mutex<Joined<T>>,
}

pub struct ForkJoinObserver<T> {
  state: Arc<ForkJoinState<T>>,
  index: usize,
}

impl<T: Value> Observer<T> for ForkJoinObserver<T> {
  fn on_next(&self, value: T) {
    let mut joined = lock(&self.state.joined);
    if !joined.stopped {
      joined.last[self.index] = Some(value);
    }
  }

  fn on_error(&self, err: RxError) {
    {
      let mut joined = lock(&self.state.joined);
      if joined.stopped {
        return;
      }
      joined.stopped = true;
      self.state.observer.on_error(err);
    }
    self.state.group.dispose();
  }

  fn on_completed(&self) {
    {
      let mut joined = lock(&self.state.joined);
      if joined.stopped {
        return;
      }
      if joined.last[self.index].is_some() {
        joined.remaining -= 1;
        if joined.remaining > 0 {
          return;
        }
        let values: Option<Vec<T>> = joined.last.iter_mut().map(Option::take).collect();
        if let Some(values) = values {
          self.state.observer.on_next(values);
        }
      }
      joined.stopped = true;
      self.state.observer.on_completed();
    }
    self.state.group.dispose();
  }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

/// Waits for every source to complete and emits their last values in
/// source order.
///
/// If a source completes without emitting, the result completes without a
/// value and the other sources are released.
pub fn fork_join<T: Value>(sources: Vec<Observable<T>>) -> Observable<Vec<T>> {
  if sources.is_empty() {
    return empty();
  }
  Observable::new(move |observer, scheduler| {
    let group = Arc::new(CompositeDisposable::new());
    let state = Arc::new(ForkJoinState {
      observer,
      group: group.clone(),
      joined: Mutex::new(Joined {
        last: vec![None; sources.len()],
        remaining: sources.len(),
        stopped: false,
      }),
    });
    for (index, source) in sources.iter().enumerate() {
      if group.is_disposed() {
        break;
      }
      let observer = ForkJoinObserver { state: state.clone(), index };
      group.add(source.subscribe_with(observer, scheduler.clone()));
    }
    BoxedDisposable::from(group)
  })
}
