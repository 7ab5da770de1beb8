//! Combine latest operator: emits the latest value of every source each
//! time one of them emits, once all of them have emitted.

use std::sync::{Arc, Mutex};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable},
  error::RxError,
  observable::{empty, Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

struct Latest<T> {
  values: Vec<Option<T>>,
  done: Vec<bool>,
  stopped: bool,
}

struct CombineState<T> {
  observer: BoxedObserver<Vec<T>>,
  group: Arc<CompositeDisposable>,
  // Held across downstream calls so the sources never interleave.
  latest: Mutex<Latest<T>>,
}

pub struct CombineLatestObserver<T> {
  state: Arc<CombineState<T>>,
  index: usize,
}

impl<T: Value> Observer<T> for CombineLatestObserver<T> {
  fn on_next(&self, value: T) {
    let starved = {
      let mut latest = lock(&self.state.latest);
      if latest.stopped {
        return;
      }
      latest.values[self.index] = Some(value);
      let combined: Option<Vec<T>> = latest.values.iter().cloned().collect();
      if let Some(combined) = combined {
        self.state.observer.on_next(combined);
        return;
      }
      // Every other source finished, so the missing slots never fill.
      let others_done = latest.done.iter().enumerate().all(|(i, d)| i == self.index || *d);
      if others_done {
        latest.stopped = true;
        self.state.observer.on_completed();
      }
      others_done
    };
    if starved {
      self.state.group.dispose();
    }
  }

  fn on_error(&self, err: RxError) {
    {
      let mut latest = lock(&self.state.latest);
      if latest.stopped {
        return;
      }
      latest.stopped = true;
      self.state.observer.on_error(err);
    }
    self.state.group.dispose();
  }

  fn on_completed(&self) {
    {
      let mut latest = lock(&self.state.latest);
      if latest.stopped {
        return;
      }
      latest.done[self.index] = true;
      if !latest.done.iter().all(|d| *d) {
        return;
      }
      latest.stopped = true;
      self.state.observer.on_completed();
    }
    self.state.group.dispose();
  }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

/// Combines the latest values of all `sources` into one `Vec`, in source
/// order.
///
/// Nothing is emitted until every source produced a value. The result
/// errors as soon as any source errors and completes when all sources
/// completed. A value arriving while the combination still lacks a slot
/// and every other source already completed ends the stream too.
///
/// ```
/// use rxflow::prelude::*;
///
/// combine_latest(vec![of(vec![1, 2]), of(vec![10])]).subscribe(|v| println!("{v:?}"));
/// // [2, 10]
/// ```
pub fn combine_latest<T: Value>(sources: Vec<Observable<T>>) -> Observable<Vec<T>> {
  if sources.is_empty() {
    return empty();
  }
  Observable::new(move |observer, scheduler| {
    let group = Arc::new(CompositeDisposable::new());
    let state = Arc::new(CombineState {
      observer,
      group: group.clone(),
      latest: Mutex::new(Latest {
        values: vec![None; sources.len()],
        done: vec![false; sources.len()],
        stopped: false,
      }),
    });
    for (index, source) in sources.iter().enumerate() {
      if group.is_disposed() {
        break;
      }
      let observer = CombineLatestObserver { state: state.clone(), index };
      group.add(source.subscribe_with(observer, scheduler.clone()));
    }
    BoxedDisposable::from(group)
  })
}

impl<T: Value> Observable<T> {
  pub fn combine_latest_with(self, other: Observable<T>) -> Observable<Vec<T>> {
    combine_latest(vec![self, other])
  }
}
