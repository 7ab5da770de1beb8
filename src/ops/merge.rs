//! Flattening of a stream of streams by interleaving their values.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable, SingleAssignmentDisposable},
  error::RxError,
  observable::{of, Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  scheduler::SchedulerRef,
};

struct Gate<T> {
  active: usize,
  outer_done: bool,
  stopped: bool,
  waiting: VecDeque<Observable<T>>,
}

struct MergeState<T> {
  observer: BoxedObserver<T>,
  scheduler: Option<SchedulerRef>,
  concurrent: usize,
  group: Arc<CompositeDisposable>,
  gate: Mutex<Gate<T>>,
  // Held across every downstream call so inner sources never interleave.
  emit: Mutex<()>,
}

impl<T: Value> MergeState<T> {
  fn subscribe_inner(self: &Arc<Self>, inner: Observable<T>) {
    let slot = Arc::new(SingleAssignmentDisposable::new());
    let handle = BoxedDisposable::from(slot.clone());
    self.group.add(handle.clone());
    let subscription = inner.subscribe_with(
      InnerObserver { state: self.clone(), handle },
      self.scheduler.clone(),
    );
    // Fails only when the inner already finished and its slot was released.
    let _ = slot.set(subscription);
  }

  fn inner_completed(self: &Arc<Self>, handle: &BoxedDisposable) {
    self.group.remove(handle);
    let next = {
      let mut gate = lock(&self.gate);
      if gate.stopped {
        return;
      }
      match gate.waiting.pop_front() {
        Some(next) => Some(next),
        None => {
          gate.active -= 1;
          if gate.active == 0 && gate.outer_done {
            gate.stopped = true;
          } else {
            return;
          }
          None
        }
      }
    };
    match next {
      Some(next) => self.subscribe_inner(next),
      None => self.complete(),
    }
  }

  fn complete(&self) {
    {
      let _emit = lock(&self.emit);
      self.observer.on_completed();
    }
    self.group.dispose();
  }

  fn error(&self, err: RxError) {
    {
      let mut gate = lock(&self.gate);
      if gate.stopped {
        return;
      }
      gate.stopped = true;
      gate.waiting.clear();
    }
    {
      let _emit = lock(&self.emit);
      self.observer.on_error(err);
    }
    self.group.dispose();
  }
}

pub struct MergeAllObserver<T> {
  state: Arc<MergeState<T>>,
}

impl<T: Value> Observer<Observable<T>> for MergeAllObserver<T> {
  fn on_next(&self, inner: Observable<T>) {
    {
      let mut gate = lock(&self.state.gate);
      if gate.stopped {
        return;
      }
      if gate.active >= self.state.concurrent {
        gate.waiting.push_back(inner);
        return;
      }
      gate.active += 1;
    }
    self.state.subscribe_inner(inner);
  }

  fn on_error(&self, err: RxError) { self.state.error(err) }

  fn on_completed(&self) {
    {
      let mut gate = lock(&self.state.gate);
      if gate.stopped {
        return;
      }
      gate.outer_done = true;
      if gate.active > 0 {
        return;
      }
      gate.stopped = true;
    }
    self.state.complete();
  }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

struct InnerObserver<T> {
  state: Arc<MergeState<T>>,
  handle: BoxedDisposable,
}

impl<T: Value> Observer<T> for InnerObserver<T> {
  fn on_next(&self, value: T) {
    let _emit = lock(&self.state.emit);
    self.state.observer.on_next(value);
  }

  fn on_error(&self, err: RxError) { self.state.error(err) }

  fn on_completed(&self) { self.state.inner_completed(&self.handle) }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

impl<T: Value> Observable<Observable<T>> {
  /// Subscribes to every inner observable as it arrives, keeping at most
  /// `concurrent` of them active and queueing the rest. Values are
  /// forwarded as they come; the result completes once the outer stream
  /// and every inner stream completed.
  pub fn merge_all(self, concurrent: usize) -> Observable<T> {
    let concurrent = concurrent.max(1);
    Observable::new(move |observer, scheduler| {
      let group = Arc::new(CompositeDisposable::new());
      let state = Arc::new(MergeState {
        observer,
        scheduler: scheduler.clone(),
        concurrent,
        group: group.clone(),
        gate: Mutex::new(Gate {
          active: 0,
          outer_done: false,
          stopped: false,
          waiting: VecDeque::new(),
        }),
        emit: Mutex::new(()),
      });
      let outer = self.subscribe_with(MergeAllObserver { state }, scheduler);
      group.add(outer);
      BoxedDisposable::from(group)
    })
  }
}

/// Interleaves the values of all `sources`.
///
/// ```
/// use rxflow::prelude::*;
///
/// merge(vec![of(vec![1, 2]), of(vec![3])]).subscribe(|v| println!("{v}"));
/// ```
pub fn merge<T: Value>(sources: Vec<Observable<T>>) -> Observable<T> {
  of(sources).merge_all(usize::MAX)
}

impl<T: Value> Observable<T> {
  pub fn merge_with(self, other: Observable<T>) -> Observable<T> { merge(vec![self, other]) }
}
