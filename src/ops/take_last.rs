//! TakeLast operator implementation
//!
//! Buffers the last `count` values and flushes them when the source
//! completes, either one by one ([`take_last`]) or as a single `Vec`
//! ([`take_last_buffer`]).
//!
//! [`take_last`]: crate::observable::Observable::take_last
//! [`take_last_buffer`]: crate::observable::Observable::take_last_buffer

use std::{collections::VecDeque, sync::Mutex};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

pub struct TakeLastObserver<T, U> {
  observer: BoxedObserver<U>,
  count: usize,
  queue: Mutex<VecDeque<T>>,
  flush: fn(VecDeque<T>, &BoxedObserver<U>),
}

impl<T: Value, U> Observer<T> for TakeLastObserver<T, U> {
  fn on_next(&self, value: T) {
    if self.count == 0 {
      return;
    }
    let mut queue = lock(&self.queue);
    queue.push_back(value);
    if queue.len() > self.count {
      queue.pop_front();
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    let queue = std::mem::take(&mut *lock(&self.queue));
    (self.flush)(queue, &self.observer);
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

fn each<T>(queue: VecDeque<T>, observer: &BoxedObserver<T>) {
  for v in queue {
    observer.on_next(v);
  }
}

fn whole<T>(queue: VecDeque<T>, observer: &BoxedObserver<Vec<T>>) {
  observer.on_next(queue.into_iter().collect());
}

impl<T: Value> Observable<T> {
  /// Emits only the last `count` values, after the source completes.
  pub fn take_last(self, count: usize) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      let queue = Mutex::new(VecDeque::with_capacity(count));
      self.subscribe_with(
        TakeLastObserver { observer, count, queue, flush: each },
        scheduler,
      )
    })
  }

  /// Emits the last `count` values as one `Vec` when the source
  /// completes.
  pub fn take_last_buffer(self, count: usize) -> Observable<Vec<T>> {
    Observable::new(move |observer, scheduler| {
      let queue = Mutex::new(VecDeque::with_capacity(count));
      self.subscribe_with(
        TakeLastObserver { observer, count, queue, flush: whole },
        scheduler,
      )
    })
  }
}
