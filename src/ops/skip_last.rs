use std::{collections::VecDeque, sync::Mutex};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

pub struct SkipLastObserver<T> {
  observer: BoxedObserver<T>,
  count: usize,
  queue: Mutex<VecDeque<T>>,
}

impl<T: Value> Observer<T> for SkipLastObserver<T> {
  fn on_next(&self, value: T) {
    let front = {
      let mut queue = lock(&self.queue);
      queue.push_back(value);
      if queue.len() > self.count {
        queue.pop_front()
      } else {
        None
      }
    };
    if let Some(v) = front {
      self.observer.on_next(v);
    }
  }

  fn on_error(&self, err: RxError) { self.observer.on_error(err) }

  fn on_completed(&self) {
    lock(&self.queue).clear();
    self.observer.on_completed()
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Drops the last `count` values. Each value is held back until `count`
  /// newer ones arrived.
  pub fn skip_last(self, count: usize) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      let queue = Mutex::new(VecDeque::with_capacity(count + 1));
      self.subscribe_with(SkipLastObserver { observer, count, queue }, scheduler)
    })
  }
}
