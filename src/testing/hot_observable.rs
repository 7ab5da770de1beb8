use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{Recorded, RecordedValue, Subscription};
use crate::{
  disposable::BoxedDisposable,
  observable::{Observable, Value},
  observer::BoxedObserver,
  rc::lock,
  scheduler::TestScheduler,
};

struct Hub<T> {
  observers: Vec<(u64, BoxedObserver<T>)>,
  next_id: u64,
}

/// A scripted source emitting its messages at absolute ticks, whether or
/// not anyone is subscribed.
pub struct HotObservable<T> {
  scheduler: TestScheduler,
  hub: Arc<Mutex<Hub<T>>>,
  subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl<T> Clone for HotObservable<T> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      hub: self.hub.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<T: Value> HotObservable<T> {
  pub fn new(scheduler: TestScheduler, messages: Vec<Recorded<T>>) -> Self {
    let hub = Arc::new(Mutex::new(Hub { observers: vec![], next_id: 0 }));
    for message in messages {
      let RecordedValue::Notification(n) = message.value else {
        warn!(time = message.time, "predicate message skipped by hot observable");
        continue;
      };
      let c_hub = hub.clone();
      scheduler.schedule_at(message.time, move || {
        let observers: Vec<_> = lock(&c_hub).observers.iter().map(|(_, o)| o.clone()).collect();
        for o in observers {
          n.clone().accept(&*o);
        }
      });
    }
    Self { scheduler, hub, subscriptions: Arc::new(Mutex::new(vec![])) }
  }

  pub fn subscriptions(&self) -> Vec<Subscription> { lock(&self.subscriptions).clone() }

  pub fn observable(&self) -> Observable<T> {
    let this = self.clone();
    Observable::new(move |observer, _| {
      let index = {
        let mut subscriptions = lock(&this.subscriptions);
        subscriptions.push(Subscription::new(this.scheduler.clock(), f64::INFINITY));
        subscriptions.len() - 1
      };
      let id = {
        let mut hub = lock(&this.hub);
        let id = hub.next_id;
        hub.next_id += 1;
        hub.observers.push((id, observer));
        id
      };
      let this = this.clone();
      BoxedDisposable::from_fn(move || {
        lock(&this.subscriptions)[index].unsubscribe = this.scheduler.clock();
        lock(&this.hub).observers.retain(|(i, _)| *i != id);
      })
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn misses_what_happened_before_subscription() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(150., 1),
      RT::on_next(250., 2),
      RT::on_completed(300.),
    ]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.observable());
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(250., 2), RT::on_completed(300.)]
    );
    assert_eq!(xs.subscriptions(), vec![RT::subscribe(200., 300.)]);
  }

  #[test]
  fn dispose_logs_unsubscribe() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![RT::on_next(250., 1), RT::on_next(1200., 2)]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.observable());
    assert_eq!(observer.messages(), vec![RT::on_next(250., 1)]);
    assert_eq!(xs.subscriptions(), vec![RT::subscribe(200., 1000.)]);
  }
}
