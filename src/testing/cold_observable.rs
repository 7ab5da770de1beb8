use std::sync::{Arc, Mutex};

use tracing::warn;

use super::{RecordedValue, Recorded, Subscription};
use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable},
  observable::{Observable, Value},
  rc::lock,
  scheduler::{from_ticks, SchedulerExt, TestScheduler},
};

/// A scripted source replaying its messages relative to each subscription.
///
/// Every subscription is logged with its subscribe and unsubscribe ticks.
pub struct ColdObservable<T> {
  scheduler: TestScheduler,
  messages: Arc<Vec<Recorded<T>>>,
  subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl<T> Clone for ColdObservable<T> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<T: Value> ColdObservable<T> {
  pub fn new(scheduler: TestScheduler, messages: Vec<Recorded<T>>) -> Self {
    if messages.iter().any(|m| m.notification().is_none()) {
      warn!("predicate messages cannot be emitted and are skipped");
    }
    Self {
      scheduler,
      messages: Arc::new(messages),
      subscriptions: Arc::new(Mutex::new(vec![])),
    }
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
      let scheduled = CompositeDisposable::new();
      for message in this.messages.iter() {
        let RecordedValue::Notification(n) = &message.value else { continue };
        let n = n.clone();
        let observer = observer.clone();
        scheduled.add(
          this
            .scheduler
            .schedule_relative_fn(from_ticks(message.time), move || n.accept(&*observer)),
        );
      }
      let scheduler = this.scheduler.clone();
      let subscriptions = this.subscriptions.clone();
      BoxedDisposable::from_fn(move || {
        lock(&subscriptions)[index].unsubscribe = scheduler.clock();
        scheduled.dispose();
      })
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn replays_per_subscription() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable(vec![RT::on_next(10., 'a'), RT::on_completed(20.)]);
    let observer = scheduler.create_observer::<char>();
    let c_xs = xs.clone();
    let c_observer = observer.clone();
    scheduler.schedule_at(100., move || {
      c_xs.observable().subscribe_with(c_observer, None);
    });
    let c_xs = xs.clone();
    let c_observer = observer.clone();
    scheduler.schedule_at(300., move || {
      c_xs.observable().subscribe_with(c_observer, None);
    });
    scheduler.run();
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(110., 'a'),
        RT::on_completed(120.),
        RT::on_next(310., 'a'),
        RT::on_completed(320.)
      ]
    );
    assert_eq!(
      xs.subscriptions(),
      vec![RT::subscribe(100., 120.), RT::subscribe(300., 320.)]
    );
  }
}
