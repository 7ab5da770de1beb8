//! Retry operator: re-subscribes the source after an error.

use crate::{
  observable::{empty, Observable, Value},
  subject::Terminal,
};

use super::sequence::{Sequencer, Step};

impl<T: Value> Observable<T> {
  /// Re-subscribes after each error, for `count` total subscriptions or
  /// without limit when `None`. The error of the final attempt is
  /// forwarded. `Some(0)` never subscribes and completes at once.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// concat(vec![of(vec![1]), throw(RxError::user("flaky"))])
  ///   .retry(Some(2))
  ///   .subscribe_all(|v| println!("{v}"), |e| println!("{e}"), || {});
  /// // 1, 1, flaky
  /// ```
  pub fn retry(self, count: Option<usize>) -> Observable<T> {
    if count == Some(0) {
      return empty();
    }
    Observable::new(move |observer, scheduler| {
      let source = self.clone();
      let mut subscribed = 1;
      Sequencer::run(self.clone(), observer, scheduler, move |terminal| match terminal {
        Terminal::Error(_) if count.map_or(true, |c| subscribed < c) => {
          subscribed += 1;
          Step::Subscribe(source.clone())
        }
        terminal => Step::Done(terminal),
      })
    })
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn gives_up_after_count() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable(vec![
      RT::on_next(10., 'a'),
      RT::on_next(20., 'b'),
      RT::on_error(30., RxError::user("nope")),
    ]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.observable().retry(Some(2)));
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(210., 'a'),
        RT::on_next(220., 'b'),
        RT::on_next(240., 'a'),
        RT::on_next(250., 'b'),
        RT::on_error(260., RxError::user("nope"))
      ]
    );
    assert_eq!(
      xs.subscriptions(),
      vec![RT::subscribe(200., 230.), RT::subscribe(230., 260.)]
    );
  }

  #[test]
  fn succeeds_on_later_attempt() {
    let scheduler = TestScheduler::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let c_attempts = attempts.clone();
    let observer = scheduler.start(move || {
      defer(move || {
        if c_attempts.fetch_add(1, Ordering::SeqCst) < 2 {
          throw(RxError::user("again"))
        } else {
          of(vec![42])
        }
      })
      .retry(None)
    });
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 42), RT::on_completed(200.)]
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn completion_is_not_retried() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| of(vec![1]).retry(Some(5)));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 1), RT::on_completed(200.)]
    );
  }

  #[test]
  fn zero_attempts_never_subscribe() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_cold_observable(vec![
      RT::on_next(10., 1),
      RT::on_error(20., RxError::user("e")),
    ]);
    let c_xs = xs.clone();
    let observer = scheduler.start(move || c_xs.observable().retry(Some(0)));
    assert_eq!(observer.messages(), vec![RT::on_completed(200.)]);
    assert!(xs.subscriptions().is_empty());
  }
}
