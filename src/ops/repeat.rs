use std::sync::Arc;

use crate::{
  disposable::BoxedDisposable,
  observable::{empty, Observable, Value},
  subject::Terminal,
};

use super::sequence::{Sequencer, Step};

impl<T: Value> Observable<T> {
  /// Re-subscribes the source each time it completes, for `count` total
  /// subscriptions, or forever with `None`. Errors end the sequence.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// of(vec![1, 2]).repeat(Some(2)).subscribe(|v| println!("{v}"));
  /// // 1, 2, 1, 2
  /// ```
  pub fn repeat(self, count: Option<usize>) -> Observable<T> {
    if count == Some(0) {
      return empty();
    }
    Observable::new(move |observer, scheduler| {
      let source = self.clone();
      let mut subscribed = 1;
      Sequencer::run(self.clone(), observer, scheduler, move |terminal| match terminal {
        Terminal::Completed if count.map_or(true, |c| subscribed < c) => {
          subscribed += 1;
          Step::Subscribe(source.clone())
        }
        terminal => Step::Done(terminal),
      })
    })
  }

  /// Re-subscribes the source while `condition` holds. The condition is
  /// checked before every subscription, including the first.
  pub fn while_do(self, condition: impl Fn(&Observable<T>) -> bool + Send + Sync + 'static) -> Observable<T> {
    let condition = Arc::new(condition);
    Observable::new(move |observer, scheduler| {
      if !condition(&self) {
        observer.on_completed();
        return BoxedDisposable::empty();
      }
      let source = self.clone();
      let condition = condition.clone();
      Sequencer::run(self.clone(), observer, scheduler, move |terminal| match terminal {
        Terminal::Completed if condition(&source) => Step::Subscribe(source.clone()),
        terminal => Step::Done(terminal),
      })
    })
  }
}
