use std::sync::Arc;

use super::{broadcast, broadcast_terminal, SubjectCore, Terminal};
use crate::{
  error::{Result, RxError},
  notification::Notification,
  observable::{Observable, Value},
  observer::Observer,
};

/// A subject holding a current value. New subscribers receive it first.
///
/// After completion or error, new subscribers only receive that terminal.
pub struct BehaviorSubject<T> {
  core: Arc<SubjectCore<T, T>>,
}

impl<T> Clone for BehaviorSubject<T> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<T: Value> BehaviorSubject<T> {
  pub fn new(value: T) -> Self { Self { core: SubjectCore::new(value) } }

  /// The latest value, or the error the subject terminated with.
  pub fn value(&self) -> Result<T> {
    if self.core.is_disposed() {
      return Err(RxError::disposed());
    }
    self.core.with_extra(|value, terminal| match terminal {
      Some(Terminal::Error(e)) => Err(e.clone()),
      _ => Ok(value.clone()),
    })
  }

  pub fn observable(&self) -> Observable<T> {
    let core = self.core.clone();
    Observable::new(move |observer, _| {
      core.subscribe(observer, |value, terminal| match terminal {
        None => vec![Notification::Next(value.clone())],
        Some(t) => vec![t.notification()],
      })
    })
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn dispose(&self) { self.core.dispose() }

  pub fn is_disposed(&self) -> bool { self.core.is_disposed() }
}

impl<T: Value> Observer<T> for BehaviorSubject<T> {
  fn on_next(&self, value: T) {
    if let Some(observers) = self.core.next(&value, |current, v| *current = v.clone()) {
      broadcast(observers, value);
    }
  }

  fn on_error(&self, err: RxError) {
    let terminal = Terminal::Error(err);
    if let Some((observers, ())) = self.core.terminate(terminal.clone(), |_| ()) {
      broadcast_terminal(&observers, &terminal);
    }
  }

  fn on_completed(&self) {
    if let Some((observers, ())) = self.core.terminate(Terminal::Completed, |_| ()) {
      broadcast_terminal(&observers, &Terminal::Completed);
    }
  }
}

#[cfg(test)]
mod test {
  use std::sync::Mutex;

  use super::*;
  use crate::subject::test::recorder;

  #[test]
  fn replays_current_value() {
    let log = Arc::new(Mutex::new(vec![]));
    let subject = BehaviorSubject::new(0);
    subject.observable().subscribe_with(recorder::<i32>(&log, "a"), None);
    subject.on_next(1);
    subject.observable().subscribe_with(recorder::<i32>(&log, "b"), None);
    subject.on_next(2);
    assert_eq!(subject.value(), Ok(2));
    subject.on_completed();
    subject.observable().subscribe_with(recorder::<i32>(&log, "c"), None);
    assert_eq!(
      *log.lock().unwrap(),
      vec!["a:0", "a:1", "b:1", "a:2", "b:2", "a:done", "b:done", "c:done"]
    );
  }

  #[test]
  fn value_after_error() {
    let subject = BehaviorSubject::new(1);
    subject.on_error(RxError::user("bad"));
    assert_eq!(subject.value(), Err(RxError::user("bad")));
    subject.dispose();
    assert!(matches!(subject.value(), Err(RxError::InvalidState(_))));
  }
}
