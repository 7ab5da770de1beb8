use std::sync::Arc;

use super::{broadcast_terminal, SubjectCore, Terminal};
use crate::{
  error::RxError,
  notification::Notification,
  observable::{Observable, Value},
  observer::Observer,
};

/// Emits only the last value, and only once the input completes.
///
/// Subscribers arriving after completion receive that value and the
/// completion too.
pub struct AsyncSubject<T> {
  core: Arc<SubjectCore<T, Option<T>>>,
}

impl<T> Clone for AsyncSubject<T> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<T: Value> Default for AsyncSubject<T> {
  fn default() -> Self { Self::new() }
}

impl<T: Value> AsyncSubject<T> {
  pub fn new() -> Self { Self { core: SubjectCore::new(None) } }

  pub fn observable(&self) -> Observable<T> {
    let core = self.core.clone();
    Observable::new(move |observer, _| {
      core.subscribe(observer, |last, terminal| match terminal {
        None => vec![],
        Some(Terminal::Completed) => last
          .iter()
          .cloned()
          .map(Notification::Next)
          .chain(Some(Notification::Completed))
          .collect(),
        Some(t) => vec![t.notification()],
      })
    })
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn dispose(&self) { self.core.dispose() }

  pub fn is_disposed(&self) -> bool { self.core.is_disposed() }
}

impl<T: Value> Observer<T> for AsyncSubject<T> {
  fn on_next(&self, value: T) {
    // Stored only; emission waits for completion.
    let _ = self.core.next(&value, |last, v| *last = Some(v.clone()));
  }

  fn on_error(&self, err: RxError) {
    let terminal = Terminal::Error(err);
    if let Some((observers, ())) = self.core.terminate(terminal.clone(), |_| ()) {
      broadcast_terminal(&observers, &terminal);
    }
  }

  fn on_completed(&self) {
    let finished = self.core.terminate(Terminal::Completed, |last| last.clone());
    if let Some((observers, last)) = finished {
      if let Some(last) = last {
        observers.iter().for_each(|o| o.on_next(last.clone()));
      }
      broadcast_terminal(&observers, &Terminal::Completed);
    }
  }
}
