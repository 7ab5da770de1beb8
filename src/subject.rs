//! Multicast hubs that are observers and observable sources at once.
//!
//! Every subject keeps its subscribers behind one lock and emits against a
//! snapshot of them, so subscribing or unsubscribing from inside a callback
//! is safe. Once a subject saw a terminal notification its subscriber list
//! is cleared. After [`dispose`](Subject::dispose) further input is ignored
//! and new subscribers receive [`RxError::InvalidState`].

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  notification::Notification,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
};

mod async_subject;
mod behavior_subject;
mod replay_subject;

pub use async_subject::AsyncSubject;
pub use behavior_subject::BehaviorSubject;
pub use replay_subject::ReplaySubject;

// ==================== Shared core ====================

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Terminal {
  Completed,
  Error(RxError),
}

impl Terminal {
  pub(crate) fn notification<T>(&self) -> Notification<T> {
    match self {
      Terminal::Completed => Notification::Completed,
      Terminal::Error(e) => Notification::Error(e.clone()),
    }
  }
}

/// Registry and lifecycle flags of a subject, plus variant-specific
/// `extra` state guarded by the same lock.
pub(crate) struct Subscribers<T, S> {
  observers: Vec<(u64, BoxedObserver<T>)>,
  next_id: u64,
  pub(crate) terminal: Option<Terminal>,
  disposed: bool,
  pub(crate) extra: S,
}

pub(crate) struct SubjectCore<T, S> {
  state: Mutex<Subscribers<T, S>>,
}

impl<T: Value, S: Send + 'static> SubjectCore<T, S> {
  pub(crate) fn new(extra: S) -> Arc<Self> {
    Arc::new(Self {
      state: Mutex::new(Subscribers {
        observers: vec![],
        next_id: 0,
        terminal: None,
        disposed: false,
        extra,
      }),
    })
  }

  /// Snapshot of live observers after `record` ran, or `None` when the
  /// subject no longer accepts input.
  pub(crate) fn next(&self, value: &T, record: impl FnOnce(&mut S, &T)) -> Option<Vec<BoxedObserver<T>>> {
    let mut state = lock(&self.state);
    if state.disposed {
      warn!("on_next called on a disposed subject");
      return None;
    }
    if state.terminal.is_some() {
      return None;
    }
    record(&mut state.extra, value);
    Some(state.observers.iter().map(|(_, o)| o.clone()).collect())
  }

  /// Marks the subject terminated and hands back the detached observers
  /// together with whatever `finish` extracts from the extra state.
  pub(crate) fn terminate<R>(
    &self,
    terminal: Terminal,
    finish: impl FnOnce(&mut S) -> R,
  ) -> Option<(Vec<BoxedObserver<T>>, R)> {
    let mut state = lock(&self.state);
    if state.disposed {
      warn!("terminal notification sent to a disposed subject");
      return None;
    }
    if state.terminal.is_some() {
      return None;
    }
    state.terminal = Some(terminal);
    let observers = std::mem::take(&mut state.observers);
    let extra = finish(&mut state.extra);
    Some((observers.into_iter().map(|(_, o)| o).collect(), extra))
  }

  /// Registers `observer` unless the subject terminated, replaying what
  /// `replay` produces from the current state.
  pub(crate) fn subscribe(
    self: &Arc<Self>,
    observer: BoxedObserver<T>,
    replay: impl FnOnce(&S, Option<&Terminal>) -> Vec<Notification<T>>,
  ) -> BoxedDisposable {
    let (id, backlog) = {
      let mut state = lock(&self.state);
      if state.disposed {
        drop(state);
        observer.on_error(RxError::disposed());
        return BoxedDisposable::empty();
      }
      let backlog = replay(&state.extra, state.terminal.as_ref());
      let id = if state.terminal.is_none() {
        let id = state.next_id;
        state.next_id += 1;
        state.observers.push((id, observer.clone()));
        Some(id)
      } else {
        None
      };
      (id, backlog)
    };
    for n in backlog {
      n.accept(&*observer);
    }
    match id {
      Some(id) => {
        let core = Arc::downgrade(self);
        BoxedDisposable::from_fn(move || {
          if let Some(core) = core.upgrade() {
            lock(&core.state).observers.retain(|(i, _)| *i != id);
          }
        })
      }
      None => BoxedDisposable::empty(),
    }
  }

  pub(crate) fn with_extra<R>(&self, f: impl FnOnce(&S, Option<&Terminal>) -> R) -> R {
    let state = lock(&self.state);
    f(&state.extra, state.terminal.as_ref())
  }

  pub(crate) fn observer_count(&self) -> usize { lock(&self.state).observers.len() }

  pub(crate) fn dispose(&self) {
    let mut state = lock(&self.state);
    state.disposed = true;
    state.observers.clear();
  }

  pub(crate) fn is_disposed(&self) -> bool { lock(&self.state).disposed }
}

pub(crate) fn broadcast<T: Clone>(observers: Vec<BoxedObserver<T>>, value: T) {
  if let Some((last, rest)) = observers.split_last() {
    rest.iter().for_each(|o| o.on_next(value.clone()));
    last.on_next(value);
  }
}

pub(crate) fn broadcast_terminal<T>(observers: &[BoxedObserver<T>], terminal: &Terminal) {
  for o in observers {
    match terminal {
      Terminal::Completed => o.on_completed(),
      Terminal::Error(e) => o.on_error(e.clone()),
    }
  }
}

// ==================== Subject ====================

/// A plain multicast subject.
///
/// Subscribers only see what is emitted while they are attached; a
/// subscriber arriving after the terminal notification receives nothing.
///
/// ```
/// use rxflow::prelude::*;
///
/// let subject = Subject::new();
/// subject.observable().subscribe(|v: i32| println!("first {v}"));
/// subject.on_next(1);
/// subject.observable().subscribe(|v| println!("second {v}"));
/// subject.on_next(2);
/// subject.on_completed();
/// ```
pub struct Subject<T> {
  core: Arc<SubjectCore<T, ()>>,
}

impl<T> Clone for Subject<T> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<T: Value> Default for Subject<T> {
  fn default() -> Self { Self::new() }
}

impl<T: Value> Subject<T> {
  pub fn new() -> Self { Self { core: SubjectCore::new(()) } }

  /// The subject as a source. Each subscription attaches one observer.
  pub fn observable(&self) -> Observable<T> {
    let core = self.core.clone();
    Observable::new(move |observer, _| core.subscribe(observer, |_, _| vec![]))
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  pub fn has_observers(&self) -> bool { self.observer_count() > 0 }

  /// Detaches every observer and rejects further use.
  pub fn dispose(&self) { self.core.dispose() }

  pub fn is_disposed(&self) -> bool { self.core.is_disposed() }
}

impl<T: Value> Observer<T> for Subject<T> {
  fn on_next(&self, value: T) {
    if let Some(observers) = self.core.next(&value, |_, _| {}) {
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

  fn is_closed(&self) -> bool { self.core.with_extra(|_, t| t.is_some()) || self.is_disposed() }
}

impl<T: Value> From<Subject<T>> for Observable<T> {
  fn from(subject: Subject<T>) -> Self { subject.observable() }
}
