use std::{fmt, sync::Arc};

use crate::{
  error::RxError,
  observable::{Observable, Value},
  observer::Observer,
  scheduler::{ImmediateScheduler, SchedulerRef},
};

/// One emission of a stream, reified as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
  Next(T),
  Error(RxError),
  Completed,
}

impl<T> Notification<T> {
  /// `'N'`, `'E'` or `'C'`.
  pub fn kind(&self) -> char {
    match self {
      Notification::Next(_) => 'N',
      Notification::Error(_) => 'E',
      Notification::Completed => 'C',
    }
  }

  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  pub fn value(&self) -> Option<&T> {
    match self {
      Notification::Next(v) => Some(v),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&RxError> {
    match self {
      Notification::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Invokes the observer callback matching this notification.
  pub fn accept<O: Observer<T> + ?Sized>(self, observer: &O) {
    match self {
      Notification::Next(v) => observer.on_next(v),
      Notification::Error(e) => observer.on_error(e),
      Notification::Completed => observer.on_completed(),
    }
  }

  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Notification<U> {
    match self {
      Notification::Next(v) => Notification::Next(f(v)),
      Notification::Error(e) => Notification::Error(e),
      Notification::Completed => Notification::Completed,
    }
  }
}

impl<T: Value> Notification<T> {
  /// An observable replaying this notification on `scheduler`, followed by
  /// a completion when it is a `Next`.
  ///
  /// Without an explicit scheduler the subscribe-time scheduler is used,
  /// falling back to [`ImmediateScheduler`].
  pub fn to_observable(self, scheduler: Option<SchedulerRef>) -> Observable<T> {
    Observable::new(move |observer, sub_scheduler| {
      let scheduler = scheduler
        .clone()
        .or(sub_scheduler)
        .unwrap_or_else(|| Arc::new(ImmediateScheduler));
      let notification = self.clone();
      scheduler.schedule(Box::new(move |_| {
        let is_next = !notification.is_terminal();
        notification.accept(&*observer);
        if is_next {
          observer.on_completed();
        }
        None
      }))
    })
  }
}

impl<T: fmt::Display> fmt::Display for Notification<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Notification::Next(v) => write!(f, "OnNext({v})"),
      Notification::Error(e) => write!(f, "OnError({e})"),
      Notification::Completed => write!(f, "OnCompleted()"),
    }
  }
}
