use std::{fmt, sync::Arc};

use float_cmp::approx_eq;

use crate::{error::RxError, notification::Notification};

pub(crate) fn same_tick(a: f64, b: f64) -> bool {
  a == b || approx_eq!(f64, a, b, epsilon = 1e-9)
}

/// What a [`Recorded`] entry holds: an exact notification, or a predicate
/// matching a value or an error.
pub enum RecordedValue<T> {
  Notification(Notification<T>),
  NextWhere(Arc<dyn Fn(&T) -> bool + Send + Sync>),
  ErrorWhere(Arc<dyn Fn(&RxError) -> bool + Send + Sync>),
}

impl<T: Clone> Clone for RecordedValue<T> {
  fn clone(&self) -> Self {
    match self {
      RecordedValue::Notification(n) => RecordedValue::Notification(n.clone()),
      RecordedValue::NextWhere(p) => RecordedValue::NextWhere(p.clone()),
      RecordedValue::ErrorWhere(p) => RecordedValue::ErrorWhere(p.clone()),
    }
  }
}

impl<T: PartialEq> PartialEq for RecordedValue<T> {
  fn eq(&self, other: &Self) -> bool {
    use Notification as N;
    use RecordedValue as R;
    match (self, other) {
      (R::Notification(a), R::Notification(b)) => a == b,
      (R::NextWhere(p), R::Notification(N::Next(v))) | (R::Notification(N::Next(v)), R::NextWhere(p)) => p(v),
      (R::ErrorWhere(p), R::Notification(N::Error(e))) | (R::Notification(N::Error(e)), R::ErrorWhere(p)) => {
        p(e)
      }
      (R::NextWhere(a), R::NextWhere(b)) => Arc::ptr_eq(a, b),
      (R::ErrorWhere(a), R::ErrorWhere(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for RecordedValue<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecordedValue::Notification(n) => write!(f, "{n:?}"),
      RecordedValue::NextWhere(_) => f.write_str("Next(<predicate>)"),
      RecordedValue::ErrorWhere(_) => f.write_str("Error(<predicate>)"),
    }
  }
}

/// A notification stamped with the virtual tick it was seen at.
///
/// Ticks compare with a small tolerance so diagrams with fractional
/// timespans line up with the recorded clock.
#[derive(Clone)]
pub struct Recorded<T> {
  pub time: f64,
  pub value: RecordedValue<T>,
}

impl<T> Recorded<T> {
  pub fn new(time: f64, value: RecordedValue<T>) -> Self { Self { time, value } }

  pub fn next(time: f64, value: T) -> Self {
    Self::new(time, RecordedValue::Notification(Notification::Next(value)))
  }

  pub fn error(time: f64, err: RxError) -> Self {
    Self::new(time, RecordedValue::Notification(Notification::Error(err)))
  }

  pub fn completed(time: f64) -> Self {
    Self::new(time, RecordedValue::Notification(Notification::Completed))
  }

  /// The exact notification, or `None` for predicate entries.
  pub fn notification(&self) -> Option<&Notification<T>> {
    match &self.value {
      RecordedValue::Notification(n) => Some(n),
      _ => None,
    }
  }
}

impl<T: PartialEq> PartialEq for Recorded<T> {
  fn eq(&self, other: &Self) -> bool { same_tick(self.time, other.time) && self.value == other.value }
}

impl<T: fmt::Debug> fmt::Debug for Recorded<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}@{}", self.value, self.time)
  }
}

/// Subscribe and unsubscribe ticks of one subscription to a scripted
/// source. `unsubscribe` stays infinite while the subscription is live.
#[derive(Clone, Copy)]
pub struct Subscription {
  pub subscribe: f64,
  pub unsubscribe: f64,
}

impl Subscription {
  pub fn new(subscribe: f64, unsubscribe: f64) -> Self { Self { subscribe, unsubscribe } }
}

impl PartialEq for Subscription {
  fn eq(&self, other: &Self) -> bool {
    same_tick(self.subscribe, other.subscribe) && same_tick(self.unsubscribe, other.unsubscribe)
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Subscription({}, {})", self.subscribe, self.unsubscribe)
  }
}
