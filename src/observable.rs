//! Lazy producers of notification streams.
//!
//! An [`Observable`] is a value holding a subscribe function. Every
//! subscription runs that function anew, so observables are cold unless
//! they are fed by a [`Subject`](crate::subject::Subject).

use std::{fmt, sync::Arc};

use tracing::warn;

use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  observer::{unhandled_error, AutoDetachObserver, BoxedObserver, FnObserver, Observer},
  scheduler::SchedulerRef,
};

mod create;
mod defer;
mod of;
mod timer;
mod trivial;

pub use create::create;
pub use defer::{defer, try_defer};
pub use of::{from_iter, just, of};
pub use timer::{interval, timer};
pub use trivial::{empty, never, throw};

/// Bound shared by every item type flowing through a pipeline.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

type SubscribeFn<T> =
  dyn Fn(BoxedObserver<T>, Option<SchedulerRef>) -> BoxedDisposable + Send + Sync;

pub struct Observable<T> {
  subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
  fn clone(&self) -> Self { Self { subscribe_fn: self.subscribe_fn.clone() } }
}

impl<T> fmt::Debug for Observable<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Observable") }
}

impl<T: Value> Observable<T> {
  /// Wraps a subscribe function.
  ///
  /// The function receives the observer and the scheduler passed at
  /// subscribe time, and returns the disposable tearing the subscription
  /// down.
  pub fn new<F>(subscribe: F) -> Self
  where
    F: Fn(BoxedObserver<T>, Option<SchedulerRef>) -> BoxedDisposable + Send + Sync + 'static,
  {
    Self { subscribe_fn: Arc::new(subscribe) }
  }

  /// Subscribes `observer`, wrapped so that it sees at most one terminal
  /// notification and the upstream is released once it does.
  ///
  /// `scheduler` becomes the default scheduler of every operator in the
  /// chain that does not name its own.
  pub fn subscribe_with(
    &self,
    observer: impl Observer<T> + 'static,
    scheduler: Option<SchedulerRef>,
  ) -> BoxedDisposable {
    let observer = Arc::new(AutoDetachObserver::new(Arc::new(observer)));
    let upstream = (self.subscribe_fn)(observer.clone(), scheduler);
    if let Err(err) = observer.set_upstream(upstream) {
      warn!(error = %err, "upstream bound twice");
    }
    BoxedDisposable::from(observer)
  }

  /// Subscribes to values only; errors are logged.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// of(vec![1, 2, 3]).map(|v| v * 10).subscribe(|v| println!("{v}"));
  /// ```
  pub fn subscribe(&self, next: impl Fn(T) + Send + Sync + 'static) -> BoxedDisposable {
    self.subscribe_with(FnObserver::new(next, unhandled_error, || {}), None)
  }

  pub fn subscribe_all(
    &self,
    next: impl Fn(T) + Send + Sync + 'static,
    error: impl Fn(RxError) + Send + Sync + 'static,
    complete: impl Fn() + Send + Sync + 'static,
  ) -> BoxedDisposable {
    self.subscribe_with(FnObserver::new(next, error, complete), None)
  }

  /// Like [`subscribe`](Observable::subscribe), with `scheduler` as the
  /// default scheduler of the chain.
  pub fn subscribe_on_scheduler(
    &self,
    next: impl Fn(T) + Send + Sync + 'static,
    scheduler: SchedulerRef,
  ) -> BoxedDisposable {
    self.subscribe_with(FnObserver::new(next, unhandled_error, || {}), Some(scheduler))
  }

  /// Applies `op` to this observable. Chains of `pipe` calls read left to
  /// right; see also [`pipe!`](crate::pipe).
  #[inline]
  pub fn pipe<U>(self, op: impl FnOnce(Self) -> U) -> U { op(self) }
}

/// Threads an observable through a list of operators, left to right.
///
/// ```
/// use rxflow::{pipe, prelude::*};
///
/// let doubled = pipe!(of(vec![1, 2, 3]), |o: Observable<i32>| o.map(|v| v * 2), |o: Observable<i32>| o.take(2));
/// doubled.subscribe(|v| println!("{v}"));
/// ```
#[macro_export]
macro_rules! pipe {
  ($source:expr $(, $op:expr)* $(,)?) => {{
    let source = $source;
    $(let source = ($op)(source);)*
    source
  }};
}
