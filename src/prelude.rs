//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use std::sync::Arc;

// Disposables
pub use crate::disposable::{
  AnonymousDisposable, BooleanDisposable, BoxedDisposable, CompositeDisposable, Disposable,
  DisposeGuard, RefCountDisposable, SerialDisposable, SingleAssignmentDisposable,
};
// Errors
pub use crate::error::{Result, RxError};
// Marble diagrams
pub use crate::marbles::{from_marbles, MarbleOptions, MarbleValue};
pub use crate::notification::Notification;
// Observable and factories
pub use crate::observable::{
  create, defer, empty, from_iter, interval, just, never, of, throw, timer, try_defer, Observable,
  Value,
};
pub use crate::observer::{BoxedObserver, FnObserver, Observer};
// Combining operators
pub use crate::ops::{combine_latest, concat, fork_join, merge};
// Schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{
  ImmediateScheduler, NewThreadScheduler, Scheduler, SchedulerExt, SchedulerRef, StartTimes,
  TestScheduler, VirtualTimeScheduler,
};
// Subjects
pub use crate::subject::{AsyncSubject, BehaviorSubject, ReplaySubject, Subject};
// Test harness
pub use crate::testing::{test_context, ReactiveTest, Recorded};
