//! # rxflow: push-based dataflow with virtual time
//!
//! Composable streams of notifications, a family of stateful operators,
//! and a deterministic virtual-time test harness driven by marble diagrams.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxflow::prelude::*;
//!
//! of(vec![1, 2, 3, 4])
//!   .filter(|v| v % 2 == 0)
//!   .scan(|acc, v| acc + v)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy producer; every subscription runs it anew |
//! | [`Observer`] | Consumes `on_next`, `on_error`, and `on_completed` |
//! | [`Subject`] | An observer that multicasts to its subscribers |
//! | [`Scheduler`] | Where and when work runs, in real or virtual time |
//! | [`BoxedDisposable`] | Handle tearing a subscription down |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): `ThreadPoolScheduler` on a futures
//!   thread pool
//! - **`tokio-scheduler`**: `TokioScheduler` on a tokio runtime
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
//! [`BoxedDisposable`]: disposable::BoxedDisposable

pub mod disposable;
pub mod error;
pub mod marbles;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod testing;

pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
