//! Sequential subscription shared by `concat`, `repeat`, `retry` and
//! `while_do`.
//!
//! A [`Sequencer`] subscribes one source at a time. When the current source
//! terminates, its policy decides whether another source follows or the
//! sequence ends. Sources that terminate synchronously are chained through
//! a trampoline, so long repeat chains do not grow the stack.

use std::sync::{Arc, Mutex};

use crate::{
  disposable::{BoxedDisposable, Disposable, SerialDisposable},
  error::RxError,
  observable::{empty, Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  scheduler::SchedulerRef,
  subject::Terminal,
};

pub(crate) enum Step<T> {
  Subscribe(Observable<T>),
  Done(Terminal),
}

type Policy<T> = Box<dyn FnMut(Terminal) -> Step<T> + Send>;

struct Drain<T> {
  pending: Option<Observable<T>>,
  draining: bool,
}

pub(crate) struct Sequencer<T> {
  observer: BoxedObserver<T>,
  scheduler: Option<SchedulerRef>,
  current: Arc<SerialDisposable>,
  drain: Mutex<Drain<T>>,
  policy: Mutex<Policy<T>>,
}

impl<T: Value> Sequencer<T> {
  /// Subscribes `first` and keeps following the policy until it yields a
  /// terminal.
  pub(crate) fn run(
    first: Observable<T>,
    observer: BoxedObserver<T>,
    scheduler: Option<SchedulerRef>,
    policy: impl FnMut(Terminal) -> Step<T> + Send + 'static,
  ) -> BoxedDisposable {
    let current = Arc::new(SerialDisposable::new());
    let sequencer = Arc::new(Sequencer {
      observer,
      scheduler,
      current: current.clone(),
      drain: Mutex::new(Drain { pending: None, draining: false }),
      policy: Mutex::new(Box::new(policy)),
    });
    sequencer.enqueue(first);
    BoxedDisposable::from(current)
  }

  fn enqueue(self: &Arc<Self>, source: Observable<T>) {
    {
      let mut drain = lock(&self.drain);
      drain.pending = Some(source);
      if drain.draining {
        return;
      }
      drain.draining = true;
    }
    loop {
      let next = {
        let mut drain = lock(&self.drain);
        match drain.pending.take() {
          Some(next) if !self.current.is_disposed() && !self.observer.is_closed() => next,
          _ => {
            drain.draining = false;
            return;
          }
        }
      };
      let subscription = next.subscribe_with(SequenceObserver { sequencer: self.clone() }, self.scheduler.clone());
      self.current.set(subscription);
    }
  }

  fn on_terminal(self: &Arc<Self>, terminal: Terminal) {
    let step = (*lock(&self.policy))(terminal);
    match step {
      Step::Subscribe(next) => self.enqueue(next),
      Step::Done(terminal) => {
        match terminal {
          Terminal::Completed => self.observer.on_completed(),
          Terminal::Error(err) => self.observer.on_error(err),
        }
        self.current.dispose();
      }
    }
  }
}

struct SequenceObserver<T> {
  sequencer: Arc<Sequencer<T>>,
}

impl<T: Value> Observer<T> for SequenceObserver<T> {
  fn on_next(&self, value: T) { self.sequencer.observer.on_next(value) }

  fn on_error(&self, err: RxError) { self.sequencer.on_terminal(Terminal::Error(err)) }

  fn on_completed(&self) { self.sequencer.on_terminal(Terminal::Completed) }

  fn is_closed(&self) -> bool { self.sequencer.observer.is_closed() }
}

/// Subscribes each source after the previous one completed. An error ends
/// the whole sequence.
///
/// ```
/// use rxflow::prelude::*;
///
/// concat(vec![of(vec![1, 2]), of(vec![3])]).subscribe(|v| println!("{v}"));
/// // 1, 2, 3
/// ```
pub fn concat<T: Value>(sources: Vec<Observable<T>>) -> Observable<T> {
  if sources.is_empty() {
    return empty();
  }
  Observable::new(move |observer, scheduler| {
    let mut rest = sources.clone().into_iter();
    let Some(first) = rest.next() else { return BoxedDisposable::empty() };
    Sequencer::run(first, observer, scheduler, move |terminal| match terminal {
      Terminal::Completed => match rest.next() {
        Some(next) => Step::Subscribe(next),
        None => Step::Done(Terminal::Completed),
      },
      err => Step::Done(err),
    })
  })
}

impl<T: Value> Observable<T> {
  /// Continues with `other` once this source completed.
  pub fn concat_with(self, other: Observable<T>) -> Observable<T> { concat(vec![self, other]) }
}
