use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc, Mutex,
};

use super::{BoxedDisposable, Disposable};
use crate::rc::lock;

struct State {
  underlying: Option<BoxedDisposable>,
  count: usize,
  primary_disposed: bool,
}

impl State {
  /// Hands back the underlying disposable once nothing refers to it.
  fn release(&mut self) -> Option<BoxedDisposable> {
    if self.primary_disposed && self.count == 0 {
      self.underlying.take()
    } else {
      None
    }
  }
}

/// Keeps an underlying disposable alive while inner references are out.
///
/// The underlying is disposed exactly once, after the primary handle was
/// disposed and every inner reference returned by [`disposable`] was
/// disposed too.
///
/// [`disposable`]: RefCountDisposable::disposable
pub struct RefCountDisposable {
  state: Arc<Mutex<State>>,
}

impl RefCountDisposable {
  pub fn new(underlying: BoxedDisposable) -> Self {
    let state = State {
      underlying: Some(underlying),
      count: 0,
      primary_disposed: false,
    };
    Self { state: Arc::new(Mutex::new(state)) }
  }

  /// Takes a new inner reference. After the primary was disposed this
  /// returns a disposable that does nothing.
  pub fn disposable(&self) -> BoxedDisposable {
    let mut state = lock(&self.state);
    if state.primary_disposed || state.underlying.is_none() {
      return BoxedDisposable::empty();
    }
    state.count += 1;
    BoxedDisposable::new(InnerRef {
      state: self.state.clone(),
      disposed: AtomicBool::new(false),
    })
  }

  /// Number of inner references not yet disposed.
  pub fn ref_count(&self) -> usize { lock(&self.state).count }
}

impl Disposable for RefCountDisposable {
  fn dispose(&self) {
    let underlying = {
      let mut state = lock(&self.state);
      if state.primary_disposed {
        return;
      }
      state.primary_disposed = true;
      state.release()
    };
    if let Some(d) = underlying {
      d.dispose();
    }
  }

  /// True once the underlying disposable has been released.
  fn is_disposed(&self) -> bool { lock(&self.state).underlying.is_none() }
}

struct InnerRef {
  state: Arc<Mutex<State>>,
  disposed: AtomicBool,
}

impl Disposable for InnerRef {
  fn dispose(&self) {
    if self.disposed.swap(true, Ordering::AcqRel) {
      return;
    }
    let underlying = {
      let mut state = lock(&self.state);
      state.count -= 1;
      state.release()
    };
    if let Some(d) = underlying {
      d.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}
