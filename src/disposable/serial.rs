use std::sync::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::rc::lock;

#[derive(Default)]
struct Inner {
  disposed: bool,
  current: Option<BoxedDisposable>,
}

/// A slot whose content is replaced over time. Replacing disposes the
/// previous occupant.
#[derive(Default)]
pub struct SerialDisposable {
  inner: Mutex<Inner>,
}

impl SerialDisposable {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self) -> Option<BoxedDisposable> { lock(&self.inner).current.clone() }

  pub fn set(&self, d: BoxedDisposable) {
    let old = {
      let mut inner = lock(&self.inner);
      if inner.disposed {
        Some(d)
      } else {
        inner.current.replace(d)
      }
    };
    if let Some(old) = old {
      old.dispose();
    }
  }
}

impl Disposable for SerialDisposable {
  fn dispose(&self) {
    let current = {
      let mut inner = lock(&self.inner);
      inner.disposed = true;
      inner.current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  fn is_disposed(&self) -> bool { lock(&self.inner).disposed }
}
