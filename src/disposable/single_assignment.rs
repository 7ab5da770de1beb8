use std::sync::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::{
  error::{Result, RxError},
  rc::lock,
};

#[derive(Default)]
struct Inner {
  disposed: bool,
  assigned: bool,
  current: Option<BoxedDisposable>,
}

/// A slot that accepts exactly one disposable.
///
/// Disposing before assignment makes the later assignment dispose
/// immediately.
#[derive(Default)]
pub struct SingleAssignmentDisposable {
  inner: Mutex<Inner>,
}

impl SingleAssignmentDisposable {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self) -> Option<BoxedDisposable> { lock(&self.inner).current.clone() }

  pub fn set(&self, d: BoxedDisposable) -> Result<()> {
    let dispose_now = {
      let mut inner = lock(&self.inner);
      if inner.assigned {
        return Err(RxError::InvalidState("disposable has already been assigned".into()));
      }
      inner.assigned = true;
      if inner.disposed {
        true
      } else {
        inner.current = Some(d.clone());
        false
      }
    };
    if dispose_now {
      d.dispose();
    }
    Ok(())
  }
}

impl Disposable for SingleAssignmentDisposable {
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
