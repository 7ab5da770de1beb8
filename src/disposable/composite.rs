use std::sync::Mutex;

use smallvec::SmallVec;

use super::{BoxedDisposable, Disposable};
use crate::rc::lock;

#[derive(Default)]
struct Inner {
  disposed: bool,
  items: SmallVec<[BoxedDisposable; 2]>,
}

/// A group of disposables torn down together.
///
/// Once disposed, anything added afterwards is disposed on the spot.
#[derive(Default)]
pub struct CompositeDisposable {
  inner: Mutex<Inner>,
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  pub fn add(&self, d: BoxedDisposable) {
    {
      let mut inner = lock(&self.inner);
      if !inner.disposed {
        inner.items.retain(|item| !item.is_disposed());
        inner.items.push(d);
        return;
      }
    }
    d.dispose();
  }

  /// Removes `d` from the group and disposes it. Returns whether it was
  /// found.
  pub fn remove(&self, d: &BoxedDisposable) -> bool {
    let removed = {
      let mut inner = lock(&self.inner);
      let pos = inner.items.iter().position(|item| item.ptr_eq(d));
      pos.map(|idx| inner.items.remove(idx))
    };
    match removed {
      Some(item) => {
        item.dispose();
        true
      }
      None => false,
    }
  }

  /// Disposes every member but keeps the group usable.
  pub fn clear(&self) {
    let items = std::mem::take(&mut lock(&self.inner).items);
    items.iter().for_each(Disposable::dispose);
  }

  pub fn contains(&self, d: &BoxedDisposable) -> bool {
    lock(&self.inner).items.iter().any(|item| item.ptr_eq(d))
  }

  pub fn len(&self) -> usize { lock(&self.inner).items.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    let items = {
      let mut inner = lock(&self.inner);
      if inner.disposed {
        return;
      }
      inner.disposed = true;
      std::mem::take(&mut inner.items)
    };
    items.iter().for_each(Disposable::dispose);
  }

  fn is_disposed(&self) -> bool { lock(&self.inner).disposed }
}
