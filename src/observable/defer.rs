use crate::{
  disposable::BoxedDisposable,
  error::Result,
  observable::{Observable, Value},
};

/// Calls `factory` on every subscription and subscribes to what it returns.
pub fn defer<T, F>(factory: F) -> Observable<T>
where
  T: Value,
  F: Fn() -> Observable<T> + Send + Sync + 'static,
{
  Observable::new(move |observer, scheduler| factory().subscribe_with(observer, scheduler))
}

/// Like [`defer`], forwarding a factory failure as the stream error.
pub fn try_defer<T, F>(factory: F) -> Observable<T>
where
  T: Value,
  F: Fn() -> Result<Observable<T>> + Send + Sync + 'static,
{
  Observable::new(move |observer, scheduler| match factory() {
    Ok(source) => source.subscribe_with(observer, scheduler),
    Err(err) => {
      observer.on_error(err);
      BoxedDisposable::empty()
    }
  })
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use super::*;
  use crate::{error::RxError, observable::just};

  #[test]
  fn factory_per_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c_calls = calls.clone();
    let source = defer(move || just(c_calls.fetch_add(1, Ordering::SeqCst)));
    let seen = Arc::new(Mutex::new(vec![]));
    let (s1, s2) = (seen.clone(), seen.clone());
    source.subscribe(move |v| s1.lock().unwrap().push(v));
    source.subscribe(move |v| s2.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
  }

  #[test]
  fn factory_error() {
    let err = Arc::new(Mutex::new(None));
    let c_err = err.clone();
    try_defer::<i32, _>(|| Err(RxError::user("no source")))
      .subscribe_all(|_| {}, move |e| *c_err.lock().unwrap() = Some(e), || {});
    assert_eq!(*err.lock().unwrap(), Some(RxError::user("no source")));
  }
}
