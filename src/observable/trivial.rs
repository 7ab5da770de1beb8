use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  observable::{Observable, Value},
};

/// Completes immediately without emitting.
pub fn empty<T: Value>() -> Observable<T> {
  Observable::new(|observer, _| {
    observer.on_completed();
    BoxedDisposable::empty()
  })
}

/// Never emits and never terminates.
pub fn never<T: Value>() -> Observable<T> { Observable::new(|_, _| BoxedDisposable::empty()) }

/// Terminates with `err` immediately.
pub fn throw<T: Value>(err: RxError) -> Observable<T> {
  Observable::new(move |observer, _| {
    observer.on_error(err.clone());
    BoxedDisposable::empty()
  })
}
