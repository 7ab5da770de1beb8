use crate::{
  disposable::BoxedDisposable,
  observable::{Observable, Value},
};

/// Emits each value in order, then completes.
///
/// Emission is synchronous and stops early once the subscriber is closed.
pub fn of<T: Value>(values: Vec<T>) -> Observable<T> { from_iter(values) }

/// Emits a single value, then completes.
pub fn just<T: Value>(value: T) -> Observable<T> { of(vec![value]) }

/// Emits every item of a cloneable iterable, then completes.
pub fn from_iter<T, I>(iter: I) -> Observable<T>
where
  T: Value,
  I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
{
  Observable::new(move |observer, _| {
    for v in iter.clone() {
      if observer.is_closed() {
        return BoxedDisposable::empty();
      }
      observer.on_next(v);
    }
    observer.on_completed();
    BoxedDisposable::empty()
  })
}
