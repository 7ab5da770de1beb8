use crate::{
  error::Result,
  observable::{Observable, Value},
};

impl<T: Value> Observable<T> {
  /// Folds the source into its final accumulation, seeded by the first
  /// value. An empty source fails with
  /// [`RxError::SequenceContainsNoElements`](crate::error::RxError::SequenceContainsNoElements).
  pub fn reduce(self, f: impl Fn(T, T) -> T + Send + Sync + 'static) -> Observable<T> {
    self.scan(f).last()
  }

  /// Folds the source starting from `seed`; an empty source emits `seed`.
  pub fn reduce_seed<A: Value>(
    self,
    seed: A,
    f: impl Fn(A, T) -> A + Send + Sync + 'static,
  ) -> Observable<A> {
    self.scan_seed(seed.clone(), f).last_or_default(seed)
  }

  pub fn try_reduce(self, f: impl Fn(T, T) -> Result<T> + Send + Sync + 'static) -> Observable<T> {
    self.try_scan(f).last()
  }

  pub fn try_reduce_seed<A: Value>(
    self,
    seed: A,
    f: impl Fn(A, T) -> Result<A> + Send + Sync + 'static,
  ) -> Observable<A> {
    self.try_scan_seed(seed.clone(), f).last_or_default(seed)
  }
}
