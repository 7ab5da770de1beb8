use crate::observable::{Observable, Value};

impl<T: Value> Observable<T> {
  /// Maps every value to an observable and merges their output.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// of(vec![1, 2])
  ///   .flat_map(|v| of(vec![v, v * 10]))
  ///   .subscribe(|v| println!("{v}"));
  /// ```
  pub fn flat_map<U: Value>(
    self,
    f: impl Fn(T) -> Observable<U> + Send + Sync + 'static,
  ) -> Observable<U> {
    self.map(f).merge_all(usize::MAX)
  }

  /// Like [`flat_map`](Observable::flat_map), subscribing one inner
  /// observable at a time in arrival order.
  pub fn concat_map<U: Value>(
    self,
    f: impl Fn(T) -> Observable<U> + Send + Sync + 'static,
  ) -> Observable<U> {
    self.map(f).merge_all(1)
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn inner_streams_overlap() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 1u64),
      RT::on_next(220., 2u64),
      RT::on_completed(230.),
    ]);
    let c_scheduler = scheduler.clone();
    let observer = scheduler.start(move || {
      xs.observable().flat_map(move |v| {
        c_scheduler.create_cold_observable(vec![
          RT::on_next(5., v),
          RT::on_next(15., v * 10),
          RT::on_completed(20.),
        ])
        .observable()
      })
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(215., 1),
        RT::on_next(225., 10),
        RT::on_next(225., 2),
        RT::on_next(235., 20),
        RT::on_completed(240.)
      ]
    );
  }

  #[test]
  fn concat_map_keeps_order() {
    let scheduler = TestScheduler::new();
    let c_scheduler = scheduler.clone();
    let observer = scheduler.start(move || {
      of(vec![1, 2]).concat_map(move |v| {
        c_scheduler
          .create_cold_observable(vec![RT::on_next(10., v), RT::on_completed(10.)])
          .observable()
      })
    });
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(210., 1), RT::on_next(220., 2), RT::on_completed(220.)]
    );
  }
}
