use crate::{
  disposable::BoxedDisposable,
  observable::{Observable, Value},
};

impl<T: Value> Observable<T> {
  /// Emits `values` synchronously on subscribe, then mirrors the source.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// of(vec![3, 4]).start_with(vec![1, 2]).subscribe(|v| println!("{v}"));
  /// // 1, 2, 3, 4
  /// ```
  pub fn start_with(self, values: Vec<T>) -> Observable<T> {
    Observable::new(move |observer, scheduler| {
      for v in values.iter() {
        if observer.is_closed() {
          return BoxedDisposable::empty();
        }
        observer.on_next(v.clone());
      }
      self.subscribe_with(observer, scheduler)
    })
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn prepends_in_order() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![RT::on_next(250., 3), RT::on_completed(300.)]);
    let observer = scheduler.start(move || xs.observable().start_with(vec![1, 2]));
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(200., 1),
        RT::on_next(200., 2),
        RT::on_next(250., 3),
        RT::on_completed(300.)
      ]
    );
  }

  #[test]
  fn stops_when_downstream_is_done() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| never::<i32>().start_with(vec![1, 2, 3]).take(2));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(200., 1), RT::on_next(200., 2), RT::on_completed(200.)]
    );
  }
}
