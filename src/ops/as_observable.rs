use crate::observable::{Observable, Value};

impl<T: Value> Observable<T> {
  /// Wraps the source in a fresh observable that forwards everything.
  pub fn as_observable(self) -> Observable<T> {
    Observable::new(move |observer, scheduler| self.subscribe_with(observer, scheduler))
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn hides_subject() {
    let scheduler = TestScheduler::new();
    let subject = Subject::new();
    let c_subject = subject.clone();
    scheduler.schedule_at(210., move || c_subject.on_next(1));
    let c_subject = subject.clone();
    scheduler.schedule_at(220., move || c_subject.on_completed());
    let observer = scheduler.start(move || subject.observable().as_observable());
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(210., 1), RT::on_completed(220.)]
    );
  }
}
