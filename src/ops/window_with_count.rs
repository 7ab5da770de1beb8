//! Count-based windowing, plus the reference-counted window wrapper the
//! time-based window operators share.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, RefCountDisposable, SingleAssignmentDisposable},
  error::{Result, RxError},
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  subject::Subject,
};

/// Exposes `window` so that every subscription to it holds a reference on
/// `refs`, keeping the upstream alive until the last window subscriber
/// leaves.
pub(crate) fn add_ref<T: Value>(window: Observable<T>, refs: Arc<RefCountDisposable>) -> Observable<T> {
  Observable::new(move |observer, scheduler| {
    let group = CompositeDisposable::new();
    group.add(refs.disposable());
    group.add(window.subscribe_with(observer, scheduler));
    BoxedDisposable::new(group)
  })
}

/// Opens a window subject, hands it downstream and returns it.
pub(crate) fn open_window<T: Value>(
  observer: &BoxedObserver<Observable<T>>,
  refs: &Arc<RefCountDisposable>,
) -> Subject<T> {
  let window = Subject::new();
  observer.on_next(add_ref(window.observable(), refs.clone()));
  window
}

struct CountWindows<T> {
  windows: VecDeque<Subject<T>>,
  seen: usize,
}

pub struct WindowWithCountObserver<T> {
  observer: BoxedObserver<Observable<T>>,
  refs: Arc<RefCountDisposable>,
  count: usize,
  skip: usize,
  state: Mutex<CountWindows<T>>,
}

impl<T: Value> Observer<T> for WindowWithCountObserver<T> {
  fn on_next(&self, value: T) {
    let mut state = lock(&self.state);
    for w in state.windows.iter() {
      w.on_next(value.clone());
    }
    // Index of the window that just reached `count` items, counted in skips.
    let filled = state.seen as isize - self.count as isize + 1;
    if filled >= 0 && filled as usize % self.skip == 0 {
      if let Some(w) = state.windows.pop_front() {
        w.on_completed();
      }
    }
    state.seen += 1;
    if state.seen % self.skip == 0 {
      let window = open_window(&self.observer, &self.refs);
      state.windows.push_back(window);
    }
  }

  fn on_error(&self, err: RxError) {
    let mut state = lock(&self.state);
    for w in state.windows.drain(..) {
      w.on_error(err.clone());
    }
    self.observer.on_error(err);
  }

  fn on_completed(&self) {
    let mut state = lock(&self.state);
    for w in state.windows.drain(..) {
      w.on_completed();
    }
    self.observer.on_completed();
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<T: Value> Observable<T> {
  /// Splits the source into windows of `count` items, opening a new window
  /// every `skip` items. `skip < count` gives overlapping windows,
  /// `skip > count` drops the items in between.
  ///
  /// Fails with [`RxError::ArgumentOutOfRange`] when `count` or `skip` is
  /// zero.
  ///
  /// ```
  /// use rxflow::prelude::*;
  ///
  /// from_iter(1..=5)
  ///   .window_with_count(2, 2)
  ///   .unwrap()
  ///   .flat_map(|w| w.to_vec())
  ///   .subscribe(|w| println!("{w:?}"));
  /// // [1, 2], [3, 4], [5]
  /// ```
  pub fn window_with_count(self, count: usize, skip: usize) -> Result<Observable<Observable<T>>> {
    if count == 0 {
      return Err(RxError::out_of_range("window count must be greater than zero"));
    }
    if skip == 0 {
      return Err(RxError::out_of_range("window skip must be greater than zero"));
    }
    Ok(Observable::new(move |observer, scheduler| {
      let upstream = Arc::new(SingleAssignmentDisposable::new());
      let refs = Arc::new(RefCountDisposable::new(BoxedDisposable::from(upstream.clone())));
      let first = open_window(&observer, &refs);
      let windows = WindowWithCountObserver {
        observer,
        refs: refs.clone(),
        count,
        skip,
        state: Mutex::new(CountWindows { windows: VecDeque::from([first]), seen: 0 }),
      };
      // Only fails if the whole chain was already torn down.
      let _ = upstream.set(self.subscribe_with(windows, scheduler));
      BoxedDisposable::from(refs)
    }))
  }
}

#[cfg(test)]
mod test {
  use crate::{prelude::*, testing::ReactiveTest as RT};

  #[test]
  fn overlapping_windows() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      from_iter(1..=6)
        .window_with_count(3, 2)
        .unwrap()
        .flat_map(|w| w.to_vec())
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(200., vec![1, 2, 3]),
        RT::on_next(200., vec![3, 4, 5]),
        RT::on_next(200., vec![5, 6]),
        RT::on_next(200., vec![]),
        RT::on_completed(200.)
      ]
    );
  }

  #[test]
  fn skipping_windows() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      from_iter(1..=7)
        .window_with_count(2, 3)
        .unwrap()
        .flat_map(|w| w.to_vec())
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(200., vec![1, 2]),
        RT::on_next(200., vec![4, 5]),
        RT::on_next(200., vec![7]),
        RT::on_completed(200.)
      ]
    );
  }

  #[test]
  fn windows_follow_time() {
    let scheduler = TestScheduler::new();
    let xs = scheduler.create_hot_observable(vec![
      RT::on_next(210., 1),
      RT::on_next(220., 2),
      RT::on_next(230., 3),
      RT::on_error(240., RxError::user("e")),
    ]);
    let observer = scheduler.start(move || {
      xs.observable()
        .window_with_count(2, 2)
        .unwrap()
        .flat_map(|w| w.count())
    });
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(220., 2), RT::on_error(240., RxError::user("e"))]
    );
  }

  #[test]
  fn zero_arguments_rejected() {
    assert!(matches!(
      of(vec![1]).window_with_count(0, 1),
      Err(RxError::ArgumentOutOfRange(_))
    ));
    assert!(matches!(
      of(vec![1]).window_with_count(1, 0),
      Err(RxError::ArgumentOutOfRange(_))
    ));
  }
}
