//! Quantified invariants checked over generated inputs.

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

use proptest::prelude::*;
use rxflow::prelude::*;

fn record<T: Value>(source: &Observable<T>) -> Vec<Notification<T>> {
  let log = Arc::new(Mutex::new(vec![]));
  let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
  source.subscribe_all(
    move |v| l1.lock().unwrap().push(Notification::Next(v)),
    move |e| l2.lock().unwrap().push(Notification::Error(e)),
    move || l3.lock().unwrap().push(Notification::Completed),
  );
  let log = log.lock().unwrap().clone();
  log
}

fn event() -> impl Strategy<Value = Notification<i32>> {
  prop_oneof![
    6 => any::<i32>().prop_map(Notification::Next),
    1 => Just(Notification::Error(RxError::user("boom"))),
    1 => Just(Notification::Completed),
  ]
}

fn diagram() -> impl Strategy<Value = String> {
  let element = prop_oneof![
    "[a-z]".prop_map(|s| s),
    ("[a-z]", "[a-z]").prop_map(|(a, b)| format!("({a},{b})")),
  ];
  (prop::collection::vec((0..3usize, element), 0..6), 0..3usize, prop::bool::ANY).prop_map(
    |(elements, tail, fails)| {
      let mut diagram = String::new();
      for (gap, element) in elements {
        diagram.push_str(&"-".repeat(gap));
        diagram.push_str(&element);
      }
      diagram.push_str(&"-".repeat(tail));
      diagram.push(if fails { '#' } else { '|' });
      diagram
    },
  )
}

proptest! {
  #[test]
  fn nothing_follows_a_terminal(script in prop::collection::vec(event(), 0..20)) {
    let source = create(move |observer, _| {
      for n in script.iter().cloned() {
        n.accept(&*observer);
      }
      BoxedDisposable::empty()
    });
    let log = record(&source);
    let terminals = log.iter().filter(|n| n.is_terminal()).count();
    prop_assert!(terminals <= 1);
    if terminals == 1 {
      prop_assert!(log.last().is_some_and(|n| n.is_terminal()));
    }
  }

  #[test]
  fn dispose_is_idempotent(times in 1..5usize) {
    let disposed = Arc::new(AtomicUsize::new(0));
    let c_disposed = disposed.clone();
    let group = CompositeDisposable::new();
    group.add(BoxedDisposable::from_fn(move || {
      c_disposed.fetch_add(1, Ordering::SeqCst);
    }));
    for _ in 0..times {
      group.dispose();
    }
    prop_assert_eq!(disposed.load(Ordering::SeqCst), 1);
    prop_assert!(group.is_disposed());
  }

  #[test]
  fn ref_count_releases_after_every_holder(
    order in (0..6usize).prop_flat_map(|k| Just((0..=k).collect::<Vec<_>>()).prop_shuffle())
  ) {
    let disposed = Arc::new(AtomicUsize::new(0));
    let c_disposed = disposed.clone();
    let refs = RefCountDisposable::new(BoxedDisposable::from_fn(move || {
      c_disposed.fetch_add(1, Ordering::SeqCst);
    }));
    // Slot 0 stands for the primary handle.
    let handles: Vec<BoxedDisposable> = (1..order.len()).map(|_| refs.disposable()).collect();
    for (step, slot) in order.iter().enumerate() {
      prop_assert_eq!(disposed.load(Ordering::SeqCst), 0);
      if *slot == 0 {
        refs.dispose();
      } else {
        handles[slot - 1].dispose();
      }
      if step + 1 < order.len() {
        prop_assert_eq!(disposed.load(Ordering::SeqCst), 0);
      }
    }
    prop_assert_eq!(disposed.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn materialize_round_trips(values in prop::collection::vec(any::<i32>(), 0..20), fails in prop::bool::ANY) {
    let tail = if fails { throw(RxError::user("tail")) } else { empty() };
    let source = concat(vec![from_iter(values), tail]);
    prop_assert_eq!(record(&source.clone().materialize().dematerialize()), record(&source));
  }

  #[test]
  fn take_is_bounded(values in prop::collection::vec(any::<i32>(), 0..20), n in 0..25usize) {
    let log = record(&from_iter(values.clone()).take(n));
    let nexts = log.iter().filter(|n| !n.is_terminal()).count();
    prop_assert!(nexts <= n);
    prop_assert_eq!(nexts, n.min(values.len()));
    prop_assert_eq!(log.last(), Some(&Notification::Completed));
  }

  #[test]
  fn scan_matches_running_fold(values in prop::collection::vec(any::<i64>(), 0..20), seed in any::<i64>()) {
    let step = |acc: i64, v: i64| acc.wrapping_mul(31).wrapping_add(v);
    let expected: Vec<Notification<i64>> = values
      .iter()
      .scan(seed, |acc, v| {
        *acc = step(*acc, *v);
        Some(Notification::Next(*acc))
      })
      .chain([Notification::Completed])
      .collect();
    prop_assert_eq!(record(&from_iter(values).scan_seed(seed, step)), expected);
  }

  #[test]
  fn marbles_round_trip(diagram in diagram()) {
    let ctx = test_context(1.);
    let xs = ctx.cold(&diagram).unwrap();
    let rendered: Vec<String> = ctx
      .start(move || xs.to_marbles(1., None))
      .into_iter()
      .filter_map(|r| r.notification().and_then(|n| n.value().cloned()))
      .collect();
    prop_assert_eq!(rendered, vec![diagram]);
  }

  #[test]
  fn virtual_runs_are_deterministic(diagram in diagram()) {
    let run = |diagram: &str| {
      let ctx = test_context(10.);
      let xs = ctx.cold(diagram).unwrap();
      ctx.start(move || xs.delay(std::time::Duration::from_millis(15), None).take(3))
    };
    prop_assert_eq!(run(&diagram), run(&diagram));
  }
}
