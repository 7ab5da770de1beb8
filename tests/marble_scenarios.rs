//! End-to-end scenarios driven by marble diagrams on virtual time.

use std::time::Duration;

use rxflow::{
  marbles::{parse, MarbleOptions, MarbleValue},
  prelude::*,
  testing::ReactiveTest as RT,
};

fn approx_eq(expected: f64, actual: f64) -> bool { (expected - actual).abs() <= 1e-9 }

#[test]
fn debounce_keeps_the_last_of_each_burst() {
  let ctx = test_context(1.);
  let xs = ctx.hot("-a--------b------c----|").unwrap();
  let actual = ctx.start(move || xs.debounce(Duration::from_millis(5), None));
  assert_eq!(actual, ctx.exp("------a--------b------(c|)").unwrap());
}

#[test]
fn flat_map_fans_out_into_nested_colds() {
  let ctx = test_context(1.);
  let e1 = ctx.hot("-a---b-----------c-------d------------|").unwrap();
  let a = ctx.cold("----a---a----a----(a,|)").unwrap();
  let b = ctx.cold("    ----1----b----(b,|)").unwrap();
  let c = ctx.cold("                -------c---c---c----c---(c,|)").unwrap();
  let d = ctx.cold("                        -------(d,|)").unwrap();
  let actual = ctx.start(move || {
    e1.flat_map(move |v| match v.to_string().as_str() {
      "a" => a.clone(),
      "b" => b.clone(),
      "c" => c.clone(),
      _ => d.clone(),
    })
  });
  assert_eq!(actual, ctx.exp("-----a---(a,1)(a,b)(a,b)c---c---(c,d)c---(c,|)").unwrap());
}

#[test]
fn fractional_timespan_parses() {
  let messages = parse("a--b---c", &MarbleOptions::default().timespan(0.1)).unwrap();
  let expected = [(0.0, "a"), (0.3, "b"), (0.7, "c")];
  for ((time, n), (t, v)) in messages.iter().zip(expected) {
    assert!(approx_eq(t, *time), "{time} != {t}");
    assert_eq!(n, &Notification::Next(MarbleValue::from(v)));
  }
  assert_eq!(messages[3], (f64::INFINITY, Notification::Completed));
  assert_eq!(messages.len(), 4);
}

#[test]
fn lone_error_fires_at_subscription() {
  let ctx = test_context(1.);
  let xs = ctx.cold("#").unwrap();
  assert_eq!(ctx.start(move || xs), vec![RT::on_error(200., RxError::user("error"))]);
}

#[test]
fn overlapping_count_windows() {
  let scheduler = TestScheduler::new();
  let observer = scheduler.start(|| {
    of(vec![1, 2, 3, 4, 5, 6])
      .window_with_count(3, 2)
      .unwrap()
      .flat_map(|w| w.to_vec())
  });
  let windows: Vec<Vec<i32>> = observer
    .messages()
    .into_iter()
    .filter_map(|r| r.notification().and_then(|n| n.value().cloned()))
    .filter(|w| !w.is_empty())
    .collect();
  assert_eq!(windows, vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6]]);
  assert_eq!(observer.messages().last(), Some(&RT::on_completed(200.)));
}

#[test]
fn retry_resubscribes_until_exhausted() {
  let ctx = test_context(1.);
  let xs = ctx.cold("a-b-#").unwrap();
  let actual = ctx.start(move || xs.retry(Some(3)));
  assert_eq!(actual, ctx.exp("a-b-a-b-a-b-#").unwrap());
  let values = actual.iter().filter(|r| r.notification().is_some_and(|n| !n.is_terminal())).count();
  assert_eq!(values, 6);
}

#[test]
fn diagrams_survive_a_round_trip() {
  let ctx = test_context(1.);
  let diagram = "--a-(b,c)--12---#";
  let xs = ctx.cold(diagram).unwrap();
  let actual = ctx.start(move || xs.to_marbles(1., None));
  assert_eq!(
    actual,
    vec![RT::on_next(216., diagram.to_string()), RT::on_completed(216.)]
  );
}

#[test]
fn combine_latest_then_concat() {
  let ctx = test_context(10.);
  let xs = ctx.hot("-1--3-|").unwrap();
  let ys = ctx.hot("--2---|").unwrap();
  let tail = ctx.cold("(9|)").unwrap();
  let actual = ctx.start(move || {
    combine_latest(vec![xs, ys])
      .map(|v| MarbleValue::from(v.iter().map(ToString::to_string).collect::<String>()))
      .concat_with(tail)
  });
  assert_eq!(
    actual,
    vec![
      RT::on_next(220., MarbleValue::from("12")),
      RT::on_next(240., MarbleValue::from("32")),
      RT::on_next(260., MarbleValue::Int(9)),
      RT::on_completed(260.)
    ]
  );
}
