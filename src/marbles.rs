//! Marble diagrams: a compact text notation for timed streams.
//!
//! | Symbol    | Meaning                                                   |
//! |-----------|-----------------------------------------------------------|
//! | `-`       | one frame passes                                          |
//! | `a`, `12` | a value; every character of it takes one frame            |
//! | `\|`      | completion                                                |
//! | `#`       | error                                                     |
//! | `(a,b)`   | a group: all members share the frame of the `(`           |
//! | space     | ignored, useful to align diagrams                         |
//!
//! Tokens made of digits become [`MarbleValue::Int`], numeric tokens with a
//! decimal point or exponent become [`MarbleValue::Float`], and anything
//! else is a [`MarbleValue::Str`]. A frame lasts `timespan` ticks.
//!
//! ```
//! use rxflow::{marbles::{parse, MarbleOptions, MarbleValue}, prelude::*};
//!
//! let messages = parse("-a-(b,1)|", &MarbleOptions::default()).unwrap();
//! assert_eq!(messages[0], (1., Notification::Next(MarbleValue::from("a"))));
//! assert_eq!(messages[2], (3., Notification::Next(MarbleValue::Int(1))));
//! assert_eq!(messages[3], (8., Notification::Completed));
//! ```

use std::{collections::HashMap, fmt, sync::Arc, sync::Mutex, time::Duration};

use crate::{
  disposable::{BoxedDisposable, CompositeDisposable},
  error::{Result, RxError},
  notification::Notification,
  observable::{Observable, Value},
  observer::{BoxedObserver, Observer},
  rc::lock,
  scheduler::{from_ticks, resolve, to_ticks, SchedulerExt, SchedulerRef},
  subject::Subject,
};

/// A value parsed out of a marble diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum MarbleValue {
  Int(i64),
  Float(f64),
  Str(String),
  Bool(bool),
}

impl fmt::Display for MarbleValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MarbleValue::Int(v) => write!(f, "{v}"),
      MarbleValue::Float(v) => write!(f, "{v}"),
      MarbleValue::Str(v) => f.write_str(v),
      MarbleValue::Bool(true) => f.write_str("T"),
      MarbleValue::Bool(false) => f.write_str("F"),
    }
  }
}

impl From<i64> for MarbleValue {
  fn from(v: i64) -> Self { MarbleValue::Int(v) }
}

impl From<f64> for MarbleValue {
  fn from(v: f64) -> Self { MarbleValue::Float(v) }
}

impl From<bool> for MarbleValue {
  fn from(v: bool) -> Self { MarbleValue::Bool(v) }
}

impl From<&str> for MarbleValue {
  fn from(v: &str) -> Self { MarbleValue::Str(v.to_owned()) }
}

impl From<String> for MarbleValue {
  fn from(v: String) -> Self { MarbleValue::Str(v) }
}

/// How a diagram is turned into timed notifications.
#[derive(Debug, Clone)]
pub struct MarbleOptions {
  /// Ticks per frame.
  pub timespan: f64,
  /// Ticks added to every event.
  pub time_shift: f64,
  /// Replaces tokens by arbitrary values, matched on the raw token text.
  pub lookup: HashMap<String, MarbleValue>,
  /// Payload of `#`; defaults to a user error reading "error".
  pub error: Option<RxError>,
  /// Reject diagrams declaring events after `|` or `#`.
  pub raise_stopped: bool,
  /// Read the tokens `T` and `F` as booleans.
  pub booleans: bool,
}

impl Default for MarbleOptions {
  fn default() -> Self {
    Self {
      timespan: 1.,
      time_shift: 0.,
      lookup: HashMap::new(),
      error: None,
      raise_stopped: false,
      booleans: false,
    }
  }
}

impl MarbleOptions {
  pub fn timespan(mut self, timespan: f64) -> Self {
    self.timespan = timespan;
    self
  }

  pub fn time_shift(mut self, time_shift: f64) -> Self {
    self.time_shift = time_shift;
    self
  }

  pub fn lookup(mut self, token: impl Into<String>, value: impl Into<MarbleValue>) -> Self {
    self.lookup.insert(token.into(), value.into());
    self
  }

  pub fn error(mut self, error: RxError) -> Self {
    self.error = Some(error);
    self
  }

  pub fn raise_stopped(mut self, raise: bool) -> Self {
    self.raise_stopped = raise;
    self
  }

  pub fn booleans(mut self, booleans: bool) -> Self {
    self.booleans = booleans;
    self
  }

  fn error_payload(&self) -> RxError { self.error.clone().unwrap_or_else(|| RxError::user("error")) }

  fn value_of(&self, token: &str) -> MarbleValue {
    if let Some(v) = self.lookup.get(token) {
      return v.clone();
    }
    match token {
      "T" if self.booleans => MarbleValue::Bool(true),
      "F" if self.booleans => MarbleValue::Bool(false),
      _ => classify(token),
    }
  }
}

fn classify(token: &str) -> MarbleValue {
  let digits = token.strip_prefix(&['-', '+'][..]).unwrap_or(token);
  if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
    if let Ok(v) = token.parse() {
      return MarbleValue::Int(v);
    }
  }
  let numeric = token.bytes().any(|b| b.is_ascii_digit())
    && token.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
  if numeric {
    if let Ok(v) = token.parse() {
      return MarbleValue::Float(v);
    }
  }
  MarbleValue::Str(token.to_owned())
}

// ==================== Lexer ====================

struct Token {
  frame: usize,
  text: String,
}

fn is_special(c: char) -> bool { matches!(c, '-' | '|' | '#' | '(' | ')' | ',') }

fn split_group(body: &[char], frame: usize, tokens: &mut Vec<Token>) {
  let mut current = String::new();
  let flush = |current: &mut String, tokens: &mut Vec<Token>| {
    if !current.is_empty() {
      tokens.push(Token { frame, text: std::mem::take(current) });
    }
  };
  for &c in body {
    match c {
      ',' => flush(&mut current, tokens),
      '|' | '#' => {
        flush(&mut current, tokens);
        tokens.push(Token { frame, text: c.to_string() });
      }
      c => current.push(c),
    }
  }
  flush(&mut current, tokens);
}

fn tokenize(diagram: &str) -> Result<Vec<Token>> {
  let chars: Vec<char> = diagram.chars().filter(|c| !c.is_whitespace()).collect();
  let mut tokens = vec![];
  let mut frame = 0;
  let mut i = 0;
  while i < chars.len() {
    match chars[i] {
      '-' => {
        frame += 1;
        i += 1;
      }
      c @ ('|' | '#') => {
        tokens.push(Token { frame, text: c.to_string() });
        frame += 1;
        i += 1;
      }
      ',' => {
        return Err(RxError::InvalidMarble(format!(
          "comma outside of a group at position {i}"
        )))
      }
      ')' => return Err(RxError::InvalidMarble(format!("unmatched `)` at position {i}"))),
      '(' => {
        let body = &chars[i + 1..];
        let close = body
          .iter()
          .position(|c| *c == ')')
          .ok_or_else(|| RxError::InvalidMarble(format!("group opened at position {i} is never closed")))?;
        if body[..close].contains(&'(') {
          return Err(RxError::InvalidMarble(format!("nested group at position {i}")));
        }
        split_group(&body[..close], frame, &mut tokens);
        let width = close + 2;
        frame += width;
        i += width;
      }
      _ => {
        let start = i;
        while i < chars.len() && !is_special(chars[i]) {
          i += 1;
        }
        tokens.push(Token { frame, text: chars[start..i].iter().collect() });
        frame += i - start;
      }
    }
  }
  Ok(tokens)
}

// ==================== Parsing ====================

/// Parses `diagram` into `(tick, notification)` pairs in diagram order.
///
/// A diagram without `|` or `#` gets a completion at `f64::INFINITY`
/// appended. Malformed groups, commas outside groups and, with
/// `raise_stopped`, events after a terminal fail with
/// [`RxError::InvalidMarble`].
pub fn parse(diagram: &str, options: &MarbleOptions) -> Result<Vec<(f64, Notification<MarbleValue>)>> {
  let mut messages = vec![];
  let mut stopped = false;
  for Token { frame, text } in tokenize(diagram)? {
    if stopped && options.raise_stopped {
      return Err(RxError::InvalidMarble(format!(
        "`{text}` declared after the stream terminated"
      )));
    }
    let time = frame as f64 * options.timespan + options.time_shift;
    let notification = match text.as_str() {
      "|" => Notification::Completed,
      "#" => Notification::Error(options.error_payload()),
      token => Notification::Next(options.value_of(token)),
    };
    stopped |= notification.is_terminal();
    messages.push((time, notification));
  }
  if !stopped {
    messages.push((f64::INFINITY, Notification::Completed));
  }
  Ok(messages)
}

fn finite_messages(diagram: &str, options: MarbleOptions) -> Result<Vec<(f64, Notification<MarbleValue>)>> {
  let options = MarbleOptions { raise_stopped: true, ..options };
  let mut messages = parse(diagram, &options)?;
  messages.retain(|(t, _)| t.is_finite());
  Ok(messages)
}

/// A cold observable replaying `diagram` relative to each subscription.
///
/// Events run on `scheduler`, else on the subscribe-time scheduler, else on
/// a new thread per event.
pub fn from_marbles(
  diagram: &str,
  options: MarbleOptions,
  scheduler: Option<SchedulerRef>,
) -> Result<Observable<MarbleValue>> {
  let messages = Arc::new(finite_messages(diagram, options)?);
  Ok(Observable::new(move |observer, subscribed| {
    let scheduler = resolve(&scheduler, subscribed);
    let scheduled = CompositeDisposable::new();
    for (time, notification) in messages.iter() {
      let notification = notification.clone();
      let observer = observer.clone();
      scheduled.add(scheduler.schedule_relative_fn(from_ticks(*time), move || {
        notification.accept(&*observer)
      }));
    }
    BoxedDisposable::new(scheduled)
  }))
}

/// A hot observable playing `diagram` on `scheduler` with frame zero at the
/// absolute tick `start`, whether or not anyone listens.
///
/// Events falling before the scheduler's current time are dropped.
pub fn hot(
  diagram: &str,
  options: MarbleOptions,
  start: f64,
  scheduler: SchedulerRef,
) -> Result<Observable<MarbleValue>> {
  let messages = finite_messages(diagram, options)?;
  let subject = Subject::new();
  let now = to_ticks(scheduler.now());
  for (time, notification) in messages {
    let due = start + time;
    if due < now {
      continue;
    }
    let subject = subject.clone();
    scheduler.schedule_absolute_fn(from_ticks(due), move || notification.accept(&subject));
  }
  Ok(subject.observable())
}

// ==================== Rendering ====================

struct Rendering {
  start: Duration,
  events: Vec<(f64, String)>,
}

pub struct ToMarblesObserver {
  observer: BoxedObserver<String>,
  scheduler: SchedulerRef,
  timespan: f64,
  rendering: Mutex<Rendering>,
}

impl ToMarblesObserver {
  fn push(&self, token: String) {
    let mut rendering = lock(&self.rendering);
    let elapsed = self.scheduler.now().saturating_sub(rendering.start);
    rendering.events.push((to_ticks(elapsed), token));
  }

  fn finish(&self, token: &str) {
    self.push(token.to_owned());
    let diagram = render(&lock(&self.rendering).events, self.timespan);
    self.observer.on_next(diagram);
    self.observer.on_completed();
  }
}

impl<T: fmt::Display> Observer<T> for ToMarblesObserver {
  fn on_next(&self, value: T) { self.push(value.to_string()) }

  fn on_error(&self, _: RxError) { self.finish("#") }

  fn on_completed(&self) { self.finish("|") }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Writes timed tokens as a diagram. Events landing on the same frame form
/// a group, and every token advances the cursor by its width, mirroring
/// [`parse`].
fn render(events: &[(f64, String)], timespan: f64) -> String {
  let frame_of = |ticks: f64| {
    if timespan > 0. {
      (ticks / timespan).round().max(0.) as usize
    } else {
      0
    }
  };
  let mut diagram = String::new();
  let mut cursor = 0;
  let mut i = 0;
  while i < events.len() {
    let frame = frame_of(events[i].0);
    let mut j = i + 1;
    while j < events.len() && frame_of(events[j].0) == frame {
      j += 1;
    }
    if frame > cursor {
      diagram.push_str(&"-".repeat(frame - cursor));
      cursor = frame;
    }
    let written = if j - i == 1 {
      events[i].1.clone()
    } else {
      let members: Vec<&str> = events[i..j].iter().map(|(_, t)| t.as_str()).collect();
      format!("({})", members.join(","))
    };
    cursor += written.chars().count();
    diagram.push_str(&written);
    i = j;
  }
  diagram
}

impl<T: Value + fmt::Display> Observable<T> {
  /// Renders the stream as a marble diagram, emitted once the source
  /// terminates. Frames last `timespan` ticks of `scheduler`'s clock,
  /// counted from the subscription.
  pub fn to_marbles(self, timespan: f64, scheduler: Option<SchedulerRef>) -> Observable<String> {
    Observable::new(move |observer, subscribed| {
      let scheduler = resolve(&scheduler, subscribed.clone());
      let start = scheduler.now();
      let marbles = ToMarblesObserver {
        observer,
        scheduler,
        timespan,
        rendering: Mutex::new(Rendering { start, events: vec![] }),
      };
      self.subscribe_with(marbles, subscribed)
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{prelude::*, testing::ReactiveTest as RT};

  fn next(v: impl Into<MarbleValue>) -> Notification<MarbleValue> { Notification::Next(v.into()) }

  #[test]
  fn fractional_timespan() {
    let messages = parse("a--b---c", &MarbleOptions::default().timespan(0.1)).unwrap();
    let times: Vec<f64> = messages.iter().map(|(t, _)| *t).collect();
    assert!((times[0] - 0.0).abs() < 1e-9);
    assert!((times[1] - 0.3).abs() < 1e-9);
    assert!((times[2] - 0.7).abs() < 1e-9);
    assert_eq!(times[3], f64::INFINITY);
    assert_eq!(messages[3].1, Notification::Completed);
  }

  #[test]
  fn token_widths_advance_time() {
    let messages = parse("-ab-(c,d)-|", &MarbleOptions::default()).unwrap();
    assert_eq!(
      messages,
      vec![
        (1., next("ab")),
        (4., next("c")),
        (4., next("d")),
        (10., Notification::Completed)
      ]
    );
  }

  #[test]
  fn value_kinds() {
    let options = MarbleOptions::default().booleans(true).lookup("x", 42i64);
    let messages = parse("(12,1.5,2e3,T,F,x,hi)", &options).unwrap();
    let values: Vec<_> = messages.into_iter().filter_map(|(_, n)| n.value().cloned()).collect();
    assert_eq!(
      values,
      vec![
        MarbleValue::Int(12),
        MarbleValue::Float(1.5),
        MarbleValue::Float(2000.),
        MarbleValue::Bool(true),
        MarbleValue::Bool(false),
        MarbleValue::Int(42),
        MarbleValue::from("hi")
      ]
    );
  }

  #[test]
  fn inf_and_nan_stay_strings() {
    let messages = parse("(inf,NaN)", &MarbleOptions::default()).unwrap();
    assert_eq!(messages[0].1, next("inf"));
    assert_eq!(messages[1].1, next("NaN"));
  }

  #[test]
  fn terminals_inside_groups() {
    let messages = parse("--(c|)", &MarbleOptions::default()).unwrap();
    assert_eq!(messages, vec![(2., next("c")), (2., Notification::Completed)]);
  }

  #[test]
  fn error_payload() {
    let messages = parse("-#", &MarbleOptions::default()).unwrap();
    assert_eq!(messages, vec![(1., Notification::Error(RxError::user("error")))]);
    let custom = MarbleOptions::default().error(RxError::user("custom"));
    let messages = parse("#", &custom).unwrap();
    assert_eq!(messages, vec![(0., Notification::Error(RxError::user("custom")))]);
  }

  #[test]
  fn malformed_diagrams() {
    let options = MarbleOptions::default();
    for diagram in ["a,b", "(a,b", "a)", "((a))"] {
      assert!(
        matches!(parse(diagram, &options), Err(RxError::InvalidMarble(_))),
        "{diagram}"
      );
    }
    let strict = MarbleOptions::default().raise_stopped(true);
    assert!(parse("a|b", &strict).is_err());
    assert!(parse("a|b", &options).is_ok());
  }

  #[test]
  fn cold_is_relative_to_subscription() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.start(|| {
      from_marbles("-1-(2,3)|", MarbleOptions::default().timespan(10.), None).unwrap()
    });
    assert_eq!(
      observer.messages(),
      vec![
        RT::on_next(210., MarbleValue::Int(1)),
        RT::on_next(230., MarbleValue::Int(2)),
        RT::on_next(230., MarbleValue::Int(3)),
        RT::on_completed(280.)
      ]
    );
  }

  #[test]
  fn hot_drops_past_events() {
    let scheduler = TestScheduler::new();
    scheduler.advance_to(150.).unwrap();
    let shared: SchedulerRef = Arc::new(scheduler.clone());
    let xs = hot("a-b-c|", MarbleOptions::default().timespan(50.), 100., shared).unwrap();
    let observer = scheduler.start_with(move || xs, StartTimes::default().created(160.));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(300., MarbleValue::from("c")), RT::on_completed(350.)]
    );
  }

  #[test]
  fn renders_groups_and_gaps() {
    let events = vec![
      (1., "a".to_string()),
      (4., "b".to_string()),
      (4., "c".to_string()),
      (12., "|".to_string()),
    ];
    assert_eq!(render(&events, 1.), "-a--(b,c)---|");
  }

  #[test]
  fn to_marbles_round_trip() {
    let diagram = "-a--(b,c)---12-|";
    let scheduler = TestScheduler::new();
    let observer = scheduler
      .start(move || from_marbles(diagram, MarbleOptions::default(), None).unwrap().to_marbles(1., None));
    assert_eq!(
      observer.messages(),
      vec![RT::on_next(215., diagram.to_string()), RT::on_completed(215.)]
    );
  }
}
