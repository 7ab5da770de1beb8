//! Error type shared by every stream, scheduler and parser in the crate.

use std::fmt::Display;

use thiserror::Error;

/// Errors that travel through `on_error` or are returned by fallible
/// constructors.
///
/// The type is cheap to clone because a single error is multicast to every
/// observer of a subject or window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError {
  /// An operator or scheduler parameter is outside its valid range.
  #[error("argument out of range: {0}")]
  ArgumentOutOfRange(String),

  /// An aggregation without a seed ran over an empty sequence.
  #[error("sequence contains no elements")]
  SequenceContainsNoElements,

  #[error("invalid state: {0}")]
  InvalidState(String),

  #[error("invalid marble diagram: {0}")]
  InvalidMarble(String),

  /// Any failure raised by user code inside the pipeline.
  #[error("{0}")]
  User(String),
}

impl RxError {
  pub fn user(msg: impl Display) -> Self { RxError::User(msg.to_string()) }

  pub(crate) fn disposed() -> Self { RxError::InvalidState("object has been disposed".into()) }

  pub(crate) fn out_of_range(msg: impl Display) -> Self {
    RxError::ArgumentOutOfRange(msg.to_string())
  }
}

pub type Result<T, E = RxError> = std::result::Result<T, E>;

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn display() {
    assert_eq!(RxError::user("boom").to_string(), "boom");
    assert_eq!(
      RxError::SequenceContainsNoElements.to_string(),
      "sequence contains no elements"
    );
    assert_eq!(
      RxError::out_of_range("count must be > 0").to_string(),
      "argument out of range: count must be > 0"
    );
  }
}
