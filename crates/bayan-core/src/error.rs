//! Error types for `bayan-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("duplicate geographic code: {0:?}")]
  DuplicateCode(String),

  #[error("unit {code:?} references unknown parent {parent:?}")]
  UnknownParent { code: String, parent: String },

  #[error("unknown wizard step: {0}")]
  UnknownStep(u8),

  #[error("cannot advance past step {step}: {reason}")]
  GuardUnsatisfied { step: u8, reason: &'static str },

  #[error("already at the final step; submit instead")]
  FinalStep,

  #[error("empty capture payload: {0}")]
  EmptyCapture(&'static str),

  #[error("draft not ready for submission: missing {0}")]
  NotSubmittable(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
