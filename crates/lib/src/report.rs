//! Reporting sink for build progress and diagnostics.
//!
//! The pipeline never prints on its own: all user-facing output goes through
//! an injected `Reporter` with four write-only severity channels. The CLI
//! supplies a terminal implementation; tests substitute `CapturingReporter`
//! to assert on what was reported.

use std::sync::Mutex;

/// Write-only reporting interface with severity channels.
pub trait Reporter {
  fn info(&self, message: &str);
  fn warn(&self, message: &str);
  fn success(&self, message: &str);
  fn error(&self, message: &str);
}

/// A reported message paired with its severity channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reported {
  Info(String),
  Warn(String),
  Success(String),
  Error(String),
}

/// Reporter that records every message for later inspection.
#[derive(Debug, Default)]
pub struct CapturingReporter {
  messages: Mutex<Vec<Reported>>,
}

impl CapturingReporter {
  pub fn new() -> Self {
    Self::default()
  }

  /// All messages reported so far, in order.
  pub fn messages(&self) -> Vec<Reported> {
    self.messages.lock().expect("reporter lock poisoned").clone()
  }

  /// All warning messages reported so far.
  pub fn warnings(&self) -> Vec<String> {
    self
      .messages()
      .into_iter()
      .filter_map(|m| match m {
        Reported::Warn(text) => Some(text),
        _ => None,
      })
      .collect()
  }

  /// All error messages reported so far.
  pub fn errors(&self) -> Vec<String> {
    self
      .messages()
      .into_iter()
      .filter_map(|m| match m {
        Reported::Error(text) => Some(text),
        _ => None,
      })
      .collect()
  }

  fn push(&self, message: Reported) {
    self.messages.lock().expect("reporter lock poisoned").push(message);
  }
}

impl Reporter for CapturingReporter {
  fn info(&self, message: &str) {
    self.push(Reported::Info(message.to_string()));
  }

  fn warn(&self, message: &str) {
    self.push(Reported::Warn(message.to_string()));
  }

  fn success(&self, message: &str) {
    self.push(Reported::Success(message.to_string()));
  }

  fn error(&self, message: &str) {
    self.push(Reported::Error(message.to_string()));
  }
}
