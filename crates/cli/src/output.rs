//! Terminal reporter for the declaration build pipeline.
//!
//! Maps the pipeline's severity channels onto colored status lines: info and
//! success go to stdout, warnings and errors to stderr. Colors are applied
//! only when the stream supports them.

use dtsbuild_lib::Reporter;
use owo_colors::{OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
  pub fn new() -> Self {
    Self
  }
}

impl Reporter for ConsoleReporter {
  fn info(&self, message: &str) {
    println!("{} {}", symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()), message);
  }

  fn warn(&self, message: &str) {
    eprintln!(
      "{} {}",
      symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
      message.if_supports_color(Stream::Stderr, |s| s.yellow())
    );
  }

  fn success(&self, message: &str) {
    println!("{} {}", symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()), message);
  }

  fn error(&self, message: &str) {
    eprintln!(
      "{} {}",
      symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
      message.if_supports_color(Stream::Stderr, |s| s.red())
    );
  }
}
