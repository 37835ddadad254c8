//! Error types for the declaration build pipeline.
//!
//! The pipeline keeps a structured taxonomy internally so each failing step
//! can be identified, but the public `build` entry point collapses every
//! fatal cause into the single `BuildFailed` variant after reporting the
//! detailed cause through the sink. Callers should treat any error as
//! "target failed" rather than branching on the variant.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur while building definition files.
#[derive(Debug, Error)]
pub enum BuildError {
  /// No config file exists at the resolved project path.
  #[error("Couldn't find a {project} in the project root.")]
  ConfigMissing { project: String },

  /// No usable tsc executable was found after exhausting the fallback order.
  #[error("{message}")]
  ToolchainNotFound { message: String },

  /// The compiler subprocess exited with a nonzero status.
  #[error("The tsc process exited with code {code:?}.")]
  CompilationFailed {
    code: Option<i32>,
    /// Combined stdout/stderr captured during the invocation.
    captured: String,
  },

  /// I/O error during the pipeline.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Terminal error every fatal cause collapses into at the public boundary.
  #[error("Failed to build definition files.")]
  BuildFailed,
}

impl BuildError {
  /// Message for an explicit `tsc` override path that does not exist.
  pub(crate) fn explicit_toolchain_missing(path: &Path) -> Self {
    BuildError::ToolchainNotFound {
      message: format!(
        "The tsc binary doesn't seem to be installed at {}. Please specify the correct path in \
         options or remove it to use the workspace's version.",
        path.display()
      ),
    }
  }

  /// Message for the exhausted fallback chain (local install and $PATH).
  pub(crate) fn toolchain_exhausted() -> Self {
    BuildError::ToolchainNotFound {
      message: "The tsc binary doesn't seem to be installed under node_modules or present in \
                $PATH. Make sure you have added typescript to your devDependencies or specify \
                the tsc option for typescript."
        .to_string(),
    }
  }
}
