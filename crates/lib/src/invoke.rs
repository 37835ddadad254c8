//! Synchronous invocation of the TypeScript compiler.
//!
//! The compiler runs exactly once per build, with a fixed flag set forcing
//! declaration-only emission into the pipeline's output directory. Its
//! stdout/stderr are teed: streamed live to the caller's terminal so the user
//! sees diagnostics as they happen, and captured so the orchestrator can
//! include them in the final failure report. The subprocess is waited on to
//! completion with no timeout and no cancellation path.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::error::BuildError;

/// Outcome of one compiler invocation.
#[derive(Debug)]
pub struct InvocationResult {
  /// Exit code, `None` when the process was killed by a signal.
  pub code: Option<i32>,
  /// Combined stdout/stderr, also streamed live to the terminal.
  pub captured: String,
}

impl InvocationResult {
  /// Exit status zero is the only success signal.
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Run `tsc` with the fixed declaration-emission flag set.
///
/// The flag set is not configurable: pretty diagnostics, declaration files,
/// declaration source maps, declarations only, the project config path, and
/// the pipeline's output directory.
pub fn run_tsc(
  tsc: &Path,
  root: &Path,
  project: &str,
  output: &Path,
) -> Result<InvocationResult, BuildError> {
  info!(tsc = %tsc.display(), project, "invoking tsc");

  let mut child = Command::new(tsc)
    .args(["--pretty", "--declaration", "--declarationMap", "--emitDeclarationOnly"])
    .arg("--project")
    .arg(project)
    .arg("--outDir")
    .arg(output)
    .current_dir(root)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()?;

  let stderr = child.stderr.take();
  let stderr_tee = thread::spawn(move || tee(stderr, io::stderr()));

  let captured_out = tee(child.stdout.take(), io::stdout())?;
  let captured_err = stderr_tee.join().unwrap_or_else(|_| Ok(String::new()))?;

  let status = child.wait()?;
  debug!(code = ?status.code(), "tsc exited");

  let mut captured = captured_out;
  captured.push_str(&captured_err);

  Ok(InvocationResult { code: status.code(), captured })
}

/// Copy `reader` to `writer` line by line while accumulating the same bytes
/// (lossily decoded) into the returned string.
fn tee(reader: Option<impl Read>, mut writer: impl Write) -> io::Result<String> {
  let Some(reader) = reader else {
    return Ok(String::new());
  };

  let mut reader = BufReader::new(reader);
  let mut captured = String::new();
  let mut line = Vec::new();

  loop {
    line.clear();
    if reader.read_until(b'\n', &mut line)? == 0 {
      break;
    }
    writer.write_all(&line)?;
    writer.flush()?;
    captured.push_str(&String::from_utf8_lossy(&line));
  }

  Ok(captured)
}
