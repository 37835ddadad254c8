//! The declaration build pipeline.
//!
//! Sequencing is owned here: clean the output directory, inspect the project
//! config, resolve the toolchain, clear the stale incremental-build cache,
//! invoke the compiler, clean the cache again on success, and report the
//! outcome. No step is retried and every transition is one-directional:
//! `Init → CleanOutput → ValidateConfig → ResolveToolchain → Invoke →
//! {Success | Failure}`.
//!
//! Every fatal cause is reported through the sink with full context and then
//! collapsed into the single generic `BuildError::BuildFailed`, so callers
//! treat any raised error as "target failed" rather than branching on it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::BuildError;
use crate::invoke;
use crate::report::Reporter;
use crate::toolchain;
use crate::tsconfig;
use crate::util::paths;

/// Input for one declaration build, supplied by the outer packager driver.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  /// Project root the compiler runs in.
  pub root: PathBuf,
  /// Output directory the pipeline forces declarations into.
  pub output: PathBuf,
  /// Config file path relative to the root, defaults to `tsconfig.json`.
  pub project: Option<String>,
  /// Explicit compiler override, resolved relative to the root.
  pub tsc: Option<PathBuf>,
}

impl BuildRequest {
  pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
    Self { root: root.into(), output: output.into(), project: None, tsc: None }
  }

  fn project(&self) -> &str {
    self.project.as_deref().unwrap_or("tsconfig.json")
  }
}

/// Build declaration files for `request`, reporting progress through the sink.
///
/// Returns the output directory on success. On failure the detailed cause has
/// already been reported at `error` severity; the returned error is always
/// the generic `BuildFailed`.
pub fn build(request: &BuildRequest, reporter: &dyn Reporter) -> Result<PathBuf, BuildError> {
  match run(request, reporter) {
    Ok(output) => Ok(output),
    Err(err) => {
      match &err {
        BuildError::CompilationFailed { captured, .. } if !captured.trim().is_empty() => {
          reporter.error(&format!("Errors found when building definition files:\n{captured}"));
        }
        _ => reporter.error(&err.to_string()),
      }
      Err(BuildError::BuildFailed)
    }
  }
}

fn run(request: &BuildRequest, reporter: &dyn Reporter) -> Result<PathBuf, BuildError> {
  let project = request.project();

  reporter.info(&format!(
    "Cleaning up previous build at {}",
    paths::display_relative(&request.root, &request.output)
  ));

  clean_dir(&request.output)?;

  reporter.info("Generating type definitions with tsc");

  tsconfig::inspect(&request.root, project, &request.output, reporter)?;

  let toolchain = toolchain::resolve(&request.root, request.tsc.as_deref(), reporter)?;

  // The compiler may have left an incremental-build cache behind; clearing it
  // is purely best-effort since it only speeds up the build.
  let tsbuildinfo = tsbuildinfo_path(&request.output, project);
  let _ = fs::remove_file(&tsbuildinfo);

  let result = invoke::run_tsc(&toolchain.path, &request.root, project, &request.output)?;

  if !result.success() {
    return Err(BuildError::CompilationFailed { code: result.code, captured: result.captured });
  }

  // Regenerated on every run and not a shipped artifact.
  let _ = fs::remove_file(&tsbuildinfo);
  debug!(path = %tsbuildinfo.display(), "cleared incremental build cache");

  reporter.success(&format!(
    "Wrote definition files to {}",
    paths::display_relative(&request.root, &request.output)
  ));
  info!(output = %request.output.display(), "declaration build finished");

  Ok(request.output.clone())
}

/// Recursively remove a directory; absence is not an error.
fn clean_dir(dir: &Path) -> Result<(), BuildError> {
  match fs::remove_dir_all(dir) {
    Ok(()) => Ok(()),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e.into()),
  }
}

/// The incremental-build cache file path: the project file name with its
/// `.json` extension replaced, inside the output directory.
fn tsbuildinfo_path(output: &Path, project: &str) -> PathBuf {
  let name = match project.strip_suffix(".json") {
    Some(stem) => format!("{stem}.tsbuildinfo"),
    None => project.to_string(),
  };
  output.join(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::{CapturingReporter, Reported};
  use tempfile::TempDir;

  #[test]
  fn tsbuildinfo_replaces_json_extension() {
    assert_eq!(
      tsbuildinfo_path(Path::new("/out"), "tsconfig.json"),
      PathBuf::from("/out/tsconfig.tsbuildinfo")
    );
  }

  #[test]
  fn tsbuildinfo_keeps_nested_project_paths() {
    assert_eq!(
      tsbuildinfo_path(Path::new("/out"), "config/tsconfig.build.json"),
      PathBuf::from("/out/config/tsconfig.build.tsbuildinfo")
    );
  }

  #[test]
  fn tsbuildinfo_without_json_extension_is_unchanged() {
    assert_eq!(tsbuildinfo_path(Path::new("/out"), "tsconfig"), PathBuf::from("/out/tsconfig"));
  }

  #[test]
  fn clean_dir_tolerates_absence() {
    let temp = TempDir::new().unwrap();
    clean_dir(&temp.path().join("never-created")).unwrap();
  }

  #[cfg(unix)]
  mod pipeline {
    use super::*;

    /// A fake tsc that records its spawn, honors `--outDir`, emits a
    /// declaration file and a tsbuildinfo cache, and exits with `exit_code`.
    fn fake_tsc(dir: &Path, exit_code: i32) -> PathBuf {
      fake_tsc_script(
        dir,
        &format!(
          r#"touch "$(dirname "$0")/spawned"
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--outDir" ]; then out="$arg"; fi
  prev="$arg"
done
mkdir -p "$out"
echo "declare const x: number;" > "$out/index.d.ts"
touch "$out/tsconfig.tsbuildinfo"
if [ {exit_code} -ne 0 ]; then
  echo "error TS2304: Cannot find name 'y'."
fi
exit {exit_code}"#
        ),
      )
    }

    fn fake_tsc_script(dir: &Path, body: &str) -> PathBuf {
      use std::os::unix::fs::PermissionsExt;

      let path = dir.join("fake-tsc");
      std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
      std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
      path
    }

    fn project(tsconfig: Option<&str>, exit_code: i32) -> (TempDir, BuildRequest) {
      let temp = TempDir::new().unwrap();
      if let Some(content) = tsconfig {
        std::fs::write(temp.path().join("tsconfig.json"), content).unwrap();
      }
      let tsc = fake_tsc(temp.path(), exit_code);
      let mut request = BuildRequest::new(temp.path(), temp.path().join("lib/typescript"));
      request.tsc = Some(tsc);
      (temp, request)
    }

    fn spawned(temp: &TempDir) -> bool {
      temp.path().join("spawned").exists()
    }

    #[test]
    fn successful_build_reports_output_and_clears_cache() {
      let (temp, request) = project(Some("{}"), 0);
      let reporter = CapturingReporter::new();

      let output = build(&request, &reporter).unwrap();

      assert_eq!(output, request.output);
      assert!(output.join("index.d.ts").exists());
      assert!(!output.join("tsconfig.tsbuildinfo").exists());
      assert!(spawned(&temp));

      let messages = reporter.messages();
      assert!(matches!(
        messages.last(),
        Some(Reported::Success(text)) if text.contains("lib/typescript")
      ));
    }

    #[test]
    fn missing_tsconfig_aborts_before_spawn() {
      let (temp, request) = project(None, 0);
      let reporter = CapturingReporter::new();

      let result = build(&request, &reporter);

      assert!(matches!(result, Err(BuildError::BuildFailed)));
      assert!(!spawned(&temp), "no subprocess may be spawned without a config file");

      let errors = reporter.errors();
      assert_eq!(errors.len(), 1);
      assert!(errors[0].contains("Couldn't find a tsconfig.json"));
    }

    #[test]
    fn missing_explicit_tsc_aborts_before_spawn() {
      let (temp, mut request) = project(Some("{}"), 0);
      request.tsc = Some(temp.path().join("no-such-tsc"));
      let reporter = CapturingReporter::new();

      let result = build(&request, &reporter);

      assert!(matches!(result, Err(BuildError::BuildFailed)));
      assert!(!spawned(&temp));
      assert!(reporter.errors()[0].contains("doesn't seem to be installed at"));
    }

    #[test]
    fn failed_compilation_reports_diagnostics_and_keeps_cache() {
      let (_temp, request) = project(Some("{}"), 2);
      let reporter = CapturingReporter::new();

      let result = build(&request, &reporter);

      assert!(matches!(result, Err(BuildError::BuildFailed)));
      // Only the best-effort pre-clean applies on failure.
      assert!(request.output.join("tsconfig.tsbuildinfo").exists());

      let errors = reporter.errors();
      assert_eq!(errors.len(), 1);
      assert!(errors[0].contains("Errors found when building definition files"));
      assert!(errors[0].contains("TS2304"));
    }

    #[test]
    fn conflicting_out_dir_warns_before_invocation_but_builds() {
      let (_temp, request) =
        project(Some(r#"{ "compilerOptions": { "outDir": "./dist" } }"#), 0);
      let reporter = CapturingReporter::new();

      build(&request, &reporter).unwrap();

      let messages = reporter.messages();
      let warn_index = messages
        .iter()
        .position(|m| matches!(m, Reported::Warn(text) if text.contains("compilerOptions.outDir")))
        .expect("outDir conflict warning");
      let success_index =
        messages.iter().position(|m| matches!(m, Reported::Success(_))).expect("success report");
      assert!(warn_index < success_index);
    }

    #[test]
    fn matching_out_dir_does_not_warn() {
      let (_temp, request) =
        project(Some(r#"{ "compilerOptions": { "outDir": "./lib/typescript" } }"#), 0);
      let reporter = CapturingReporter::new();

      build(&request, &reporter).unwrap();

      assert!(reporter.warnings().is_empty());
    }

    #[test]
    fn unparseable_tsconfig_still_builds_with_warning() {
      let (_temp, request) = project(Some("{ not json5 ///"), 0);
      let reporter = CapturingReporter::new();

      build(&request, &reporter).unwrap();

      let warnings = reporter.warnings();
      assert_eq!(warnings.len(), 1);
      assert!(warnings[0].contains("Couldn't parse"));
    }

    #[test]
    fn build_is_idempotent_and_cleans_previous_output() {
      let (_temp, request) = project(Some("{}"), 0);
      let reporter = CapturingReporter::new();

      // Stale artifact from an earlier, differently-configured run.
      std::fs::create_dir_all(&request.output).unwrap();
      std::fs::write(request.output.join("stale.js"), "").unwrap();

      build(&request, &reporter).unwrap();
      build(&request, &reporter).unwrap();

      assert!(request.output.join("index.d.ts").exists());
      assert!(!request.output.join("stale.js").exists());
      assert!(!request.output.join("tsconfig.tsbuildinfo").exists());
    }

    #[test]
    fn structured_cause_is_preserved_internally() {
      let (_temp, request) = project(None, 0);
      let reporter = CapturingReporter::new();

      // The public entry collapses causes; the internal pipeline keeps them.
      let result = run(&request, &reporter);

      assert!(matches!(result, Err(BuildError::ConfigMissing { project }) if project == "tsconfig.json"));
    }
  }
}
