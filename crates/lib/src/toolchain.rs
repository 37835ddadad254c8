//! Ordered fallback resolution of the TypeScript compiler executable.
//!
//! Library packages get built inside arbitrarily-configured workspaces:
//! different package managers, monorepos with hoisted binaries, or machines
//! that only have a global install. Resolution therefore walks an ordered
//! chain of candidate strategies and stops at the first candidate that exists
//! on disk:
//! 1. an explicit override from the request (no fallback if it is missing),
//! 2. the location reported by the active package manager,
//! 3. the conventional `node_modules/.bin` path,
//! 4. a globally installed `tsc` on `$PATH` (reported as a warning, since the
//!    project is relying on a dependency it does not declare).

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::BuildError;
use crate::report::Reporter;

/// Resolution strategy that produced a toolchain path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
  Explicit,
  PackageManager,
  Conventional,
  Global,
}

/// A resolved compiler executable.
#[derive(Debug, Clone)]
pub struct Toolchain {
  pub path: PathBuf,
  pub provenance: Provenance,
}

/// Package manager that launched the surrounding build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
  Npm,
  Yarn,
}

impl PackageManager {
  /// Detect the active package manager from `npm_execpath`, which npm and
  /// yarn both set to their own executable for every script they run.
  pub fn detect() -> Self {
    Self::from_execpath(env::var_os("npm_execpath"))
  }

  fn from_execpath(execpath: Option<OsString>) -> Self {
    let is_yarn = execpath
      .map(PathBuf::from)
      .and_then(|p| p.file_name().map(|n| n.to_string_lossy().contains("yarn")))
      .unwrap_or(false);

    if is_yarn { PackageManager::Yarn } else { PackageManager::Npm }
  }
}

type Strategy<'a> = &'a dyn Fn(&Path) -> Option<(PathBuf, Provenance)>;

/// Resolve a usable `tsc` executable for the project at `root`.
///
/// An explicit override is resolved relative to the root and is final: if it
/// does not exist, resolution fails without trying anything else.
pub fn resolve(
  root: &Path,
  tsc_override: Option<&Path>,
  reporter: &dyn Reporter,
) -> Result<Toolchain, BuildError> {
  if let Some(explicit) = tsc_override {
    let path = root.join(explicit);
    if path.exists() {
      debug!(path = %path.display(), "using explicit tsc override");
      return Ok(Toolchain { path, provenance: Provenance::Explicit });
    }
    return Err(BuildError::explicit_toolchain_missing(&path));
  }

  resolve_chain(root, &[&package_manager_bin, &conventional_bin, &global_bin], reporter)
}

/// Walk the strategy chain, short-circuiting on the first candidate that
/// exists on disk. New strategies append to the chain without touching the
/// existing ones.
fn resolve_chain(
  root: &Path,
  strategies: &[Strategy],
  reporter: &dyn Reporter,
) -> Result<Toolchain, BuildError> {
  for strategy in strategies {
    let Some((path, provenance)) = strategy(root) else {
      continue;
    };

    if !path.exists() {
      debug!(path = %path.display(), ?provenance, "candidate does not exist, trying next");
      continue;
    }

    if provenance == Provenance::Global {
      reporter.warn(
        "Failed to locate 'tsc' in the workspace. Falling back to the globally installed \
         version. Consider adding typescript to your devDependencies or specifying the tsc \
         option for the typescript target.",
      );
    }

    debug!(path = %path.display(), ?provenance, "resolved tsc");
    return Ok(Toolchain { path, provenance });
  }

  Err(BuildError::toolchain_exhausted())
}

/// Ask the active package manager where it installed `tsc`.
///
/// Returns `None` when the query itself fails for any reason, letting the
/// chain fall through to the conventional install path.
fn package_manager_bin(root: &Path) -> Option<(PathBuf, Provenance)> {
  let path = match PackageManager::detect() {
    PackageManager::Yarn => {
      let output = Command::new("yarn").args(["bin", "tsc"]).current_dir(root).output().ok()?;
      if !output.status.success() {
        return None;
      }
      PathBuf::from(String::from_utf8_lossy(&output.stdout).trim())
    }
    PackageManager::Npm => {
      let output = Command::new("npm").arg("bin").current_dir(root).output().ok()?;
      if !output.status.success() {
        return None;
      }
      PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()).join("tsc")
    }
  };

  Some((with_platform_suffix(path), Provenance::PackageManager))
}

/// The conventional local dependency install path.
fn conventional_bin(root: &Path) -> Option<(PathBuf, Provenance)> {
  let path = root.join("node_modules").join(".bin").join("tsc");
  Some((with_platform_suffix(path), Provenance::Conventional))
}

/// Last resort: search the process's `$PATH`.
fn global_bin(_root: &Path) -> Option<(PathBuf, Provenance)> {
  which::which("tsc").ok().map(|path| (path, Provenance::Global))
}

/// On Windows, npm-installed binaries are `.cmd` shims.
#[cfg(windows)]
fn with_platform_suffix(path: PathBuf) -> PathBuf {
  if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("cmd")) {
    return path;
  }
  let mut shim = path.into_os_string();
  shim.push(".cmd");
  PathBuf::from(shim)
}

#[cfg(not(windows))]
fn with_platform_suffix(path: PathBuf) -> PathBuf {
  path
}
