//! Path helpers for comparing and displaying build paths.
//!
//! The conflict check compares the configured `outDir` with the pipeline's
//! output directory before either necessarily exists on disk, so comparison
//! works on lexically normalized paths, upgraded to canonical form when the
//! filesystem allows it.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and resolve `..` against
/// preceding components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        if !out.pop() {
          out.push(component.as_os_str());
        }
      }
      other => out.push(other.as_os_str()),
    }
  }
  out
}

/// Canonicalize without UNC prefixes, falling back to lexical normalization
/// when the path does not exist yet.
pub fn canonical_or_normalized(path: &Path) -> PathBuf {
  dunce::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// Display a path relative to the project root when it lies underneath it.
pub fn display_relative(root: &Path, path: &Path) -> String {
  match path.strip_prefix(root) {
    Ok(stripped) if stripped.as_os_str().is_empty() => ".".to_string(),
    Ok(stripped) => stripped.display().to_string(),
    Err(_) => path.display().to_string(),
  }
}
