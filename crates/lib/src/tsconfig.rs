//! Project configuration loading and conflict detection.
//!
//! The pipeline always forces declaration-only emission into its own output
//! directory, so options in the project's `tsconfig.json` that steer emission
//! can silently diverge from what the caller expects. This module loads the
//! config as relaxed JSON (comments, trailing commas) and reports any such
//! options as one advisory warning. Only a missing config file is fatal; an
//! unparseable one merely downgrades confidence.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BuildError;
use crate::report::Reporter;
use crate::util::paths;

pub const CONFLICT_NO_EMIT: &str = "compilerOptions.noEmit";
pub const CONFLICT_EMIT_DECLARATION_ONLY: &str = "compilerOptions.emitDeclarationOnly";
pub const CONFLICT_DECLARATION_DIR: &str = "compilerOptions.declarationDir";
pub const CONFLICT_OUT_DIR: &str = "compilerOptions.outDir";

/// The subset of a tsconfig file the pipeline inspects.
///
/// `compilerOptions` stays a raw JSON map rather than a typed struct: the
/// emission keys conflict when they are present with any value at all, `null`
/// and `false` included, so detection works on key presence.
#[derive(Debug, Default, Deserialize)]
pub struct TsConfig {
  #[serde(rename = "compilerOptions")]
  pub compiler_options: Option<Map<String, Value>>,
}

/// Inspect the project config at `root`/`project` for options that conflict
/// with the pipeline-forced flags.
///
/// Fatal only when the config file is missing. Parse failures and detected
/// conflicts are reported through the sink and the build continues.
pub fn inspect(
  root: &Path,
  project: &str,
  output: &Path,
  reporter: &dyn Reporter,
) -> Result<(), BuildError> {
  let tsconfig = root.join(project);

  if !tsconfig.exists() {
    return Err(BuildError::ConfigMissing { project: project.to_string() });
  }

  let parsed = std::fs::read_to_string(&tsconfig)
    .map_err(|e| e.to_string())
    .and_then(|text| json5::from_str::<TsConfig>(&text).map_err(|e| e.to_string()));

  let config = match parsed {
    Ok(config) => config,
    Err(reason) => {
      debug!(path = %tsconfig.display(), %reason, "tsconfig parse failed");
      reporter.warn(&format!("Couldn't parse '{}'. There might be validation errors.", project));
      return Ok(());
    }
  };

  let conflicts = find_conflicts(&config, root, output);

  if !conflicts.is_empty() {
    let listed = conflicts.iter().fold(String::new(), |acc, key| acc + "\n- " + key);
    reporter.warn(&format!(
      "Found following options in the config file which can conflict with the CLI options. \
       Please remove them from {}:{}",
      project, listed
    ));
  }

  Ok(())
}

/// Collect the dotted names of options set in `config` that collide with the
/// flags the pipeline forces on the invocation.
pub fn find_conflicts(config: &TsConfig, root: &Path, output: &Path) -> Vec<&'static str> {
  let mut conflicts = Vec::new();

  let Some(options) = &config.compiler_options else {
    return conflicts;
  };

  // Present with any value, including `null` and `false`, overrides the
  // forced flag.
  if options.contains_key("noEmit") {
    conflicts.push(CONFLICT_NO_EMIT);
  }

  if options.contains_key("emitDeclarationOnly") {
    conflicts.push(CONFLICT_EMIT_DECLARATION_ONLY);
  }

  if options.get("declarationDir").is_some_and(is_truthy) {
    conflicts.push(CONFLICT_DECLARATION_DIR);
  }

  if let Some(out_dir) = options.get("outDir") {
    if is_truthy(out_dir) {
      // A truthy non-string can never name the pipeline's output directory.
      let matches_output = match out_dir {
        Value::String(dir) => {
          paths::canonical_or_normalized(&root.join(dir))
            == paths::canonical_or_normalized(output)
        }
        _ => false,
      };

      if !matches_output {
        conflicts.push(CONFLICT_OUT_DIR);
      }
    }
  }

  conflicts
}

/// JavaScript-style truthiness for loosely typed option values.
fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}
