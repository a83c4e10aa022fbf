/* src/cli/core/src/build/minify.rs */

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::shell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
  pub code: String,
  /// Map written by the minifier, when it was asked for one.
  pub sourcemap: Option<String>,
}

pub trait Minifier {
  fn minify(&self, name: &str, code: &str) -> Result<Minified>;
}

/// Pipes module text through a shell command (stdin -> stdout).
///
/// The command sees `WASMROLL_SOURCEMAP` (`1`/`0`) and, when set,
/// `WASMROLL_SOURCEMAP_FILE`: the path it may write a source map to.
pub struct CommandMinifier {
  pub base_dir: PathBuf,
  pub command: String,
  pub sourcemap: bool,
  pub staging_dir: PathBuf,
}

impl Minifier for CommandMinifier {
  fn minify(&self, name: &str, code: &str) -> Result<Minified> {
    let map_path = self.staging_dir.join(name).join(format!("{name}.min.js.map"));
    if let Some(parent) = map_path.parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    super::emit::remove_if_exists(&map_path)
      .with_context(|| format!("failed to remove stale {}", map_path.display()))?;

    let map_str = map_path.to_string_lossy().to_string();
    let mut env_vars = vec![("WASMROLL_SOURCEMAP", if self.sourcemap { "1" } else { "0" })];
    if self.sourcemap {
      env_vars.push(("WASMROLL_SOURCEMAP_FILE", map_str.as_str()));
    }

    let label = format!("minifier ({name})");
    let minified = shell::run_filter(&self.base_dir, &self.command, &label, code, &env_vars)?;

    let sourcemap = if self.sourcemap && map_path.is_file() {
      let map = std::fs::read_to_string(&map_path)
        .with_context(|| format!("failed to read {}", map_path.display()))?;
      super::emit::remove_if_exists(&map_path)
        .with_context(|| format!("failed to remove {}", map_path.display()))?;
      Some(map)
    } else {
      None
    };

    Ok(Minified { code: minified, sourcemap })
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  fn minifier(dir: &std::path::Path, command: &str, sourcemap: bool) -> CommandMinifier {
    CommandMinifier {
      base_dir: dir.to_path_buf(),
      command: command.to_string(),
      sourcemap,
      staging_dir: dir.join("staging"),
    }
  }

  #[test]
  fn passes_text_through_command() {
    let tmp = tempfile::tempdir().unwrap();
    let m = minifier(tmp.path(), "tr -d ' '", false);
    let out = m.minify("index", "const a = 1 ;").unwrap();
    assert_eq!(out.code, "consta=1;");
    assert!(out.sourcemap.is_none());
  }

  #[test]
  fn collects_map_written_by_command() {
    let tmp = tempfile::tempdir().unwrap();
    let command = "cat; printf '{\"version\":3}' > \"$WASMROLL_SOURCEMAP_FILE\"";
    let m = minifier(tmp.path(), command, true);
    let out = m.minify("index", "x").unwrap();
    assert_eq!(out.code, "x");
    assert_eq!(out.sourcemap.as_deref(), Some("{\"version\":3}"));
    assert!(!tmp.path().join("staging/index/index.min.js.map").exists());
  }

  #[test]
  fn unremovable_stale_map_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("staging/index/index.min.js.map")).unwrap();
    let m = minifier(tmp.path(), "cat", true);
    let err = m.minify("index", "x").unwrap_err();
    assert!(format!("{err:#}").contains("failed to remove stale"), "{err:#}");
  }

  #[test]
  fn failing_minifier_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let m = minifier(tmp.path(), "exit 1", false);
    assert!(m.minify("index", "").is_err());
  }
}
