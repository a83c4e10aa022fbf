/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::WasmrollConfig;

pub const CONFIG_FILE: &str = "wasmroll.toml";

/// Walk upward from `start` to find `wasmroll.toml`, like Cargo.toml discovery
pub fn find_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

pub fn load_config(path: &Path) -> Result<WasmrollConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let config: WasmrollConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  config.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}

/// Resolve (project root, config). An explicit path must exist; otherwise the
/// file is searched upward from `cwd` and defaults apply when none is found.
pub fn resolve_config(explicit: Option<PathBuf>, cwd: &Path) -> Result<(PathBuf, WasmrollConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => match find_config(cwd) {
      Ok(p) => p,
      Err(_) => return Ok((cwd.to_path_buf(), WasmrollConfig::default())),
    },
  };
  let config = load_config(&path)?;
  let base_dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => cwd.to_path_buf(),
  };
  Ok((base_dir, config))
}
