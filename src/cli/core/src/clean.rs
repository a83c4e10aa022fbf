/* src/cli/core/src/clean.rs */

// `wasmroll clean`: removes the emitted modules and the toolchain staging area.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::WasmrollConfig;
use crate::ui;

pub fn run_clean(config: &WasmrollConfig, base_dir: &Path) -> Result<()> {
  ui::arrow("cleaning project");
  delete_dir_if_exists(&base_dir.join(&config.output.dir))?;
  delete_dir_if_exists(&base_dir.join(&config.toolchain.staging_dir))?;
  ui::ok("clean complete");
  Ok(())
}

fn delete_dir_if_exists(path: &Path) -> Result<()> {
  if path.exists() {
    std::fs::remove_dir_all(path)
      .with_context(|| format!("failed to remove {}", path.display()))?;
    ui::detail(&format!("deleted {}", path.display()));
  }
  Ok(())
}
