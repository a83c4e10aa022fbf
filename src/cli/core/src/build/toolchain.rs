/* src/cli/core/src/build/toolchain.rs */

// Compiles one entry crate into a loader shim + wasm payload.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wasmroll_pipeline::{Entry, OutputDescriptor};

use crate::shell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
  pub loader: String,
  pub payload: Vec<u8>,
}

pub trait Toolchain {
  fn compile(&self, entry: &Entry, server_path: &str) -> Result<CompiledUnit>;
}

/// `wasm-pack build` into a per-entry staging directory.
pub struct WasmPack {
  pub base_dir: PathBuf,
  pub command: String,
  pub target: String,
  pub release: bool,
  pub extra_args: Vec<String>,
  pub staging_dir: PathBuf,
}

impl WasmPack {
  fn args(&self, entry: &Entry, out_dir: &Path) -> Vec<String> {
    let mut args = vec![
      "build".to_string(),
      entry.crate_dir().to_string_lossy().to_string(),
      "--target".to_string(),
      self.target.clone(),
      "--out-dir".to_string(),
      out_dir.to_string_lossy().to_string(),
      "--out-name".to_string(),
      entry.name.clone(),
      "--no-typescript".to_string(),
      if self.release { "--release" } else { "--dev" }.to_string(),
    ];
    args.extend(self.extra_args.iter().cloned());
    args
  }
}

impl Toolchain for WasmPack {
  fn compile(&self, entry: &Entry, server_path: &str) -> Result<CompiledUnit> {
    let out_dir = self.staging_dir.join(&entry.name);
    std::fs::create_dir_all(&out_dir)
      .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let (program, mut args) = shell::split_command(&self.command)?;
    args.extend(self.args(entry, &out_dir));
    let label = format!("{program} ({})", entry.name);
    shell::run_program(&self.base_dir, &program, &args, &label, &[])?;

    let shim_path = out_dir.join(OutputDescriptor::module_file(&entry.name));
    let payload_path = out_dir.join(OutputDescriptor::payload_file(&entry.name));
    let shim = std::fs::read_to_string(&shim_path)
      .with_context(|| format!("toolchain did not emit {}", shim_path.display()))?;
    let payload = std::fs::read(&payload_path)
      .with_context(|| format!("toolchain did not emit {}", payload_path.display()))?;

    Ok(CompiledUnit { loader: link_payload(&shim, server_path, &entry.name), payload })
  }
}

/// Init function every `--target web` shim defines and default-exports.
pub const INIT_FN: &str = "__wbg_init";

/// Turn the shim into an entry that instantiates its own payload from the
/// public server path, so loading `<name>.js` (page script or module worker)
/// is enough. The shim's `import.meta.url` fallback is never taken.
pub fn link_payload(shim: &str, server_path: &str, name: &str) -> String {
  let mut loader = shim.to_string();
  if !loader.ends_with('\n') {
    loader.push('\n');
  }
  let url = format!("{server_path}{}", OutputDescriptor::payload_file(name));
  loader.push_str(&format!("export const payloadUrl = {};\n", serde_json::Value::String(url)));
  loader.push_str(&format!("await {INIT_FN}({{ module_or_path: payloadUrl }});\n"));
  loader
}
