/* src/pipeline/src/output.rs */

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Emitted modules are ES modules: they `export` and may use top-level `await`.
/// Other formats are rejected when the configuration is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
  #[default]
  Es,
}

impl fmt::Display for ModuleFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Es => "es",
    })
  }
}

/// Shared by every entry: one directory, one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDescriptor {
  pub dir: PathBuf,
  pub format: ModuleFormat,
  pub sourcemap: bool,
}

impl Default for OutputDescriptor {
  fn default() -> Self {
    Self { dir: PathBuf::from("dist/js"), format: ModuleFormat::Es, sourcemap: true }
  }
}

impl OutputDescriptor {
  pub fn module_file(name: &str) -> String {
    format!("{name}.js")
  }

  pub fn payload_file(name: &str) -> String {
    format!("{name}_bg.wasm")
  }

  pub fn module_path(&self, name: &str) -> PathBuf {
    self.dir.join(Self::module_file(name))
  }

  pub fn payload_path(&self, name: &str) -> PathBuf {
    self.dir.join(Self::payload_file(name))
  }

  pub fn sourcemap_path(&self, name: &str) -> PathBuf {
    self.dir.join(format!("{name}.js.map"))
  }
}
