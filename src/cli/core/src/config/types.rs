/* src/cli/core/src/config/types.rs */

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use wasmroll_pipeline::{
  BuildConfiguration, Entry, EntryMap, ModuleFormat, OutputDescriptor, PassOptions,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WasmrollConfig {
  #[serde(default)]
  pub project: ProjectSection,
  #[serde(default, rename = "entry")]
  pub entries: Vec<EntrySection>,
  #[serde(default)]
  pub output: OutputSection,
  #[serde(default)]
  pub toolchain: ToolchainSection,
  #[serde(default)]
  pub minify: MinifySection,
  #[serde(default)]
  pub dev: DevSection,
  #[serde(default)]
  pub rewrite: RewriteSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
  #[serde(default = "default_project_name")]
  pub name: String,
}

impl Default for ProjectSection {
  fn default() -> Self {
    Self { name: default_project_name() }
  }
}

fn default_project_name() -> String {
  "wasmroll".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntrySection {
  pub name: String,
  pub manifest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
  #[serde(default = "default_out_dir")]
  pub dir: String,
  #[serde(default)]
  pub format: ModuleFormat,
  #[serde(default = "default_true")]
  pub sourcemap: bool,
}

impl Default for OutputSection {
  fn default() -> Self {
    Self { dir: default_out_dir(), format: ModuleFormat::Es, sourcemap: true }
  }
}

fn default_out_dir() -> String {
  "dist/js".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSection {
  /// URL prefix the payloads are served from.
  #[serde(default = "default_server_path")]
  pub server_path: String,
  #[serde(default = "default_toolchain_command")]
  pub command: String,
  /// wasm-pack `--target`; only `web` produces a self-contained ES module.
  #[serde(default = "default_target")]
  pub target: String,
  #[serde(default)]
  pub extra_args: Vec<String>,
  /// Intermediate toolchain output, relative to the project root.
  #[serde(default = "default_staging_dir")]
  pub staging_dir: String,
}

impl Default for ToolchainSection {
  fn default() -> Self {
    Self {
      server_path: default_server_path(),
      command: default_toolchain_command(),
      target: default_target(),
      extra_args: Vec::new(),
      staging_dir: default_staging_dir(),
    }
  }
}

fn default_server_path() -> String {
  "/js/".to_string()
}

fn default_toolchain_command() -> String {
  "wasm-pack".to_string()
}

fn default_target() -> String {
  "web".to_string()
}

fn default_staging_dir() -> String {
  "target/wasmroll".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinifySection {
  #[serde(default = "default_minify_command")]
  pub command: String,
}

impl Default for MinifySection {
  fn default() -> Self {
    Self { command: default_minify_command() }
  }
}

fn default_minify_command() -> String {
  "npx --no-install terser --module --compress --mangle".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevSection {
  #[serde(default = "default_content_base")]
  pub content_base: String,
  #[serde(default = "default_dev_port")]
  pub port: u16,
  #[serde(default = "default_true")]
  pub open: bool,
  /// Directory whose changes trigger a browser reload; defaults to `content_base`.
  pub livereload_dir: Option<String>,
  #[serde(default = "default_livereload_port")]
  pub livereload_port: u16,
  #[serde(default = "default_debounce_ms")]
  pub debounce_ms: u64,
}

impl Default for DevSection {
  fn default() -> Self {
    Self {
      content_base: default_content_base(),
      port: default_dev_port(),
      open: true,
      livereload_dir: None,
      livereload_port: default_livereload_port(),
      debounce_ms: default_debounce_ms(),
    }
  }
}

fn default_content_base() -> String {
  "dist".to_string()
}

fn default_dev_port() -> u16 {
  10001
}

fn default_livereload_port() -> u16 {
  35729
}

fn default_debounce_ms() -> u64 {
  300
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewriteSection {
  #[serde(default = "default_meta_property")]
  pub property: String,
  #[serde(default = "default_meta_token")]
  pub token: String,
}

impl Default for RewriteSection {
  fn default() -> Self {
    Self { property: default_meta_property(), token: default_meta_token() }
  }
}

fn default_meta_property() -> String {
  "url".to_string()
}

fn default_meta_token() -> String {
  "IMPORT_META".to_string()
}

fn default_true() -> bool {
  true
}

impl WasmrollConfig {
  pub fn validate(&self) -> Result<()> {
    if !self.toolchain.server_path.starts_with('/') || !self.toolchain.server_path.ends_with('/') {
      bail!(
        "toolchain.server_path \"{}\" must start and end with '/'",
        self.toolchain.server_path
      );
    }
    if self.rewrite.token.is_empty() || !is_identifier(&self.rewrite.token) {
      bail!("rewrite.token \"{}\" must be a valid identifier", self.rewrite.token);
    }
    if self.toolchain.target != "web" {
      bail!(
        "toolchain.target \"{}\" is not supported: output format is \"{}\", which needs \"web\"",
        self.toolchain.target,
        self.output.format
      );
    }
    if self.rewrite.property.is_empty() {
      bail!("rewrite.property must not be empty");
    }
    Ok(())
  }

  /// Configured entries, or the default three-crate layout when none are listed.
  pub fn entry_map(&self, base_dir: &Path) -> Result<EntryMap> {
    let entries: Vec<Entry> = if self.entries.is_empty() {
      EntryMap::default_layout().iter().cloned().collect()
    } else {
      self.entries.iter().map(|e| Entry::new(e.name.clone(), e.manifest.clone())).collect()
    };
    let resolved =
      entries.into_iter().map(|e| Entry::new(e.name, base_dir.join(&e.manifest))).collect();
    EntryMap::new(resolved).context("invalid [[entry]] configuration")
  }

  pub fn output_descriptor(&self, base_dir: &Path) -> OutputDescriptor {
    OutputDescriptor {
      dir: base_dir.join(&self.output.dir),
      format: self.output.format,
      sourcemap: self.output.sourcemap,
    }
  }

  pub fn pass_options(&self, base_dir: &Path) -> PassOptions {
    let content_base = base_dir.join(&self.dev.content_base);
    let livereload_dir = match &self.dev.livereload_dir {
      Some(dir) => base_dir.join(dir),
      None => content_base.clone(),
    };
    PassOptions {
      server_path: self.toolchain.server_path.clone(),
      content_base,
      dev_port: self.dev.port,
      open: self.dev.open,
      livereload_dir,
      livereload_port: self.dev.livereload_port,
      meta_property: self.rewrite.property.clone(),
      meta_token: self.rewrite.token.clone(),
    }
  }

  pub fn build_configuration(&self, base_dir: &Path, watch: bool) -> Result<BuildConfiguration> {
    self.validate()?;
    let config = BuildConfiguration::new(
      self.entry_map(base_dir)?,
      self.output_descriptor(base_dir),
      self.pass_options(base_dir),
      watch,
    )?;
    Ok(config)
  }
}

fn is_identifier(s: &str) -> bool {
  let mut chars = s.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
