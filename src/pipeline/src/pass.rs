/* src/pipeline/src/pass.rs */

use std::path::PathBuf;

use serde::Serialize;

/// When a pass takes part in a build. Evaluated once, by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
  Always,
  WatchOnly,
  ReleaseOnly,
}

impl Activation {
  pub fn is_active(self, watch: bool) -> bool {
    match self {
      Self::Always => true,
      Self::WatchOnly => watch,
      Self::ReleaseOnly => !watch,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "pass", rename_all = "kebab-case")]
pub enum PassKind {
  /// Compile the entry crate to a loader shim + wasm payload.
  Ingest { server_path: String },
  /// Serve `content_base` over HTTP.
  DevServer { content_base: PathBuf, port: u16, open: bool },
  /// Push a reload to browsers when `watch_dir` changes.
  LiveReload { watch_dir: PathBuf, port: u16 },
  Minify,
  /// Replace `import.meta.<property>` with `token`.
  RewriteImportMeta { property: String, token: String },
}

impl PassKind {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Ingest { .. } => "ingest",
      Self::DevServer { .. } => "dev-server",
      Self::LiveReload { .. } => "live-reload",
      Self::Minify => "minify",
      Self::RewriteImportMeta { .. } => "rewrite-import-meta",
    }
  }

  /// Long-lived side effect started once per session rather than per module.
  pub fn is_service(&self) -> bool {
    matches!(self, Self::DevServer { .. } | Self::LiveReload { .. })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassDescriptor {
  #[serde(flatten)]
  pub kind: PassKind,
  pub activation: Activation,
}

impl PassDescriptor {
  pub fn new(kind: PassKind, activation: Activation) -> Self {
    Self { kind, activation }
  }

  pub fn name(&self) -> &'static str {
    self.kind.name()
  }
}

/// Values the passes are parameterised with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOptions {
  /// Public URL prefix the wasm payloads are served from.
  pub server_path: String,
  pub content_base: PathBuf,
  pub dev_port: u16,
  pub open: bool,
  pub livereload_dir: PathBuf,
  pub livereload_port: u16,
  pub meta_property: String,
  pub meta_token: String,
}

impl Default for PassOptions {
  fn default() -> Self {
    Self {
      server_path: "/js/".to_string(),
      content_base: PathBuf::from("dist"),
      dev_port: 10001,
      open: true,
      livereload_dir: PathBuf::from("dist"),
      livereload_port: 35729,
      meta_property: "url".to_string(),
      meta_token: "IMPORT_META".to_string(),
    }
  }
}
