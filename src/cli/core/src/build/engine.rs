/* src/cli/core/src/build/engine.rs */

// Stage runner: applies the assembled passes to each entry in order.
// Entries are bundled in memory first; emission happens only when all succeed.

use anyhow::{Context, Result};
use wasmroll_pipeline::{
  BuildConfiguration, Entry, ImportMetaRewriter, OutputDescriptor, PassDescriptor, PassKind,
  RewriteAmbiguity,
};

use super::livereload;
use super::minify::Minifier;
use super::sourcemap;
use super::toolchain::Toolchain;

#[derive(Debug, Clone)]
pub struct BundleOutput {
  pub name: String,
  pub code: String,
  pub payload: Vec<u8>,
  pub sourcemap: Option<String>,
  pub rewritten: usize,
  pub warnings: Vec<RewriteAmbiguity>,
}

struct ModuleState {
  source: String,
  code: String,
  payload: Vec<u8>,
  prefix_lines: usize,
  minified: bool,
  minifier_map: Option<String>,
  rewritten: usize,
  warnings: Vec<RewriteAmbiguity>,
}

pub struct Engine<'a> {
  config: &'a BuildConfiguration,
  toolchain: &'a dyn Toolchain,
  minifier: &'a dyn Minifier,
}

impl<'a> Engine<'a> {
  pub fn new(
    config: &'a BuildConfiguration,
    toolchain: &'a dyn Toolchain,
    minifier: &'a dyn Minifier,
  ) -> Self {
    Self { config, toolchain, minifier }
  }

  /// Bundle every entry; the first failure aborts the whole build.
  pub fn bundle_all(&self) -> Result<Vec<BundleOutput>> {
    self.config.entries().iter().map(|entry| self.bundle_entry(entry)).collect()
  }

  pub fn bundle_entry(&self, entry: &Entry) -> Result<BundleOutput> {
    let mut module: Option<ModuleState> = None;

    for pass in self.config.passes() {
      match &pass.kind {
        PassKind::Ingest { server_path } => {
          let unit = self
            .toolchain
            .compile(entry, server_path)
            .with_context(|| format!("failed to compile entry \"{}\"", entry.name))?;
          module = Some(ModuleState {
            source: unit.loader.clone(),
            code: unit.loader,
            payload: unit.payload,
            prefix_lines: 0,
            minified: false,
            minifier_map: None,
            rewritten: 0,
            warnings: Vec::new(),
          });
        }
        // Session services; started by the dev loop, nothing to do per module.
        PassKind::DevServer { .. } => {}
        PassKind::LiveReload { port, .. } => {
          let m = ingested(&mut module, pass)?;
          m.code = livereload::inject(&m.code, *port);
          m.prefix_lines += livereload::injected_lines();
        }
        PassKind::Minify => {
          let m = ingested(&mut module, pass)?;
          let out = self
            .minifier
            .minify(&entry.name, &m.code)
            .with_context(|| format!("failed to minify entry \"{}\"", entry.name))?;
          m.code = out.code;
          m.minified = true;
          m.minifier_map = out.sourcemap;
        }
        PassKind::RewriteImportMeta { property, token } => {
          let m = ingested(&mut module, pass)?;
          let rewriter = ImportMetaRewriter::new(property.clone(), token.clone());
          let out = rewriter.rewrite(&m.code, &entry.name)?;
          m.code = out.code;
          m.rewritten += out.replaced;
          m.warnings.extend(out.ambiguities);
        }
      }
    }

    let m = module.with_context(|| format!("no ingest pass ran for entry \"{}\"", entry.name))?;
    Ok(self.finish(entry, m))
  }

  fn finish(&self, entry: &Entry, m: ModuleState) -> BundleOutput {
    let mut code = m.code;
    let sourcemap = if self.config.output().sourcemap {
      let module_file = OutputDescriptor::module_file(&entry.name);
      if m.minified {
        m.minifier_map
      } else {
        Some(sourcemap::identity_map(
          &module_file,
          &format!("{}?loader", entry.name),
          &m.source,
          m.prefix_lines,
        ))
      }
    } else {
      None
    };

    if sourcemap.is_some() {
      if !code.ends_with('\n') {
        code.push('\n');
      }
      code.push_str(&sourcemap::mapping_comment(&format!("{}.js.map", entry.name)));
    }

    BundleOutput {
      name: entry.name.clone(),
      code,
      payload: m.payload,
      sourcemap,
      rewritten: m.rewritten,
      warnings: m.warnings,
    }
  }
}

fn ingested<'m>(
  module: &'m mut Option<ModuleState>,
  pass: &PassDescriptor,
) -> Result<&'m mut ModuleState> {
  module.as_mut().with_context(|| format!("pass \"{}\" ran before ingest", pass.name()))
}
