/* src/pipeline/src/config.rs */

use std::collections::HashSet;

use serde::Serialize;

use crate::assemble::PipelineAssembler;
use crate::entry::EntryMap;
use crate::errors::PipelineError;
use crate::output::OutputDescriptor;
use crate::pass::{PassDescriptor, PassKind, PassOptions};
use crate::rewrite::ImportMetaRewriter;

/// Everything the bundling engine needs for one invocation. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
  entries: EntryMap,
  output: OutputDescriptor,
  passes: Vec<PassDescriptor>,
  watch: bool,
}

impl BuildConfiguration {
  pub fn new(
    entries: EntryMap,
    output: OutputDescriptor,
    options: PassOptions,
    watch: bool,
  ) -> Result<Self, PipelineError> {
    let passes = PipelineAssembler::new(options).assemble(watch);
    Self::from_parts(entries, output, passes, watch)
  }

  /// Build from an already assembled pass list, checking pass uniqueness.
  pub fn from_parts(
    entries: EntryMap,
    output: OutputDescriptor,
    passes: Vec<PassDescriptor>,
    watch: bool,
  ) -> Result<Self, PipelineError> {
    let mut seen = HashSet::new();
    for pass in &passes {
      if !seen.insert(pass.name()) {
        return Err(PipelineError::DuplicatePass(pass.name()));
      }
    }
    Ok(Self { entries, output, passes, watch })
  }

  pub fn entries(&self) -> &EntryMap {
    &self.entries
  }

  pub fn output(&self) -> &OutputDescriptor {
    &self.output
  }

  pub fn passes(&self) -> &[PassDescriptor] {
    &self.passes
  }

  pub fn watch(&self) -> bool {
    self.watch
  }

  pub fn pass_names(&self) -> Vec<&'static str> {
    self.passes.iter().map(PassDescriptor::name).collect()
  }

  pub fn has_pass(&self, name: &str) -> bool {
    self.passes.iter().any(|p| p.name() == name)
  }

  /// Rewriter for the configured rewrite pass, if one is assembled.
  pub fn rewriter(&self) -> Option<ImportMetaRewriter> {
    self.passes.iter().find_map(|p| match &p.kind {
      PassKind::RewriteImportMeta { property, token } => {
        Some(ImportMetaRewriter::new(property.clone(), token.clone()))
      }
      _ => None,
    })
  }

  pub fn server_path(&self) -> Option<&str> {
    self.passes.iter().find_map(|p| match &p.kind {
      PassKind::Ingest { server_path } => Some(server_path.as_str()),
      _ => None,
    })
  }
}
