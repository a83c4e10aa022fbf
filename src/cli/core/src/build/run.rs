/* src/cli/core/src/build/run.rs */

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use wasmroll_pipeline::{BuildConfiguration, RewriteAmbiguity};

use super::emit::{self, EmittedFile};
use super::engine::Engine;
use super::minify::{CommandMinifier, Minifier};
use super::toolchain::{Toolchain, WasmPack};
use crate::config::WasmrollConfig;
use crate::ui::{self, DIM, RESET};

#[derive(Debug, Clone)]
pub struct BuildReport {
  pub files: Vec<EmittedFile>,
  pub rewritten: usize,
  pub warnings: Vec<RewriteAmbiguity>,
}

pub struct Collaborators {
  pub toolchain: WasmPack,
  pub minifier: CommandMinifier,
}

impl Collaborators {
  pub fn from_config(
    config: &WasmrollConfig,
    base_dir: &Path,
    build: &BuildConfiguration,
  ) -> Self {
    let staging_dir = base_dir.join(&config.toolchain.staging_dir);
    Self {
      toolchain: WasmPack {
        base_dir: base_dir.to_path_buf(),
        command: config.toolchain.command.clone(),
        target: config.toolchain.target.clone(),
        release: !build.watch(),
        extra_args: config.toolchain.extra_args.clone(),
        staging_dir: staging_dir.clone(),
      },
      minifier: CommandMinifier {
        base_dir: base_dir.to_path_buf(),
        command: config.minify.command.clone(),
        sourcemap: build.output().sourcemap,
        staging_dir,
      },
    }
  }
}

/// Bundle all entries, then write them. Nothing is written if any entry fails.
pub fn build_once(
  build: &BuildConfiguration,
  toolchain: &dyn Toolchain,
  minifier: &dyn Minifier,
) -> Result<BuildReport> {
  let bundles = Engine::new(build, toolchain, minifier).bundle_all()?;
  let files = emit::write_outputs(build.output(), &bundles)?;
  let rewritten = bundles.iter().map(|b| b.rewritten).sum();
  let warnings = bundles.into_iter().flat_map(|b| b.warnings).collect();
  Ok(BuildReport { files, rewritten, warnings })
}

pub fn print_report(report: &BuildReport, base_dir: &Path) {
  for warning in &report.warnings {
    ui::warn(&warning.to_string());
  }
  for file in &report.files {
    let shown = file.path.strip_prefix(base_dir).unwrap_or(&file.path);
    ui::ok(&format!("{}  {DIM}{}{RESET}", shown.display(), ui::format_size(file.bytes)));
  }
  if report.rewritten > 0 {
    ui::detail(&format!("{DIM}rewrote {} import.meta reference(s){RESET}", report.rewritten));
  }
}

pub fn print_plan(build: &BuildConfiguration) {
  let mode = if build.watch() { "watch" } else { "release" };
  ui::arrow(&format!("mode: {mode}"));
  ui::arrow(&format!("passes: {}", build.pass_names().join(" \u{2192} ")));
  for entry in build.entries() {
    ui::detail(&format!("{}  {DIM}{}{RESET}", entry.name, entry.manifest.display()));
  }
}

pub fn run_build(config: &WasmrollConfig, base_dir: &Path) -> Result<()> {
  let started = Instant::now();
  ui::banner("build", &config.project.name);

  ui::step(1, 2, "Assembling pipeline");
  let build = config.build_configuration(base_dir, false)?;
  print_plan(&build);
  ui::blank();

  ui::step(2, 2, &format!("Bundling {} entries", build.entries().len()));
  let collab = Collaborators::from_config(config, base_dir, &build);
  let report = build_once(&build, &collab.toolchain, &collab.minifier)?;
  ui::blank();

  print_report(&report, base_dir);
  ui::blank();
  ui::ok(&format!("build complete in {:.1}s", started.elapsed().as_secs_f64()));
  Ok(())
}
