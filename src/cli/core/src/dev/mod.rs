/* src/cli/core/src/dev/mod.rs */

// `wasmroll dev`: watch-mode build, then serve and rebuild on change.
// Services come from the assembled passes; the output watcher turns
// successful writes into browser reloads.

mod network;
mod reload;
mod server;
mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use notify::RecommendedWatcher;
use tokio::signal;
use tokio::task::JoinSet;
use wasmroll_pipeline::{BuildConfiguration, PassKind};

use crate::build::run::{BuildReport, Collaborators, build_once, print_plan, print_report};
use crate::config::WasmrollConfig;
use crate::shell;
use crate::ui::{self, CYAN, DIM, RESET};
use reload::ReloadHub;

struct Session {
  build: BuildConfiguration,
  collab: Collaborators,
  base_dir: PathBuf,
}

async fn rebuild(session: &Arc<Session>) -> Result<BuildReport> {
  let s = Arc::clone(session);
  let task = tokio::task::spawn_blocking(move || {
    let Session { build, collab, .. } = &*s;
    build_once(build, &collab.toolchain, &collab.minifier)
  });
  task.await.context("rebuild task panicked")?
}

async fn handle_rebuild(session: &Arc<Session>) {
  let started = Instant::now();
  ui::arrow("rebuilding...");
  match rebuild(session).await {
    Ok(report) => {
      print_report(&report, &session.base_dir);
      ui::ok(&format!("rebuild complete ({:.1}s)", started.elapsed().as_secs_f64()));
    }
    // Nothing was written, so the browser keeps the last good build.
    Err(e) => ui::fail(&format!("rebuild error: {e:#}")),
  }
}

/// Drive `work` to completion unless `interrupt` resolves first.
/// Returns false when interrupted.
async fn until_interrupted<W, I>(work: W, interrupt: I) -> bool
where
  W: Future<Output = ()>,
  I: Future,
{
  tokio::select! {
    () = work => true,
    _ = interrupt => false,
  }
}

fn shutdown_notice() {
  ui::blank();
  ui::detail(&format!("{DIM}shutting down...{RESET}"));
}

/// Start the session services named by the passes. Returns the output
/// watcher, which has to outlive the event loop.
async fn start_services(
  build: &BuildConfiguration,
  hub: &ReloadHub,
  services: &mut JoinSet<Result<()>>,
) -> Result<Option<RecommendedWatcher>> {
  let mut output_watcher = None;
  for pass in build.passes() {
    match &pass.kind {
      PassKind::DevServer { content_base, port, open } => {
        let port = network::find_available_port(*port)?;
        let listener = network::bind(port).await?;
        let url = format!("http://localhost:{port}/");
        ui::arrow(&format!("serving {} at {CYAN}{url}{RESET}", content_base.display()));
        let root = content_base.clone();
        services.spawn(async move { server::serve(listener, &root).await });
        if *open {
          tokio::task::spawn_blocking(move || shell::open_browser(&url));
        }
      }
      PassKind::LiveReload { watch_dir, port } => {
        // The client snippet has this port baked in, so no fallback here.
        let listener = network::bind(*port).await?;
        ui::arrow(&format!("live reload on {CYAN}ws://localhost:{port}/livereload{RESET}"));
        services.spawn(reload::serve(listener, hub.clone()));
        output_watcher = Some(watch::watch_output(watch_dir, hub.clone())?);
        ui::detail(&format!("{DIM}watching {}{RESET}", watch_dir.display()));
      }
      _ => {}
    }
  }
  Ok(output_watcher)
}

pub async fn run_dev(config: &WasmrollConfig, base_dir: &Path) -> Result<()> {
  ui::banner("dev", &config.project.name);
  let build = config.build_configuration(base_dir, true)?;
  print_plan(&build);
  ui::blank();

  let collab = Collaborators::from_config(config, base_dir, &build);
  let session = Arc::new(Session { build, collab, base_dir: base_dir.to_path_buf() });

  // A broken initial build still starts the session; the next save may fix it.
  match rebuild(&session).await {
    Ok(report) => print_report(&report, base_dir),
    Err(e) => ui::fail(&format!("build error: {e:#}")),
  }
  ui::blank();

  let hub = ReloadHub::new();
  let mut services = JoinSet::new();
  let _output_watcher = start_services(&session.build, &hub, &mut services).await?;

  let (mut source_watcher, mut source_rx) = watch::setup_watcher()?;
  let sources = watch::source_paths(&session.build);
  watch::watch_sources(&mut source_watcher, &sources)?;
  for path in &sources {
    let shown = path.strip_prefix(base_dir).unwrap_or(path);
    ui::detail(&format!("{DIM}watching {}{RESET}", shown.display()));
  }
  ui::blank();

  let quiet = Duration::from_millis(config.dev.debounce_ms);
  loop {
    tokio::select! {
      _ = signal::ctrl_c() => {
        shutdown_notice();
        break;
      }
      Some(result) = services.join_next() => {
        match result {
          Ok(Ok(())) => bail!("dev service exited unexpectedly"),
          Ok(Err(e)) => return Err(e.context("dev service failed")),
          Err(e) => bail!("dev service panicked: {e}"),
        }
      }
      Some(()) = source_rx.recv() => {
        let work = async {
          watch::debounce(&mut source_rx, quiet).await;
          handle_rebuild(&session).await;
        };
        if !until_interrupted(work, signal::ctrl_c()).await {
          shutdown_notice();
          break;
        }
      }
    }
  }

  Ok(())
}
