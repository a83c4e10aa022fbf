/* src/cli/core/src/dev/watch.rs */

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::{AccessKind, AccessMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use wasmroll_pipeline::BuildConfiguration;

use super::reload::ReloadHub;
use crate::ui::{self, DIM, RESET};

pub(super) const OUTPUT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Reads (cargo opening sources, the browser fetching output) must not
/// count as changes, or every rebuild would schedule another one.
fn is_change(kind: &EventKind) -> bool {
  match kind {
    EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
    EventKind::Access(_) => false,
    _ => true,
  }
}

/// Dot-files are staging copies and backups (ours or an editor's). An event
/// touching only those changes nothing that is served or compiled.
fn touches_visible_file(event: &notify::Event) -> bool {
  event.paths.is_empty()
    || event.paths.iter().any(|path| {
      path.file_name().is_some_and(|name| !name.to_string_lossy().starts_with('.'))
    })
}

pub(super) fn setup_watcher() -> Result<(RecommendedWatcher, mpsc::Receiver<()>)> {
  let (tx, rx) = mpsc::channel(16);
  let watcher = RecommendedWatcher::new(
    move |res: std::result::Result<notify::Event, notify::Error>| {
      if let Ok(event) = res {
        if is_change(&event.kind) && touches_visible_file(&event) {
          // A full channel already holds a pending signal
          let _ = tx.try_send(());
        }
      }
    },
    notify::Config::default(),
  )?;
  Ok((watcher, rx))
}

/// Wait out a burst of events, then drop whatever queued up meanwhile.
pub(super) async fn debounce(rx: &mut mpsc::Receiver<()>, quiet: Duration) {
  tokio::time::sleep(quiet).await;
  while rx.try_recv().is_ok() {}
}

/// Each entry's `src/` directory and manifest, minus paths already covered
/// by a watched ancestor.
pub(super) fn source_paths(build: &BuildConfiguration) -> Vec<PathBuf> {
  let mut paths: Vec<PathBuf> = Vec::new();
  for entry in build.entries() {
    let src = entry.crate_dir().join("src");
    if src.is_dir() {
      paths.push(src);
    }
    if entry.manifest.is_file() {
      paths.push(entry.manifest.clone());
    }
  }
  paths.sort();
  paths.dedup();

  let mut kept: Vec<PathBuf> = Vec::new();
  for path in paths {
    if !kept.iter().any(|k| path.starts_with(k)) {
      kept.push(path);
    }
  }
  kept
}

pub(super) fn watch_sources(watcher: &mut RecommendedWatcher, paths: &[PathBuf]) -> Result<()> {
  for path in paths {
    let mode = if path.is_dir() { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive };
    watcher.watch(path, mode).with_context(|| format!("failed to watch {}", path.display()))?;
  }
  Ok(())
}

/// Broadcast a reload whenever files under `dir` settle after a change.
/// The returned watcher must be kept alive for as long as reloads are wanted.
pub(super) fn watch_output(dir: &Path, hub: ReloadHub) -> Result<RecommendedWatcher> {
  std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
  let (mut watcher, mut rx) = setup_watcher()?;
  watcher
    .watch(dir, RecursiveMode::Recursive)
    .with_context(|| format!("failed to watch {}", dir.display()))?;

  tokio::spawn(async move {
    while rx.recv().await.is_some() {
      debounce(&mut rx, OUTPUT_DEBOUNCE).await;
      let clients = hub.notify();
      ui::detail(&format!("{DIM}reload sent to {clients} client(s){RESET}"));
    }
  });
  Ok(watcher)
}
