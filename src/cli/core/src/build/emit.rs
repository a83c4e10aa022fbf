/* src/cli/core/src/build/emit.rs */

// Output emission as one unit: every file is staged next to its target,
// then moved into place. If any step fails, the targets already replaced
// are restored from their backups and the directory looks as it did before.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wasmroll_pipeline::OutputDescriptor;

use super::engine::BundleOutput;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
  pub path: PathBuf,
  pub bytes: u64,
}

/// Remove a file, treating one that is already gone as removed.
pub(crate) fn remove_if_exists(path: &Path) -> std::io::Result<()> {
  match std::fs::remove_file(path) {
    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

/// Hidden sibling used while a write or removal is in flight.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
  let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
  path.with_file_name(format!(".{file_name}.{suffix}"))
}

/// A target touched during commit, with what it takes to undo it.
struct Applied {
  target: PathBuf,
  backup: Option<PathBuf>,
  placed: bool,
}

#[derive(Default)]
struct Transaction {
  writes: Vec<(PathBuf, PathBuf)>,
  removals: Vec<PathBuf>,
  applied: Vec<Applied>,
}

impl Transaction {
  fn stage_write(&mut self, target: PathBuf, contents: &[u8]) -> Result<()> {
    let tmp = sibling(&target, "tmp");
    self.writes.push((tmp.clone(), target));
    std::fs::write(&tmp, contents).with_context(|| format!("failed to write {}", tmp.display()))
  }

  fn stage_removal(&mut self, target: PathBuf) {
    if target.is_file() {
      self.removals.push(target);
    }
  }

  /// Move an existing file out of the way so it can be restored.
  fn back_up(target: &Path) -> Result<Option<PathBuf>> {
    if !target.is_file() {
      return Ok(None);
    }
    let backup = sibling(target, "bak");
    std::fs::rename(target, &backup)
      .with_context(|| format!("failed to back up {}", target.display()))?;
    Ok(Some(backup))
  }

  fn commit(&mut self) -> Result<()> {
    let writes = self.writes.clone();
    for (tmp, target) in &writes {
      let backup = Self::back_up(target)?;
      self.applied.push(Applied { target: target.clone(), backup, placed: false });
      std::fs::rename(tmp, target)
        .with_context(|| format!("failed to move {} into place", target.display()))?;
      if let Some(last) = self.applied.last_mut() {
        last.placed = true;
      }
    }

    for target in std::mem::take(&mut self.removals) {
      let backup = Self::back_up(&target)?;
      self.applied.push(Applied { target, backup, placed: false });
    }
    Ok(())
  }

  /// Drop the backups of a committed transaction.
  fn finish(self) {
    for applied in self.applied {
      if let Some(backup) = applied.backup {
        if let Err(e) = remove_if_exists(&backup) {
          ui::warn(&format!("could not remove {}: {e}", backup.display()));
        }
      }
    }
  }

  /// Undo everything applied so far and delete staged files.
  fn rollback(self) {
    for applied in self.applied.into_iter().rev() {
      if applied.placed {
        if let Err(e) = remove_if_exists(&applied.target) {
          ui::warn(&format!("could not remove {}: {e}", applied.target.display()));
        }
      }
      if let Some(backup) = applied.backup {
        if let Err(e) = std::fs::rename(&backup, &applied.target) {
          ui::warn(&format!("could not restore {}: {e}", applied.target.display()));
        }
      }
    }
    for (tmp, _) in self.writes {
      if let Err(e) = remove_if_exists(&tmp) {
        ui::warn(&format!("could not remove {}: {e}", tmp.display()));
      }
    }
  }
}

fn stage_all(
  tx: &mut Transaction,
  output: &OutputDescriptor,
  bundles: &[BundleOutput],
) -> Result<Vec<EmittedFile>> {
  let mut files = Vec::new();
  for bundle in bundles {
    let module_path = output.module_path(&bundle.name);
    tx.stage_write(module_path.clone(), bundle.code.as_bytes())?;
    files.push(EmittedFile { path: module_path, bytes: bundle.code.len() as u64 });

    let payload_path = output.payload_path(&bundle.name);
    tx.stage_write(payload_path.clone(), &bundle.payload)?;
    files.push(EmittedFile { path: payload_path, bytes: bundle.payload.len() as u64 });

    let map_path = output.sourcemap_path(&bundle.name);
    match &bundle.sourcemap {
      Some(map) => {
        tx.stage_write(map_path.clone(), map.as_bytes())?;
        files.push(EmittedFile { path: map_path, bytes: map.len() as u64 });
      }
      // A map from an earlier build would describe different code.
      None => tx.stage_removal(map_path),
    }
  }
  Ok(files)
}

/// Write every bundle into the shared output directory, all or nothing.
pub fn write_outputs(
  output: &OutputDescriptor,
  bundles: &[BundleOutput],
) -> Result<Vec<EmittedFile>> {
  std::fs::create_dir_all(&output.dir)
    .with_context(|| format!("failed to create {}", output.dir.display()))?;

  let mut tx = Transaction::default();
  let result = stage_all(&mut tx, output, bundles).and_then(|files| tx.commit().map(|()| files));
  match result {
    Ok(files) => {
      tx.finish();
      Ok(files)
    }
    Err(e) => {
      tx.rollback();
      Err(e)
    }
  }
}
