/* src/cli/core/src/shell.rs */

// Collaborator process helpers shared by build and dev.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result, anyhow, bail};

use crate::ui::{self, DIM, RESET};

/// Run a program with explicit arguments, bail on failure.
pub(crate) fn run_program(
  cwd: &Path,
  program: &str,
  args: &[String],
  label: &str,
  env_vars: &[(&str, &str)],
) -> Result<()> {
  ui::detail(&format!("{DIM}{program} {}{RESET}", args.join(" ")));
  let mut cmd = Command::new(program);
  cmd.args(args).current_dir(cwd);
  for (key, val) in env_vars {
    cmd.env(key, val);
  }
  let output = cmd.output().with_context(|| format!("failed to run {label} ({program})"))?;
  check_status(&output, label)?;
  Ok(())
}

/// Run a shell command with `input` on stdin and return its stdout.
pub(crate) fn run_filter(
  cwd: &Path,
  command: &str,
  label: &str,
  input: &str,
  env_vars: &[(&str, &str)],
) -> Result<String> {
  ui::detail(&format!("{DIM}{command}{RESET}"));
  let mut cmd = Command::new("sh");
  cmd
    .args(["-c", command])
    .current_dir(cwd)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());
  for (key, val) in env_vars {
    cmd.env(key, val);
  }
  let mut child = cmd.spawn().with_context(|| format!("failed to run {label}"))?;

  // Feed stdin from a thread so a chatty child cannot deadlock on a full pipe.
  let mut stdin = child.stdin.take().context("child stdin unavailable")?;
  let payload = input.to_string();
  let writer = std::thread::spawn(move || stdin.write_all(payload.as_bytes()));

  let output = child.wait_with_output().with_context(|| format!("failed to wait for {label}"))?;
  let written = writer.join().map_err(|_| anyhow!("stdin writer for {label} panicked"))?;
  // Exit status first: a failed child usually explains the broken pipe.
  check_status(&output, label)?;
  written.with_context(|| format!("failed to write stdin of {label}"))?;
  String::from_utf8(output.stdout).with_context(|| format!("{label} produced non-utf8 output"))
}

fn check_status(output: &Output, label: &str) -> Result<()> {
  if output.status.success() {
    return Ok(());
  }
  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);
  let mut msg = format!("{label} exited with status {}", output.status);
  if !stderr.is_empty() {
    msg.push('\n');
    msg.push_str(&stderr);
  }
  if !stdout.is_empty() {
    msg.push('\n');
    msg.push_str(&stdout);
  }
  bail!("{msg}");
}

/// Split a configured command into program + leading arguments.
pub(crate) fn split_command(command: &str) -> Result<(String, Vec<String>)> {
  let mut parts = command.split_whitespace().map(str::to_string);
  let program = parts.next().with_context(|| format!("empty command: {command:?}"))?;
  Ok((program, parts.collect()))
}

/// Open `url` in the default browser; failures are reported, not fatal.
pub(crate) fn open_browser(url: &str) {
  let result = if cfg!(target_os = "macos") {
    Command::new("open").arg(url).stdout(Stdio::null()).stderr(Stdio::null()).status()
  } else if cfg!(target_os = "windows") {
    Command::new("cmd")
      .args(["/C", "start", "", url])
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .status()
  } else {
    Command::new("xdg-open").arg(url).stdout(Stdio::null()).stderr(Stdio::null()).status()
  };
  match result {
    Ok(s) if s.success() => {}
    _ => ui::warn(&format!("could not open a browser, visit {url}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn split_program_and_args() {
    let (program, args) = split_command("npx --no-install terser --module").unwrap();
    assert_eq!(program, "npx");
    assert_eq!(args, vec!["--no-install", "terser", "--module"]);
  }

  #[test]
  fn split_empty_command_errors() {
    assert!(split_command("   ").is_err());
  }

  #[cfg(unix)]
  #[test]
  fn filter_roundtrips_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_filter(dir.path(), "tr a-z A-Z", "upper", "hello", &[]).unwrap();
    assert_eq!(out, "HELLO");
  }

  #[cfg(unix)]
  #[test]
  fn filter_sees_env() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_filter(dir.path(), "cat; printf \"$X\"", "env", "a", &[("X", "b")]).unwrap();
    assert_eq!(out, "ab");
  }

  #[cfg(unix)]
  #[test]
  fn failing_command_reports_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_filter(dir.path(), "echo boom >&2; exit 3", "minifier", "", &[]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("minifier exited with status"));
    assert!(msg.contains("boom"));
  }
}
