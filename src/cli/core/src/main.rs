/* src/cli/core/src/main.rs */

mod build;
mod clean;
mod config;
mod dev;
mod shell;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wasmroll_pipeline::{WATCH_ENV, watch_mode_from_env};

use config::{WasmrollConfig, resolve_config};

#[derive(Parser)]
#[command(name = "wasmroll", about = "Multi-entry wasm bundler")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Build every entry (watch mode when WASMROLL_WATCH is set)
  Build {
    /// Path to wasmroll.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Build in watch mode, serve the output and reload on change
  Dev {
    /// Path to wasmroll.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Remove the output directory and toolchain staging files
  Clean {
    /// Path to wasmroll.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Print the assembled pass list without building
  Plan {
    /// Path to wasmroll.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Assemble for watch mode instead of reading WASMROLL_WATCH
    #[arg(short, long)]
    watch: bool,
    /// Print the full build configuration as JSON
    #[arg(long)]
    json: bool,
  },
}

fn load(explicit: Option<PathBuf>) -> Result<(PathBuf, WasmrollConfig)> {
  let cwd = std::env::current_dir().context("failed to get cwd")?;
  resolve_config(explicit, &cwd)
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Build { config } => {
      let (base_dir, config) = load(config)?;
      if watch_mode_from_env() {
        ui::detail(&format!("{WATCH_ENV} is set, starting watch mode"));
        dev::run_dev(&config, &base_dir).await?;
      } else {
        build::run::run_build(&config, &base_dir)?;
      }
    }
    Command::Dev { config } => {
      let (base_dir, config) = load(config)?;
      dev::run_dev(&config, &base_dir).await?;
    }
    Command::Clean { config } => {
      let (base_dir, config) = load(config)?;
      clean::run_clean(&config, &base_dir)?;
    }
    Command::Plan { config, watch, json } => {
      let (base_dir, config) = load(config)?;
      let build = config.build_configuration(&base_dir, watch || watch_mode_from_env())?;
      if json {
        let text =
          serde_json::to_string_pretty(&build).context("failed to serialize configuration")?;
        println!("{text}");
      } else {
        build::run::print_plan(&build);
      }
    }
  }

  Ok(())
}
