/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

#[cfg(test)]
use loader::{CONFIG_FILE, find_config, load_config};

pub use loader::resolve_config;
pub use types::WasmrollConfig;
