/* src/pipeline/src/env.rs */

// Watch-mode flag: presence semantics, the value itself is not parsed.

pub const WATCH_ENV: &str = "WASMROLL_WATCH";

/// Unset and empty are false; any other value is true.
pub fn is_truthy(value: Option<&str>) -> bool {
  value.is_some_and(|v| !v.is_empty())
}

/// Read `WASMROLL_WATCH` from the process environment.
/// A value that is not valid unicode counts as unset.
pub fn watch_mode_from_env() -> bool {
  is_truthy(std::env::var(WATCH_ENV).ok().as_deref())
}
