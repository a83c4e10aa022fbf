/* src/cli/core/src/config/tests/parsing.rs */

use wasmroll_pipeline::ModuleFormat;

use super::*;

#[test]
fn parse_empty_config_uses_defaults() {
  let config: WasmrollConfig = toml::from_str("").unwrap();
  assert_eq!(config.project.name, "wasmroll");
  assert!(config.entries.is_empty());
  assert_eq!(config.output.dir, "dist/js");
  assert_eq!(config.output.format, ModuleFormat::Es);
  assert!(config.output.sourcemap);
  assert_eq!(config.toolchain.server_path, "/js/");
  assert_eq!(config.toolchain.command, "wasm-pack");
  assert_eq!(config.dev.content_base, "dist");
  assert_eq!(config.dev.port, 10001);
  assert!(config.dev.open);
  assert_eq!(config.dev.livereload_port, 35729);
  assert_eq!(config.rewrite.property, "url");
  assert_eq!(config.rewrite.token, "IMPORT_META");
}

#[test]
fn parse_full_config() {
  let toml_str = r#"
[project]
name = "threads"

[[entry]]
name = "index"
manifest = "./Cargo.toml"

[[entry]]
name = "worker"
manifest = "./crates/worker/Cargo.toml"

[output]
dir = "public/wasm"
format = "es"
sourcemap = false

[toolchain]
server_path = "/wasm/"
command = "npx wasm-pack"
target = "web"
extra_args = ["--features", "simd"]

[minify]
command = "esbuild --minify"

[dev]
content_base = "public"
port = 8080
open = false
livereload_dir = "public/wasm"
livereload_port = 4000
debounce_ms = 50

[rewrite]
token = "__SELF_URL__"
"#;
  let config: WasmrollConfig = toml::from_str(toml_str).unwrap();
  assert_eq!(config.project.name, "threads");
  assert_eq!(config.entries.len(), 2);
  assert_eq!(config.entries[1].name, "worker");
  assert_eq!(config.output.format, ModuleFormat::Es);
  assert!(!config.output.sourcemap);
  assert_eq!(config.toolchain.extra_args, vec!["--features", "simd"]);
  assert_eq!(config.minify.command, "esbuild --minify");
  assert_eq!(config.dev.livereload_dir.as_deref(), Some("public/wasm"));
  assert_eq!(config.dev.debounce_ms, 50);
  assert_eq!(config.rewrite.property, "url");
  assert_eq!(config.rewrite.token, "__SELF_URL__");
}

#[test]
fn default_entries_reproduce_three_crate_layout() {
  let config = WasmrollConfig::default();
  let base = Path::new("/project");
  let entries = config.entry_map(base).unwrap();
  assert_eq!(entries.names(), vec!["index", "thread1", "thread2"]);
  assert_eq!(
    entries.get("thread1").unwrap().manifest,
    PathBuf::from("/project/./src/thread1/Cargo.toml")
  );
}

#[test]
fn pass_options_resolve_against_base_dir() {
  let config: WasmrollConfig = toml::from_str("[dev]\ncontent_base = \"www\"\n").unwrap();
  let opts = config.pass_options(Path::new("/p"));
  assert_eq!(opts.content_base, PathBuf::from("/p/www"));
  assert_eq!(opts.livereload_dir, PathBuf::from("/p/www"));
  assert_eq!(opts.server_path, "/js/");
}

#[test]
fn build_configuration_scenarios() {
  let config = WasmrollConfig::default();
  let release = config.build_configuration(Path::new("/p"), false).unwrap();
  assert_eq!(release.pass_names(), vec!["ingest", "minify", "rewrite-import-meta"]);
  assert_eq!(release.output().dir, PathBuf::from("/p/dist/js"));

  let watch = config.build_configuration(Path::new("/p"), true).unwrap();
  assert_eq!(
    watch.pass_names(),
    vec!["ingest", "dev-server", "live-reload", "rewrite-import-meta"]
  );
}

#[test]
fn unknown_format_is_a_parse_error() {
  for format in ["umd", "cjs"] {
    let toml_str = format!("[output]\nformat = \"{format}\"\n");
    let result: Result<WasmrollConfig, _> = toml::from_str(&toml_str);
    assert!(result.is_err(), "{format}");
  }
}
