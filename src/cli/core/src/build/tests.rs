/* src/cli/core/src/build/tests.rs */

use std::cell::RefCell;
use std::path::Path;

use anyhow::{Result, bail};
use wasmroll_pipeline::{
  BuildConfiguration, Entry, EntryMap, ModuleFormat, OutputDescriptor, PassOptions,
};

use super::minify::{Minified, Minifier};
use super::run::build_once;
use super::toolchain::{CompiledUnit, Toolchain, link_payload};

const SHIM: &str = "let wasm;\n\
async function __wbg_init(module_or_path) {\n\
  if (typeof module_or_path === 'undefined') {\n\
    module_or_path = new URL('NAME_bg.wasm', import.meta.url);\n\
  }\n\
  return module_or_path;\n\
}\n\
export default __wbg_init;\n";

struct FakeToolchain {
  fail_on: Option<&'static str>,
  loader: Option<&'static str>,
}

impl FakeToolchain {
  fn ok() -> Self {
    Self { fail_on: None, loader: None }
  }
}

impl Toolchain for FakeToolchain {
  fn compile(&self, entry: &Entry, server_path: &str) -> Result<CompiledUnit> {
    if self.fail_on == Some(entry.name.as_str()) {
      bail!("error[E0425]: cannot find value `x` in this scope");
    }
    let shim = match self.loader {
      Some(code) => code.to_string(),
      None => SHIM.replace("NAME", &entry.name),
    };
    Ok(CompiledUnit {
      loader: link_payload(&shim, server_path, &entry.name),
      payload: b"\0asm\x01\0\0\0".to_vec(),
    })
  }
}

#[derive(Default)]
struct FakeMinifier {
  calls: RefCell<Vec<String>>,
}

impl Minifier for FakeMinifier {
  fn minify(&self, name: &str, code: &str) -> Result<Minified> {
    self.calls.borrow_mut().push(name.to_string());
    let code = code.lines().map(str::trim).collect::<Vec<_>>().join("");
    Ok(Minified { code, sourcemap: None })
  }
}

fn configuration(out: &Path, watch: bool, sourcemap: bool) -> BuildConfiguration {
  let entries = EntryMap::new(vec![
    Entry::new("A", "./Cargo.toml"),
    Entry::new("B", "./src/b/Cargo.toml"),
    Entry::new("C", "./src/c/Cargo.toml"),
  ])
  .unwrap();
  let output = OutputDescriptor { dir: out.to_path_buf(), format: ModuleFormat::Es, sourcemap };
  BuildConfiguration::new(entries, output, PassOptions::default(), watch).unwrap()
}

#[test]
fn release_build_writes_every_entry() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, false, true);
  let minifier = FakeMinifier::default();

  let report = build_once(&build, &FakeToolchain::ok(), &minifier).unwrap();

  assert_eq!(*minifier.calls.borrow(), vec!["A", "B", "C"]);
  assert_eq!(report.rewritten, 3);
  assert!(report.warnings.is_empty());
  for name in ["A", "B", "C"] {
    let code = std::fs::read_to_string(out.join(format!("{name}.js"))).unwrap();
    assert!(!code.contains("import.meta.url"));
    assert!(code.contains(&format!("new URL('{name}_bg.wasm', IMPORT_META)")));
    assert!(code.contains(&format!("export const payloadUrl = \"/js/{name}_bg.wasm\";")));
    assert!(!code.contains("__wasmrollReload"));
    assert_eq!(std::fs::read(out.join(format!("{name}_bg.wasm"))).unwrap(), b"\0asm\x01\0\0\0");
    // The fake minifier writes no map
    assert!(!out.join(format!("{name}.js.map")).exists());
  }
}

#[test]
fn watch_build_skips_minifier_and_injects_reload_client() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, true, true);
  let minifier = FakeMinifier::default();

  let report = build_once(&build, &FakeToolchain::ok(), &minifier).unwrap();

  assert!(minifier.calls.borrow().is_empty());
  assert_eq!(report.rewritten, 3);
  let code = std::fs::read_to_string(out.join("A.js")).unwrap();
  assert!(code.starts_with("(function(){"));
  assert!(code.contains(":35729/livereload"));
  assert!(code.ends_with("//# sourceMappingURL=A.js.map\n"));
  assert!(!code.contains("import.meta.url"));

  let map: serde_json::Value =
    serde_json::from_str(&std::fs::read_to_string(out.join("A.js.map")).unwrap()).unwrap();
  assert_eq!(map["file"], "A.js");
  assert!(map["mappings"].as_str().unwrap().starts_with(";AAAA;AACA"));
  assert!(map["sourcesContent"][0].as_str().unwrap().contains("import.meta.url"));
}

#[test]
fn failing_entry_writes_nothing() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, false, true);
  let toolchain = FakeToolchain { fail_on: Some("B"), loader: None };

  let err = build_once(&build, &toolchain, &FakeMinifier::default()).unwrap_err();

  let msg = format!("{err:#}");
  assert!(msg.contains("failed to compile entry \"B\""), "{msg}");
  assert!(msg.contains("E0425"), "{msg}");
  assert!(!out.exists());
}

#[test]
fn failed_rebuild_keeps_previous_output() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, true, false);

  build_once(&build, &FakeToolchain::ok(), &FakeMinifier::default()).unwrap();
  let before = std::fs::read_to_string(out.join("A.js")).unwrap();

  let broken = FakeToolchain { fail_on: Some("C"), loader: None };
  assert!(build_once(&build, &broken, &FakeMinifier::default()).is_err());
  assert_eq!(std::fs::read_to_string(out.join("A.js")).unwrap(), before);
}

#[test]
fn ambiguous_access_is_reported_not_rewritten() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, false, false);
  let loader = "const k = 'url';\nexport const u = import.meta[k];\n";
  let toolchain = FakeToolchain { fail_on: None, loader: Some(loader) };

  let report = build_once(&build, &toolchain, &FakeMinifier::default()).unwrap();

  assert_eq!(report.rewritten, 0);
  assert_eq!(report.warnings.len(), 3);
  assert_eq!(report.warnings[1].module, "B");
  let code = std::fs::read_to_string(out.join("B.js")).unwrap();
  assert!(code.contains("import.meta[k]"));
}

#[test]
fn unparseable_loader_aborts_build() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let build = configuration(&out, true, false);
  let toolchain = FakeToolchain { fail_on: None, loader: Some("export default {") };

  let err = build_once(&build, &toolchain, &FakeMinifier::default()).unwrap_err();
  assert!(err.to_string().contains("PARSE_ERROR"));
  assert!(!out.exists());
}

#[test]
fn disabling_sourcemaps_removes_stale_map() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");

  build_once(&configuration(&out, true, true), &FakeToolchain::ok(), &FakeMinifier::default())
    .unwrap();
  assert!(out.join("A.js.map").exists());

  build_once(&configuration(&out, true, false), &FakeToolchain::ok(), &FakeMinifier::default())
    .unwrap();
  assert!(!out.join("A.js.map").exists());
  let code = std::fs::read_to_string(out.join("A.js")).unwrap();
  assert!(!code.contains("sourceMappingURL"));
}

#[test]
fn loader_initializes_its_payload_from_server_path() {
  let tmp = tempfile::tempdir().unwrap();
  let out = tmp.path().join("dist/js");
  let entries = EntryMap::new(vec![Entry::new("thread1", "./src/thread1/Cargo.toml")]).unwrap();
  let output = OutputDescriptor { dir: out.clone(), format: ModuleFormat::Es, sourcemap: false };
  let build = BuildConfiguration::new(entries, output, PassOptions::default(), false).unwrap();

  build_once(&build, &FakeToolchain::ok(), &FakeMinifier::default()).unwrap();

  let code = std::fs::read_to_string(out.join("thread1.js")).unwrap();
  let url = code.find("export const payloadUrl = \"/js/thread1_bg.wasm\";").unwrap();
  let init = code.find("await __wbg_init({ module_or_path: payloadUrl });").unwrap();
  assert!(url < init);
  assert!(code.contains("export default __wbg_init;"));
}
