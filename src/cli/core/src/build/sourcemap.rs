/* src/cli/core/src/build/sourcemap.rs */

// Line-level identity map for unminified output: generated line N+prefix maps
// to column 0 of source line N.

use serde_json::json;

pub fn identity_map(file: &str, source_name: &str, source: &str, prefix_lines: usize) -> String {
  let lines = source.lines().count().max(1);
  let mut mappings = ";".repeat(prefix_lines);
  mappings.push_str("AAAA");
  for _ in 1..lines {
    // next generated line, same source, +1 source line, column 0
    mappings.push_str(";AACA");
  }
  json!({
    "version": 3,
    "file": file,
    "sources": [source_name],
    "sourcesContent": [source],
    "names": [],
    "mappings": mappings,
  })
  .to_string()
}

pub fn mapping_comment(map_file: &str) -> String {
  format!("//# sourceMappingURL={map_file}\n")
}
