/* src/cli/core/src/build/livereload.rs */

// Browser side of live reload, prepended to each module in watch builds.
// Workers have no `window`, so the snippet is a no-op there.

pub const RELOAD_PATH: &str = "/livereload";
pub const RELOAD_MESSAGE: &str = "reload";

pub fn client_snippet(port: u16) -> String {
  format!(
    "(function(){{if(typeof window===\"undefined\"||window.__wasmrollReload)return;\
     window.__wasmrollReload=true;\
     var ws=new WebSocket(\"ws://\"+(location.hostname||\"localhost\")+\":{port}{RELOAD_PATH}\");\
     ws.onmessage=function(e){{if(e.data===\"{RELOAD_MESSAGE}\")location.reload();}};}})();\n"
  )
}

pub fn inject(code: &str, port: u16) -> String {
  let mut out = client_snippet(port);
  out.push_str(code);
  out
}

/// Lines added in front of the module by `inject`.
pub fn injected_lines() -> usize {
  1
}
