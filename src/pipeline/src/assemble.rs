/* src/pipeline/src/assemble.rs */

// Pass order is fixed here: ingest, dev-server, live-reload, minify, rewrite.
// The rewrite pass stays last so it sees the final text (after minification).

use crate::pass::{Activation, PassDescriptor, PassKind, PassOptions};

#[derive(Debug, Clone, Default)]
pub struct PipelineAssembler {
  options: PassOptions,
}

impl PipelineAssembler {
  pub fn new(options: PassOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &PassOptions {
    &self.options
  }

  /// Every pass the pipeline knows about, in execution order.
  pub fn candidates(&self) -> Vec<PassDescriptor> {
    let o = &self.options;
    vec![
      PassDescriptor::new(
        PassKind::Ingest { server_path: o.server_path.clone() },
        Activation::Always,
      ),
      PassDescriptor::new(
        PassKind::DevServer {
          content_base: o.content_base.clone(),
          port: o.dev_port,
          open: o.open,
        },
        Activation::WatchOnly,
      ),
      PassDescriptor::new(
        PassKind::LiveReload { watch_dir: o.livereload_dir.clone(), port: o.livereload_port },
        Activation::WatchOnly,
      ),
      PassDescriptor::new(PassKind::Minify, Activation::ReleaseOnly),
      PassDescriptor::new(
        PassKind::RewriteImportMeta {
          property: o.meta_property.clone(),
          token: o.meta_token.clone(),
        },
        Activation::Always,
      ),
    ]
  }

  pub fn assemble(&self, watch: bool) -> Vec<PassDescriptor> {
    self.candidates().into_iter().filter(|p| p.activation.is_active(watch)).collect()
  }
}

pub fn assemble(watch: bool, options: &PassOptions) -> Vec<PassDescriptor> {
  PipelineAssembler::new(options.clone()).assemble(watch)
}
