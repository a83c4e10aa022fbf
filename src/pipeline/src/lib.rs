/* src/pipeline/src/lib.rs */

pub mod assemble;
pub mod config;
pub mod entry;
pub mod env;
pub mod errors;
pub mod output;
pub mod pass;
pub mod rewrite;

pub use assemble::{PipelineAssembler, assemble};
pub use config::BuildConfiguration;
pub use entry::{Entry, EntryMap};
pub use env::{WATCH_ENV, is_truthy, watch_mode_from_env};
pub use errors::{AmbiguityReason, PipelineError, RewriteAmbiguity};
pub use output::{ModuleFormat, OutputDescriptor};
pub use pass::{Activation, PassDescriptor, PassKind, PassOptions};
pub use rewrite::{ImportMetaRewriter, Rewrite};
