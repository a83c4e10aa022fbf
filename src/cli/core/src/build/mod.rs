/* src/cli/core/src/build/mod.rs */

pub mod emit;
pub mod engine;
pub mod livereload;
pub mod minify;
pub mod run;
pub mod sourcemap;
pub mod toolchain;

#[cfg(test)]
mod tests;
