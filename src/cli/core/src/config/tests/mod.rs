/* src/cli/core/src/config/tests/mod.rs */

use std::path::{Path, PathBuf};

use super::*;

mod parsing;
