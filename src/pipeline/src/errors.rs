/* src/pipeline/src/errors.rs */

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
  /// Entry map or option values that cannot form a build.
  Configuration(String),
  /// The same pass kind was assembled twice.
  DuplicatePass(&'static str),
  /// Emitted module text the rewriter could not parse.
  Parse { module: String, message: String },
}

impl PipelineError {
  pub fn configuration(msg: impl Into<String>) -> Self {
    Self::Configuration(msg.into())
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Configuration(_) => "CONFIGURATION_ERROR",
      Self::DuplicatePass(_) => "DUPLICATE_PASS",
      Self::Parse { .. } => "PARSE_ERROR",
    }
  }
}

impl fmt::Display for PipelineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Configuration(msg) => write!(f, "{}: {msg}", self.code()),
      Self::DuplicatePass(name) => {
        write!(f, "{}: pass \"{name}\" assembled more than once", self.code())
      }
      Self::Parse { module, message } => {
        write!(f, "{}: failed to parse {module}: {message}", self.code())
      }
    }
  }
}

impl std::error::Error for PipelineError {}

/// An `import.meta` access that resembles the rewrite target but cannot be
/// rewritten safely. The expression is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteAmbiguity {
  pub module: String,
  pub offset: u32,
  pub reason: AmbiguityReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguityReason {
  /// `import.meta[key]`
  ComputedAccess,
  /// `import.meta.url = value`
  AssignmentTarget,
  /// `import.meta` escapes without a property access.
  BareMetaObject,
}

impl AmbiguityReason {
  fn describe(self) -> &'static str {
    match self {
      Self::ComputedAccess => "computed access on import.meta",
      Self::AssignmentTarget => "assignment to import.meta property",
      Self::BareMetaObject => "import.meta used without a property access",
    }
  }
}

impl fmt::Display for RewriteAmbiguity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}, left unchanged", self.module, self.offset, self.reason.describe())
  }
}

impl std::error::Error for RewriteAmbiguity {}
