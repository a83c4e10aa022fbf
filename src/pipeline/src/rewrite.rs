/* src/pipeline/src/rewrite.rs */

// import.meta rewriting over the parsed module, not over raw text.
// Only `import.meta.<property>` in read position is replaced; everything
// that merely resembles it is passed through untouched.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
  ComputedMemberExpression, Expression, MetaProperty, SimpleAssignmentTarget,
  StaticMemberExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

use crate::errors::{AmbiguityReason, PipelineError, RewriteAmbiguity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMetaRewriter {
  property: String,
  token: String,
}

/// Result of rewriting one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
  pub code: String,
  pub replaced: usize,
  pub ambiguities: Vec<RewriteAmbiguity>,
}

impl Default for ImportMetaRewriter {
  fn default() -> Self {
    Self::new("url", "IMPORT_META")
  }
}

impl ImportMetaRewriter {
  pub fn new(property: impl Into<String>, token: impl Into<String>) -> Self {
    Self { property: property.into(), token: token.into() }
  }

  pub fn property(&self) -> &str {
    &self.property
  }

  pub fn token(&self) -> &str {
    &self.token
  }

  /// Replacement for `import.meta.<property>`, or `None` to leave it alone.
  pub fn resolve(&self, property: &str) -> Option<&str> {
    (property == self.property).then_some(self.token.as_str())
  }

  pub fn rewrite(&self, source: &str, module: &str) -> Result<Rewrite, PipelineError> {
    let scan = self.scan(source, module)?;
    let replaced = scan.matches.len();

    let mut code = source.to_string();
    // Spans never nest: the collector stops descending at a match.
    let mut spans = scan.matches;
    spans.sort_by(|a, b| b.start.cmp(&a.start));
    for span in spans {
      code.replace_range((span.start as usize)..(span.end as usize), &self.token);
    }

    let ambiguities = scan
      .ambiguous
      .into_iter()
      .map(|(offset, reason)| RewriteAmbiguity { module: module.to_string(), offset, reason })
      .collect();

    Ok(Rewrite { code, replaced, ambiguities })
  }

  /// Number of exact `import.meta.<property>` reads in `source`.
  pub fn count(&self, source: &str) -> Result<usize, PipelineError> {
    Ok(self.scan(source, "<count>")?.matches.len())
  }

  fn scan(&self, source: &str, module: &str) -> Result<MetaAccessCollector<'_>, PipelineError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
      let message =
        ret.errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
      return Err(PipelineError::Parse { module: module.to_string(), message });
    }

    let mut collector = MetaAccessCollector::new(&self.property);
    collector.visit_program(&ret.program);
    Ok(collector)
  }
}

struct MetaAccessCollector<'r> {
  property: &'r str,
  matches: Vec<Span>,
  ambiguous: Vec<(u32, AmbiguityReason)>,
}

impl<'r> MetaAccessCollector<'r> {
  fn new(property: &'r str) -> Self {
    Self { property, matches: Vec::new(), ambiguous: Vec::new() }
  }
}

fn is_import_meta_property(meta: &MetaProperty<'_>) -> bool {
  meta.meta.name.as_str() == "import" && meta.property.name.as_str() == "meta"
}

fn is_import_meta(expr: &Expression<'_>) -> bool {
  matches!(
    expr.without_parentheses(),
    Expression::MetaProperty(meta) if is_import_meta_property(meta)
  )
}

impl<'a> Visit<'a> for MetaAccessCollector<'_> {
  fn visit_static_member_expression(&mut self, it: &StaticMemberExpression<'a>) {
    if is_import_meta(&it.object) {
      if it.property.name.as_str() == self.property {
        self.matches.push(it.span);
      }
      return;
    }
    walk::walk_static_member_expression(self, it);
  }

  fn visit_computed_member_expression(&mut self, it: &ComputedMemberExpression<'a>) {
    if is_import_meta(&it.object) {
      self.ambiguous.push((it.span.start, AmbiguityReason::ComputedAccess));
      self.visit_expression(&it.expression);
      return;
    }
    walk::walk_computed_member_expression(self, it);
  }

  fn visit_simple_assignment_target(&mut self, it: &SimpleAssignmentTarget<'a>) {
    if let SimpleAssignmentTarget::StaticMemberExpression(member) = it {
      if is_import_meta(&member.object) {
        if member.property.name.as_str() == self.property {
          self.ambiguous.push((member.span.start, AmbiguityReason::AssignmentTarget));
        }
        return;
      }
    }
    walk::walk_simple_assignment_target(self, it);
  }

  // Reached only when import.meta is not the object of a member access.
  fn visit_meta_property(&mut self, it: &MetaProperty<'a>) {
    if is_import_meta_property(it) {
      self.ambiguous.push((it.span.start, AmbiguityReason::BareMetaObject));
    }
  }
}
