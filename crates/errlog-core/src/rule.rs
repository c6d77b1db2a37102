//! Rule trait for defining lint rules.

use crate::ast::SourceFile;
use crate::context::FileContext;
use crate::types::Violation;

/// A per-file lint rule over the syntax model.
///
/// Rules receive the lowered file and a context carrying its comments, the
/// package type oracle and the admissible file set. They usually walk
/// `file.functions` and use [`crate::visit::Visitor`] for bodies.
///
/// # Example
///
/// ```ignore
/// use errlog_core::{FileContext, Location, Rule, SourceFile, Violation};
///
/// pub struct NoEmptyMethods;
///
/// impl Rule for NoEmptyMethods {
///     fn name(&self) -> &'static str { "no_empty_methods" }
///
///     fn check(&self, ctx: &FileContext<'_>, file: &SourceFile) -> Vec<Violation> {
///         file.functions
///             .iter()
///             .filter(|f| f.body.as_ref().is_some_and(|b| b.stmts.is_empty()))
///             .map(|f| Violation::new(
///                 "X001",
///                 self.name(),
///                 Location::at(ctx.relative_path.clone(), f.pos),
///                 "empty method",
///             ))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the rule name, also used in suppression directives.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext<'_>, file: &SourceFile) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
