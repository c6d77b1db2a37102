//! Rule: a method either logs its captured error in a deferred call or returns
//! it, never neither and never both.
//!
//! # Rationale
//!
//! Services that carry a per-receiver logger capture failures in a local `err`
//! and log it once on exit:
//!
//! ```go
//! func (s *Service) Sync() {
//!     var err error
//!     defer s.log.ErrorOrDebug(&err, "sync")
//!     err = s.store.Flush()
//! }
//! ```
//!
//! A method that also returns `error` hands the failure to its caller, which
//! logs it again. A method that captures `err` but neither logs nor returns it
//! drops the failure silently.
//!
//! # Reports
//!
//! - `ELR001`: declares `err`, no deferred log of `&err`, does not return `error`
//! - `ELR002`: returns `error` and defers a log of `&err`
//!
//! Functions without a named receiver are never checked. A
//! `//nolint:error_log_or_return` comment in the doc block or on the
//! declaration line suppresses both reports.

use errlog_core::ast::{FuncDecl, SourceFile};
use errlog_core::utils::suppression::{is_suppressed, nolint_token};
use errlog_core::{FileContext, Location, Rule, Violation};
use tracing::debug;

use crate::patterns::FunctionFacts;

/// Rule name, also the suppression directive suffix.
pub const NAME: &str = "error_log_or_return";

/// Code for a captured error that is neither logged nor returned.
pub const CODE_UNHANDLED: &str = "ELR001";

/// Code for an error that is both logged and returned.
pub const CODE_DOUBLE_HANDLED: &str = "ELR002";

const MSG_UNHANDLED: &str = "declares err but neither defers a log of it nor returns error";
const MSG_DOUBLE_HANDLED: &str = "returns error and also defers a log of &err";

/// Enforces log-or-return for methods that capture `err`.
#[derive(Debug, Clone)]
pub struct ErrorLogOrReturn {
    token: String,
}

impl Default for ErrorLogOrReturn {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorLogOrReturn {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: nolint_token(NAME),
        }
    }

    fn check_function(
        &self,
        ctx: &FileContext<'_>,
        file: &SourceFile,
        func: &FuncDecl,
    ) -> Vec<Violation> {
        if func.body.is_none() {
            return Vec::new();
        }

        debug!(
            "Processing function at {}:{}",
            ctx.relative_path.display(),
            func.pos.line
        );

        if is_suppressed(func, &ctx.comments, &self.token) {
            return Vec::new();
        }

        let receiver = func.receiver_name();
        if receiver.is_empty() {
            return Vec::new();
        }

        let facts = FunctionFacts::extract(file, func, receiver, ctx.types);
        let mut violations = Vec::new();

        if facts.has_err_var && !facts.returns_error && !facts.has_deferred_log {
            violations.push(self.report(ctx, func, CODE_UNHANDLED, MSG_UNHANDLED));
        }
        if facts.returns_error && facts.has_deferred_log {
            violations.push(self.report(ctx, func, CODE_DOUBLE_HANDLED, MSG_DOUBLE_HANDLED));
        }
        violations
    }

    fn report(
        &self,
        ctx: &FileContext<'_>,
        func: &FuncDecl,
        code: &str,
        message: &str,
    ) -> Violation {
        let location = Location::at(ctx.relative_path.clone(), func.pos)
            .with_span(func.pos.offset, func.signature_len);
        let owner = func
            .receiver
            .as_ref()
            .map_or("", |recv| recv.ty.base_name());
        Violation::new(code, self.name(), location, message)
            .in_function(format!("{owner}.{}", func.name))
    }
}

impl Rule for ErrorLogOrReturn {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Methods capturing err must either defer a log of &err or return error, not both"
    }

    fn check(&self, ctx: &FileContext<'_>, file: &SourceFile) -> Vec<Violation> {
        if !ctx.is_admissible() {
            return Vec::new();
        }

        file.functions
            .iter()
            .flat_map(|func| self.check_function(ctx, file, func))
            .collect()
    }
}
