//! # errlog-rules
//!
//! Lint rules for the error-log-or-return checker.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | ELR001 | `error_log_or_return` | Method declares `err` but neither defers a log of it nor returns `error` |
//! | ELR002 | `error_log_or_return` | Method returns `error` and also defers a log of `&err` |
//!
//! ## Usage
//!
//! ```ignore
//! use errlog_core::Analyzer;
//! use errlog_go::GoFrontend;
//! use errlog_rules::ErrorLogOrReturn;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./internal")
//!     .frontend(GoFrontend::new())
//!     .rule(ErrorLogOrReturn::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error_log_or_return;
pub mod patterns;

pub use error_log_or_return::{ErrorLogOrReturn, CODE_DOUBLE_HANDLED, CODE_UNHANDLED, NAME};
pub use patterns::FunctionFacts;

/// Re-export core types for convenience.
pub use errlog_core::{Rule, RuleBox, Violation};

/// Returns every built-in rule.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(ErrorLogOrReturn::new())]
}
