//! # errlog-core
//!
//! Core framework for the `error_log_or_return` linter.
//!
//! This crate provides the language-neutral pieces:
//!
//! - [`ast`] and [`visit`]: the syntax model frontends lower into, and its traversal
//! - [`TypeInfo`] and [`Scope`]: static type queries rules make while walking a function
//! - [`LanguageFrontend`]: the parser extension point
//! - [`FileFilter`]: path normalization and ignore configuration
//! - [`Rule`] and [`Analyzer`]: rule dispatch over a package tree
//! - [`Violation`] and [`LintResult`]: lint findings
//!
//! ## Example
//!
//! ```ignore
//! use errlog_core::{Analyzer, Settings};
//!
//! let analyzer = Analyzer::builder()
//!     .settings(&Settings::new("/repo").recursive(true))
//!     .frontend(GoFrontend::new())
//!     .rule(ErrorLogOrReturn::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! print!("{}", result.format_report());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod visit;

mod analyzer;
mod config;
mod context;
mod filter;
mod frontend;
mod rule;
mod typeinfo;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use ast::SourceFile;
pub use config::{verbose_from_env, ConfigError, IgnoreConfig, Settings, VERBOSE_ENV};
pub use context::FileContext;
pub use filter::{AdmissibleFiles, FileFilter};
pub use frontend::{FrontendError, LanguageFrontend};
pub use rule::{Rule, RuleBox};
pub use typeinfo::{Scope, ScopeOnly, TypeInfo, BLANK};
pub use types::{LintResult, Location, Violation, ViolationDiagnostic};
