//! # errlog-go
//!
//! Tree-sitter based Go frontend for the error-log-or-return linter.
//!
//! - [`GoFrontend`] parses `.go` files and lowers them into the
//!   `errlog_core::ast` model
//! - [`PackageTypes`] answers type queries from package declarations and a
//!   table of standard library signatures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frontend;
mod lower;
mod types;

pub use frontend::GoFrontend;
pub use types::PackageTypes;
