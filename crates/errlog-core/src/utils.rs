//! Utility functions for rule implementations.

pub mod paths;
pub mod suppression;

#[doc(inline)]
pub use paths::{normalize_separators, relative_path, PackagePattern};
#[doc(inline)]
pub use suppression::{is_suppressed, nolint_token, CommentIndex};
