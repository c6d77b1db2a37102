//! Comment-based suppression directives.
//!
//! A function is exempt from a rule when one of its doc comments, or any
//! comment that starts on the same line as its declaration keyword, contains
//! the rule's token:
//! ```text
//! //nolint:error_log_or_return
//! ```
//! The token is matched as a plain substring, so a comment like
//! `// legacy //nolint:error_log_or_return` also suppresses.

use std::collections::BTreeMap;

use crate::ast::{Comment, FuncDecl};

/// Returns the suppression token for `rule`.
#[must_use]
pub fn nolint_token(rule: &str) -> String {
    format!("//nolint:{rule}")
}

/// Comments of one file, indexed by starting line.
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    by_line: BTreeMap<usize, Vec<String>>,
}

impl CommentIndex {
    /// Builds the index from a file's comments.
    #[must_use]
    pub fn new(comments: &[Comment]) -> Self {
        let mut by_line: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for comment in comments {
            by_line
                .entry(comment.pos.line)
                .or_default()
                .push(comment.text.clone());
        }
        Self { by_line }
    }

    /// Comments starting on `line`.
    pub fn on_line(&self, line: usize) -> impl Iterator<Item = &str> {
        self.by_line
            .get(&line)
            .into_iter()
            .flat_map(|texts| texts.iter().map(String::as_str))
    }
}

/// True if `func` carries `token` in its doc comments or on its declaration
/// line.
#[must_use]
pub fn is_suppressed(func: &FuncDecl, index: &CommentIndex, token: &str) -> bool {
    if func.doc.iter().any(|c| c.text.contains(token)) {
        return true;
    }
    index.on_line(func.pos.line).any(|text| text.contains(token))
}
