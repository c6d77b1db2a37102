//! Language frontend extension point.
//!
//! A frontend turns source text into the [`crate::ast`] model and builds the
//! package-level [`TypeInfo`] the rules query. The analyzer only ever talks to
//! this trait, so the parser stack stays out of the core.

use std::path::{Path, PathBuf};

use crate::ast::SourceFile;
use crate::typeinfo::TypeInfo;

/// Errors raised by a frontend.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    /// The parser could not be initialized for the language.
    #[error("failed to load {language} grammar: {message}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Underlying error message.
        message: String,
    },

    /// The parser produced no tree for the file.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },
}

/// Trait for language-specific parsing and type resolution.
pub trait LanguageFrontend: Send + Sync {
    /// Language identifier (e.g., `"go"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this frontend handles (e.g., `&[".go"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Parses one file into the syntax model.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed at all.
    fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, FrontendError>;

    /// Builds the type oracle for one package from all of its files.
    fn resolve_types(&self, files: &[SourceFile]) -> Box<dyn TypeInfo>;

    /// True if `path` has one of this frontend's extensions.
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.trim_start_matches('.') == ext)
            })
    }
}
