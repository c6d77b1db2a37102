//! Go language frontend using Tree-sitter.

use std::path::Path;

use errlog_core::{FrontendError, LanguageFrontend, SourceFile, TypeInfo};
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use crate::lower::Lowerer;
use crate::types::PackageTypes;

/// Parses Go source files and resolves package-level types.
pub struct GoFrontend {
    language: Language,
}

impl GoFrontend {
    /// Creates a new Go frontend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Position of the first syntax error in the tree, if any.
    fn first_error(root: Node<'_>) -> Option<(usize, usize)> {
        if !root.has_error() {
            return None;
        }
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                let point = node.start_position();
                return Some((point.row + 1, point.column + 1));
            }
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node
                .children(&mut cursor)
                .filter(Node::has_error)
                .collect();
            stack.extend(children.into_iter().rev());
        }
        let point = root.start_position();
        Some((point.row + 1, point.column + 1))
    }
}

impl Default for GoFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageFrontend for GoFrontend {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".go"]
    }

    fn parse(&self, path: &Path, source: &str) -> Result<SourceFile, FrontendError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| FrontendError::Language {
                language: "go",
                message: e.to_string(),
            })?;

        let src = source.as_bytes();
        let tree = parser.parse(src, None).ok_or_else(|| FrontendError::Parse {
            path: path.to_path_buf(),
            message: "parser returned no tree".into(),
        })?;
        let root = tree.root_node();

        if let Some((line, column)) = Self::first_error(root) {
            debug!("Syntax error in {} at {line}:{column}", path.display());
            return Err(FrontendError::Parse {
                path: path.to_path_buf(),
                message: format!("syntax error at {line}:{column}"),
            });
        }

        let file = Lowerer::new(src).file(root, path);
        debug!(
            "Lowered {}: package {}, {} functions, {} types",
            path.display(),
            file.package,
            file.functions.len(),
            file.types.len()
        );
        Ok(file)
    }

    fn resolve_types(&self, files: &[SourceFile]) -> Box<dyn TypeInfo> {
        Box::new(PackageTypes::new(files))
    }
}
