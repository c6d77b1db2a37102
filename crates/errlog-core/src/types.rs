//! Core types for lint violations and results.

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ast::Position;

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the base directory, `/`-separated.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location from a syntax model position.
    #[must_use]
    pub fn at(file: PathBuf, pos: Position) -> Self {
        Self::new(file, pos.line, pos.column).with_span(pos.offset, 0)
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Violation code (e.g., "ELR001").
    pub code: String,
    /// Rule name (e.g., "`error_log_or_return`").
    pub rule: String,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Name of the function the violation was reported on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            location,
            message: message.into(),
            function: None,
        }
    }

    /// Records the function this violation belongs to.
    #[must_use]
    pub fn in_function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}", self.message);
        if let Some(function) = &self.function {
            let _ = writeln!(output, "  = in: {function}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.code,
            self.message
        )
    }
}

/// A violation rendered as a miette diagnostic over its source file.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{code}] {message}")]
pub struct ViolationDiagnostic {
    code: String,
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl ViolationDiagnostic {
    /// Builds a diagnostic pointing into `source`, the full file text.
    #[must_use]
    pub fn new(v: &Violation, source: String) -> Self {
        let name = v.location.file.to_string_lossy().into_owned();
        Self {
            code: v.code.clone(),
            message: v.message.clone(),
            src: NamedSource::new(name, source),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Number of files excluded by the ignore configuration.
    #[serde(default)]
    pub files_ignored: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any violation was reported.
    #[must_use]
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Counts violations per code.
    #[must_use]
    pub fn count_by_code(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.code.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Sorts violations by file, then line, then column. Stable.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
        });
    }

    /// Formats a summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Found {} violation(s) in {} file(s) ({} ignored)",
            self.violations.len(),
            self.files_checked,
            self.files_ignored
        )
    }

    /// Formats violations as a multi-line report.
    #[must_use]
    pub fn format_report(&self) -> String {
        use std::fmt::Write;

        let mut report = String::new();
        for v in &self.violations {
            let _ = writeln!(report, "{}", v.format());
        }
        let _ = writeln!(report, "{}", self.summary());
        report
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
        self.files_ignored += other.files_ignored;
    }
}
