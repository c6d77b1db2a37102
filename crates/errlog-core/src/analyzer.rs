//! Core analyzer for orchestrating lint execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ast::SourceFile;
use crate::config::{IgnoreConfig, Settings};
use crate::context::FileContext;
use crate::filter::{AdmissibleFiles, FileFilter};
use crate::frontend::{FrontendError, LanguageFrontend};
use crate::rule::{Rule, RuleBox};
use crate::types::LintResult;
use crate::utils::suppression::CommentIndex;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Directory traversal error.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Frontend initialization error.
    #[error(transparent)]
    Frontend(FrontendError),

    /// No language frontend was registered.
    #[error("No language frontend configured")]
    NoFrontend,
}

impl From<FrontendError> for AnalyzerError {
    fn from(err: FrontendError) -> Self {
        match err {
            FrontendError::Parse { path, message } => Self::Parse { path, message },
            other @ FrontendError::Language { .. } => Self::Frontend(other),
        }
    }
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    recursive: bool,
    frontend: Option<Box<dyn LanguageFrontend>>,
    rules: Vec<RuleBox>,
    ignore: IgnoreConfig,
    fail_on_parse_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Includes subdirectories of the root.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Applies root, recursion and ignore configuration from run settings.
    #[must_use]
    pub fn settings(self, settings: &Settings) -> Self {
        self.root(settings.base_path.clone())
            .recursive(settings.recursive)
            .ignore(settings.ignore.clone())
    }

    /// Sets the language frontend.
    #[must_use]
    pub fn frontend<F: LanguageFrontend + 'static>(mut self, frontend: F) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the ignore configuration.
    #[must_use]
    pub fn ignore(mut self, ignore: IgnoreConfig) -> Self {
        self.ignore = ignore;
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if no frontend was set or the current directory is
    /// needed and unavailable.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let frontend = self.frontend.ok_or(AnalyzerError::NoFrontend)?;
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        Ok(Analyzer {
            root: crate::utils::paths::clean_path(&root),
            recursive: self.recursive,
            frontend,
            rules: self.rules,
            ignore: self.ignore,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    recursive: bool,
    frontend: Box<dyn LanguageFrontend>,
    rules: Vec<RuleBox>,
    ignore: IgnoreConfig,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the base directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes all packages under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, a file cannot be read, or a
    /// file fails to parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {}", self.root.display());

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let mut filter = FileFilter::new(&self.root, &self.ignore);
        let admissible = filter.admissible(files.iter().map(PathBuf::as_path));

        let mut result = LintResult::new();
        result.files_checked = admissible.len();
        result.files_ignored = files.len() - admissible.len();

        for ((dir, _), package) in self.parse_packages(&files)? {
            debug!(
                "Checking package {} in {} ({} files)",
                package.first().map_or("", |f| f.package.as_str()),
                dir.display(),
                package.len()
            );
            self.check_package(&package, &admissible, &mut filter, &mut result);
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every rule over every file of one package.
    fn check_package(
        &self,
        package: &[SourceFile],
        admissible: &AdmissibleFiles,
        filter: &mut FileFilter<'_>,
        result: &mut LintResult,
    ) {
        let types = self.frontend.resolve_types(package);

        for file in package {
            debug!("Processing file: {}", file.path.display());
            let ctx = FileContext {
                path: &file.path,
                relative_path: PathBuf::from(filter.normalize(&file.path)),
                comments: CommentIndex::new(&file.comments),
                types: types.as_ref(),
                admissible,
            };
            for rule in &self.rules {
                result.violations.extend(rule.check(&ctx, file));
            }
        }
    }

    /// Parses files and groups them by directory and declared package name.
    fn parse_packages(
        &self,
        files: &[PathBuf],
    ) -> Result<BTreeMap<(PathBuf, String), Vec<SourceFile>>, AnalyzerError> {
        let mut packages: BTreeMap<(PathBuf, String), Vec<SourceFile>> = BTreeMap::new();

        for path in files {
            let content = std::fs::read_to_string(path)?;
            let source = match self.frontend.parse(path, &content) {
                Ok(source) => source,
                Err(FrontendError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            packages
                .entry((dir, source.package.clone()))
                .or_default()
                .push(source);
        }

        Ok(packages)
    }

    /// Discovers source files handled by the frontend, in sorted order.
    ///
    /// Directories and files whose names start with `.` or `_`, and
    /// `testdata` directories, are skipped below the root.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .max_depth(if self.recursive { None } else { Some(1) })
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !(name.starts_with('.') || name.starts_with('_') || name == "testdata")
            });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if is_file && self.frontend.handles(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
