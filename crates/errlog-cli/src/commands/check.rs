//! Runs the linter over one package pattern.

use anyhow::{Context, Result};
use errlog_core::utils::paths::PackagePattern;
use errlog_core::{Analyzer, IgnoreConfig, LintResult, Settings};
use errlog_go::GoFrontend;
use errlog_rules::all_rules;
use std::path::{Path, PathBuf};

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

fn load_ignore(source: &ConfigSource) -> Result<IgnoreConfig> {
    let Some(path) = source.path() else {
        return Ok(IgnoreConfig::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    IgnoreConfig::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Process exit status for a finished run: 1 when anything was reported.
pub fn exit_code(result: &LintResult) -> u8 {
    u8::from(result.has_violations())
}

/// Resolves the pattern and configuration, then analyzes. Returns the result
/// and the base directory its paths are relative to.
fn analyze(pattern: Option<&str>, config: Option<&Path>) -> Result<(LintResult, PathBuf)> {
    let pattern = PackagePattern::parse(pattern).context("Failed to resolve package pattern")?;
    let source = config_resolver::resolve(&pattern.base, config);
    let ignore = load_ignore(&source)?;

    let settings = Settings::new(pattern.base)
        .recursive(pattern.recursive)
        .ignore(ignore);

    let mut builder = Analyzer::builder()
        .settings(&settings)
        .frontend(GoFrontend::new());
    for rule in all_rules() {
        builder = builder.rule_box(rule);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rule(s)",
        analyzer.root().display(),
        analyzer.rule_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;
    Ok((result, analyzer.root().to_path_buf()))
}

/// Analyzes `pattern`, prints the report and returns the exit status.
pub fn run(pattern: Option<&str>, config: Option<&Path>, format: OutputFormat) -> Result<u8> {
    let (result, base) = analyze(pattern, config)?;
    super::output::print(&result, format, &base)?;
    Ok(exit_code(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLEAN: &str = "package svc\n\ntype S struct{}\n\n\
        func (s *S) M() error {\n\tvar err error\n\treturn err\n}\n";
    const DROPS: &str = "package svc\n\ntype S struct{}\n\n\
        func (s *S) M() {\n\tvar err error\n\t_ = err\n}\n";

    fn project(source: &str) -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("svc.go"), source).unwrap();
        tmp
    }

    fn pattern(dir: &TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[test]
    fn default_source_ignores_nothing() {
        let ignore = load_ignore(&ConfigSource::Default).unwrap();
        assert!(ignore.is_empty());
    }

    #[test]
    fn missing_explicit_config_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");

        let err = load_ignore(&ConfigSource::Explicit(missing)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load config"));
    }

    #[test]
    fn malformed_config_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("error-log-or-return.toml");
        fs::write(&path, "ignore = [\"unterminated\n").unwrap();

        assert!(load_ignore(&ConfigSource::Project(path)).is_err());
    }

    #[test]
    fn invalid_glob_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "ignore = [\"[unclosed\"]\n").unwrap();

        let err = load_ignore(&ConfigSource::Explicit(path)).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid ignore pattern"));
    }

    #[test]
    fn project_config_is_applied() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("error-log-or-return.toml");
        fs::write(&path, "ignore = [\"*_mock.go\"]\n").unwrap();

        let ignore = load_ignore(&ConfigSource::Project(path)).unwrap();
        assert!(ignore.should_ignore("store_mock.go"));
    }

    #[test]
    fn exit_status_follows_violations() {
        let dirty = project(DROPS);
        let (result, _) = analyze(Some(&pattern(&dirty)), None).unwrap();
        assert_eq!(result.violations.len(), 1);
        assert_eq!(exit_code(&result), 1);

        let clean = project(CLEAN);
        let (result, _) = analyze(Some(&pattern(&clean)), None).unwrap();
        assert!(result.violations.is_empty());
        assert_eq!(exit_code(&result), 0);
    }

    #[test]
    fn bad_explicit_config_stops_before_analysis() {
        let dirty = project(DROPS);
        let missing = dirty.path().join("nope.toml");

        let err = analyze(Some(&pattern(&dirty)), Some(&missing)).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load config"));
    }

    #[test]
    fn project_config_next_to_package_is_picked_up() {
        let dirty = project(DROPS);
        fs::write(
            dirty.path().join(".error-log-or-return.toml"),
            "ignore = [\"svc.go\"]\n",
        )
        .unwrap();

        let (result, _) = analyze(Some(&pattern(&dirty)), None).unwrap();
        assert_eq!(exit_code(&result), 0);
        assert_eq!(result.files_ignored, 1);
    }
}
