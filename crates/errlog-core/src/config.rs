//! Configuration types for error-log-or-return.
//!
//! The ignore configuration is a small TOML document:
//!
//! ```toml
//! ignore = ["vendor/**", "*_mock.go", "internal/generated"]
//! ```
//!
//! Run-wide settings are gathered once at startup into [`Settings`] and passed
//! down by reference.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that enables verbose tracing.
pub const VERBOSE_ENV: &str = "ERROR_LOG_OR_RETURN_VERBOSE";

/// Returns true for the recognized verbose values, `"1"` and `"true"`.
#[must_use]
pub fn verbose_from_env(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true"))
}

/// On-disk shape of the ignore configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IgnoreFile {
    #[serde(default)]
    ignore: Vec<String>,
}

/// A compiled ignore entry.
#[derive(Debug, Clone)]
struct IgnorePattern {
    raw: String,
    glob: glob::Pattern,
    literal: bool,
}

impl IgnorePattern {
    fn new(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim().trim_start_matches("./").trim_end_matches('/');
        let glob = glob::Pattern::new(trimmed).map_err(|e| ConfigError::Pattern {
            pattern: raw.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: trimmed.to_string(),
            glob,
            literal: !trimmed.contains(['*', '?', '[']),
        })
    }

    fn matches(&self, rel_path: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        // Patterns without a separator apply to the file name at any depth.
        if !self.raw.contains('/') {
            let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
            if self.glob.matches_with(file_name, options) {
                return true;
            }
        }

        if self.glob.matches_with(rel_path, options) {
            return true;
        }

        self.literal
            && rel_path
                .strip_prefix(self.raw.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Predicate over normalized relative paths deciding which files are skipped.
#[derive(Debug, Clone, Default)]
pub struct IgnoreConfig {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreConfig {
    /// Builds a configuration from raw pattern strings.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter(|p| !p.as_ref().trim().is_empty())
            .map(|p| IgnorePattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a pattern does not compile.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: IgnoreFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Self::new(file.ignore)
    }

    /// True if the normalized relative path is excluded from analysis.
    #[must_use]
    pub fn should_ignore(&self, rel_path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(rel_path))
    }

    /// Number of configured patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Run-wide settings, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute base directory; paths are reported relative to it.
    pub base_path: PathBuf,
    /// Whether subdirectories are analyzed as well (`/...` patterns).
    pub recursive: bool,
    /// Files to skip.
    pub ignore: IgnoreConfig,
}

impl Settings {
    /// Creates settings for a non-recursive run over `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            recursive: false,
            ignore: IgnoreConfig::default(),
        }
    }

    /// Sets whether subdirectories are included.
    #[must_use]
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets the ignore configuration.
    #[must_use]
    pub fn ignore(mut self, ignore: IgnoreConfig) -> Self {
        self.ignore = ignore;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Invalid ignore pattern.
    #[error("Invalid ignore pattern {pattern:?}: {message}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Glob error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_env_values() {
        assert!(verbose_from_env(Some("1")));
        assert!(verbose_from_env(Some("true")));
        assert!(!verbose_from_env(Some("TRUE")));
        assert!(!verbose_from_env(Some("yes")));
        assert!(!verbose_from_env(Some("0")));
        assert!(!verbose_from_env(None));
    }

    #[test]
    fn default_ignores_nothing() {
        let config = IgnoreConfig::default();
        assert!(config.is_empty());
        assert!(!config.should_ignore("main.go"));
    }

    #[test]
    fn parse_config() {
        let toml = r#"
ignore = ["vendor/**", "*_mock.go", "internal/generated"]
"#;
        let config = IgnoreConfig::parse(toml).expect("Failed to parse");
        assert_eq!(config.len(), 3);

        assert!(config.should_ignore("vendor/github.com/x/y.go"));
        assert!(config.should_ignore("service_mock.go"));
        assert!(config.should_ignore("pkg/store/store_mock.go"));
        assert!(config.should_ignore("internal/generated"));
        assert!(config.should_ignore("internal/generated/api.go"));

        assert!(!config.should_ignore("internal/generatedx/api.go"));
        assert!(!config.should_ignore("pkg/service.go"));
    }

    #[test]
    fn glob_with_separator_matches_full_path_only() {
        let config = IgnoreConfig::new(["cmd/*.go"]).expect("valid");
        assert!(config.should_ignore("cmd/main.go"));
        assert!(!config.should_ignore("cmd/tool/main.go"));
        assert!(!config.should_ignore("main.go"));
    }

    #[test]
    fn leading_dot_slash_is_stripped() {
        let config = IgnoreConfig::new(["./tools/"]).expect("valid");
        assert!(config.should_ignore("tools/gen.go"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = IgnoreConfig::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::Pattern { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = IgnoreConfig::parse("exclude = [\"x\"]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn settings_builder() {
        let settings = Settings::new("/repo")
            .recursive(true)
            .ignore(IgnoreConfig::new(["vendor/**"]).expect("valid"));
        assert!(settings.recursive);
        assert!(settings.ignore.should_ignore("vendor/a.go"));
    }
}
