//! Ignore configuration lookup.
//!
//! The first match wins:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{base}/error-log-or-return.toml` or `.error-log-or-return.toml`
//! 3. `~/.error-log-or-return/config.toml`
//! 4. Nothing found: an empty ignore list

use std::path::{Path, PathBuf};

/// Where the ignore configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the analyzed package.
    Project(PathBuf),
    /// Found in the per-user directory.
    Global(PathBuf),
    /// No file; nothing is ignored.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

/// Project-level file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["error-log-or-return.toml", ".error-log-or-return.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Overrides the per-user configuration directory.
pub const CONFIG_DIR_ENV: &str = "ERROR_LOG_OR_RETURN_CONFIG_DIR";

/// Resolves the ignore configuration for a run rooted at `base`.
#[must_use]
pub fn resolve(base: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(base, explicit, global_config_dir())
}

fn resolve_inner(
    base: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    // A missing explicit file is reported by the loader.
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for name in PROJECT_CONFIG_NAMES {
        let candidate = base.join(name);
        if candidate.is_file() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// `$ERROR_LOG_OR_RETURN_CONFIG_DIR`, else `~/.error-log-or-return/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".error-log-or-return"))
}
