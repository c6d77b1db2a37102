//! Path utilities: package patterns, relative paths and separator normalization.

use std::path::{Component, Path, PathBuf};

/// Suffix that selects a directory and all of its subdirectories.
pub const RECURSIVE_SUFFIX: &str = "/...";

/// Errors resolving the base path.
#[derive(Debug, thiserror::Error)]
pub enum BasePathError {
    /// The current directory could not be determined.
    #[error("cannot determine current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
}

/// A parsed package pattern such as `./...` or `./internal/store`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePattern {
    /// Absolute, lexically cleaned base directory.
    pub base: PathBuf,
    /// Whether subdirectories are included.
    pub recursive: bool,
}

impl PackagePattern {
    /// Parses the first positional argument, resolving it against the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn parse(arg: Option<&str>) -> Result<Self, BasePathError> {
        let cwd = std::env::current_dir()?;
        Ok(Self::parse_in(arg, &cwd))
    }

    /// Parses `arg` relative to `cwd`.
    ///
    /// A trailing `/...` is stripped and marks the pattern recursive; a
    /// leading `./` is stripped. A missing argument means `.`.
    #[must_use]
    pub fn parse_in(arg: Option<&str>, cwd: &Path) -> Self {
        let raw = arg.unwrap_or(".");
        let (raw, recursive) = if raw == "..." {
            (".", true)
        } else if let Some(stripped) = raw.strip_suffix(RECURSIVE_SUFFIX) {
            (stripped, true)
        } else {
            (raw, false)
        };
        let raw = raw.strip_prefix("./").unwrap_or(raw);
        let raw = if raw.is_empty() { "." } else { raw };

        let path = Path::new(raw);
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };

        Self {
            base: clean_path(&absolute),
            recursive,
        }
    }
}

/// Lexically normalizes a path: drops `.` components and resolves `..`
/// against preceding normal components.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Computes `target` relative to `base`.
///
/// Both paths must be of the same kind (absolute or relative) and share the
/// same prefix; otherwise `None` is returned. Steps out of `base` produce `..`
/// components.
#[must_use]
pub fn relative_path(base: &Path, target: &Path) -> Option<PathBuf> {
    if base.is_absolute() != target.is_absolute() {
        return None;
    }

    let base = clean_path(base);
    let target = clean_path(target);
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (base_parts.first(), target_parts.first())
    {
        if a != b {
            return None;
        }
    }

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // A relative base that climbs above the shared part cannot be expressed.
    if base_parts[common..]
        .iter()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Replaces every backslash with a forward slash.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
