//! File admissibility.
//!
//! Every file of the package is normalized to a `/`-separated path relative to
//! the base directory and handed to the ignore predicate. Files it matches are
//! dropped from analysis.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::IgnoreConfig;
use crate::utils::paths::{normalize_separators, relative_path};

/// Normalizes file paths and applies the ignore configuration.
///
/// Normalization is memoized per absolute path for the lifetime of the filter,
/// which is one run.
#[derive(Debug)]
pub struct FileFilter<'a> {
    base: &'a Path,
    ignore: &'a IgnoreConfig,
    cache: HashMap<PathBuf, String>,
}

impl<'a> FileFilter<'a> {
    /// Creates a filter for files under `base`.
    #[must_use]
    pub fn new(base: &'a Path, ignore: &'a IgnoreConfig) -> Self {
        Self {
            base,
            ignore,
            cache: HashMap::new(),
        }
    }

    /// Path of `file` relative to the base, with forward slashes.
    ///
    /// Falls back to the path as given when no relative path exists.
    pub fn normalize(&mut self, file: &Path) -> String {
        if let Some(cached) = self.cache.get(file) {
            return cached.clone();
        }
        let rel = relative_path(self.base, file).unwrap_or_else(|| file.to_path_buf());
        let normalized = normalize_separators(&rel.to_string_lossy());
        self.cache.insert(file.to_path_buf(), normalized.clone());
        normalized
    }

    /// True if `file` passes the ignore configuration.
    pub fn is_admissible(&mut self, file: &Path) -> bool {
        let rel = self.normalize(file);
        if self.ignore.should_ignore(&rel) {
            debug!("Skipping file: {rel}");
            false
        } else {
            debug!("File: {rel}");
            true
        }
    }

    /// The subset of `files` that is not ignored.
    pub fn admissible<'f, I>(&mut self, files: I) -> AdmissibleFiles
    where
        I: IntoIterator<Item = &'f Path>,
    {
        let set = files
            .into_iter()
            .filter(|file| self.is_admissible(file))
            .map(Path::to_path_buf)
            .collect();
        AdmissibleFiles(set)
    }

    /// Number of memoized paths.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Absolute paths of the files that take part in analysis.
#[derive(Debug, Clone, Default)]
pub struct AdmissibleFiles(HashSet<PathBuf>);

impl AdmissibleFiles {
    /// True if `file` is admissible.
    #[must_use]
    pub fn contains(&self, file: &Path) -> bool {
        self.0.contains(file)
    }

    /// Number of admissible files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no file is admissible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathBuf> for AdmissibleFiles {
    fn from_iter<T: IntoIterator<Item = PathBuf>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_relative_to_base() {
        let ignore = IgnoreConfig::default();
        let mut filter = FileFilter::new(Path::new("/repo"), &ignore);
        assert_eq!(filter.normalize(Path::new("/repo/pkg/a.go")), "pkg/a.go");
        assert_eq!(filter.normalize(Path::new("/other/b.go")), "../other/b.go");
    }

    #[test]
    fn falls_back_to_raw_name() {
        let ignore = IgnoreConfig::default();
        let mut filter = FileFilter::new(Path::new("/repo"), &ignore);
        assert_eq!(filter.normalize(Path::new("gen/a.go")), "gen/a.go");
    }

    #[test]
    fn memoizes_normalization() {
        let ignore = IgnoreConfig::default();
        let mut filter = FileFilter::new(Path::new("/repo"), &ignore);
        filter.normalize(Path::new("/repo/a.go"));
        filter.normalize(Path::new("/repo/a.go"));
        filter.normalize(Path::new("/repo/b.go"));
        assert_eq!(filter.cached(), 2);
    }

    #[test]
    fn drops_ignored_files() {
        let ignore = IgnoreConfig::new(["*_mock.go", "vendor/**"]).expect("valid");
        let mut filter = FileFilter::new(Path::new("/repo"), &ignore);
        let files = [
            PathBuf::from("/repo/service.go"),
            PathBuf::from("/repo/service_mock.go"),
            PathBuf::from("/repo/vendor/lib/x.go"),
        ];
        let admissible = filter.admissible(files.iter().map(PathBuf::as_path));

        assert_eq!(admissible.len(), 1);
        assert!(admissible.contains(Path::new("/repo/service.go")));
        assert!(!admissible.contains(Path::new("/repo/service_mock.go")));
    }
}
