//! Context types for rule execution.

use std::path::{Path, PathBuf};

use crate::filter::AdmissibleFiles;
use crate::typeinfo::TypeInfo;
use crate::utils::suppression::CommentIndex;

/// Context provided to per-file rules.
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// Path relative to the base directory, `/`-separated.
    pub relative_path: PathBuf,
    /// The file's comments, indexed by line.
    pub comments: CommentIndex,
    /// Type oracle for the file's package.
    pub types: &'a dyn TypeInfo,
    /// Files of the run that passed the ignore configuration.
    pub admissible: &'a AdmissibleFiles,
}

impl FileContext<'_> {
    /// True if this file takes part in analysis.
    #[must_use]
    pub fn is_admissible(&self) -> bool {
        self.admissible.contains(self.path)
    }
}

impl std::fmt::Debug for FileContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContext")
            .field("path", &self.path)
            .field("relative_path", &self.relative_path)
            .finish_non_exhaustive()
    }
}
