//! Source file enumeration.
//!
//! Walks the project directory and returns every file worth considering,
//! relative to the root. Excluded directories are pruned while descending, so
//! large trees like `node_modules` are never traversed.

use repoprompt_config::CorpusConfig;
use repoprompt_core::FileRef;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Enumerates the files of a project tree.
pub trait SourceEnumerator {
    /// All discoverable files under `root`, as root-relative references.
    ///
    /// Unreadable entries are skipped; enumeration never fails as a whole.
    fn enumerate(&self, root: &Path) -> Vec<FileRef>;
}

/// Directory walker with name-based directory and extension exclusions.
#[derive(Debug, Clone)]
pub struct WalkEnumerator {
    exclude_dirs: HashSet<String>,
    exclude_extensions: HashSet<String>,
}

impl WalkEnumerator {
    /// `exclude_extensions` entries are matched case-insensitively and may be
    /// given with or without the leading dot.
    pub fn new<D, E>(exclude_dirs: D, exclude_extensions: E) -> Self
    where
        D: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        Self {
            exclude_dirs: exclude_dirs.into_iter().collect(),
            exclude_extensions: exclude_extensions
                .into_iter()
                .map(|e| dotted_lowercase(&e))
                .collect(),
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(
            config.exclude_dirs.iter().cloned(),
            config.exclude_extensions.iter().cloned(),
        )
    }

    fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }

    fn is_excluded_file(&self, file: &FileRef) -> bool {
        file.extension()
            .is_some_and(|ext| self.exclude_extensions.contains(&ext))
    }
}

impl Default for WalkEnumerator {
    fn default() -> Self {
        Self::from_config(&CorpusConfig::default())
    }
}

impl SourceEnumerator for WalkEnumerator {
    fn enumerate(&self, root: &Path) -> Vec<FileRef> {
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            // Never prune the root itself, even if its name is excluded.
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !self.is_excluded_dir(&entry.file_name().to_string_lossy())
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            // Follows symlinks, so a link to a regular file counts as a file.
            if !entry.path().is_file() {
                continue;
            }

            let Some(file) = FileRef::from_path(root, entry.path()) else {
                debug!(file = %entry.path().display(), "Entry outside root, skipping");
                continue;
            };

            if self.is_excluded_file(&file) {
                continue;
            }
            files.push(file);
        }

        debug!(root = %root.display(), count = files.len(), "Enumerated source files");
        files
    }
}

fn dotted_lowercase(ext: &str) -> String {
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}
