//! Project-relative file references.
//!
//! Every path the tool reasons about is stored relative to the project root
//! with `/` separators, so `src\app.py` and `src/app.py` compare equal and hash
//! to the same set slot.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file path relative to the project root, with normalized separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FileRef(String);

impl FileRef {
    /// Build a reference from a user- or filesystem-supplied relative path.
    ///
    /// Backslashes become forward slashes and any leading `./` is dropped.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize_separators(path.as_ref()))
    }

    /// Build a reference for `path` relative to `root`.
    ///
    /// Returns `None` when `path` does not live under `root`.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        let rel = rel.to_string_lossy();
        if rel.is_empty() {
            return None;
        }
        Some(Self::new(rel))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final path component (`src/util/app.py` → `app.py`).
    pub fn basename(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// The basename without its final extension (`app.test.py` → `app.test`).
    pub fn stem(&self) -> &str {
        let base = self.basename();
        match base.rfind('.') {
            Some(idx) if idx > 0 => &base[..idx],
            _ => base,
        }
    }

    /// Lowercased extension including the leading dot, if any.
    pub fn extension(&self) -> Option<String> {
        let base = self.basename();
        match base.rfind('.') {
            Some(idx) if idx > 0 => Some(base[idx..].to_lowercase()),
            _ => None,
        }
    }

    /// Absolute location of this file under `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

/// Replace `\` with `/` and drop leading `./` segments.
pub fn normalize_separators(path: &str) -> String {
    let mut s = path.replace('\\', "/");
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    s
}

impl std::fmt::Display for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FileRef {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for FileRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<FileRef> for String {
    fn from(f: FileRef) -> Self {
        f.0
    }
}

impl AsRef<str> for FileRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
