//! Corpus index: all project files, split into in-chat, read-only and addable.

use crate::enumerator::SourceEnumerator;
use repoprompt_core::FileRef;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The caller's two named file sets.
///
/// Chat files are intended for editing, read-only files are reference only.
/// A file belongs to at most one set: duplicates are collapsed and a file
/// named in both stays a chat file. Order is preserved because it is the order
/// files are rendered in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSets {
    chat: Vec<FileRef>,
    read_only: Vec<FileRef>,
}

impl FileSets {
    pub fn new<C, R>(chat: C, read_only: R) -> Self
    where
        C: IntoIterator<Item = FileRef>,
        R: IntoIterator<Item = FileRef>,
    {
        let mut seen = BTreeSet::new();
        let chat: Vec<FileRef> = chat
            .into_iter()
            .filter(|f| seen.insert(f.clone()))
            .collect();

        let mut read_only_files = Vec::new();
        for file in read_only {
            if chat.contains(&file) {
                warn!(file = %file, "File is both in chat and read-only, keeping it as a chat file");
                continue;
            }
            if seen.insert(file.clone()) {
                read_only_files.push(file);
            }
        }

        Self {
            chat,
            read_only: read_only_files,
        }
    }

    pub fn chat(&self) -> &[FileRef] {
        &self.chat
    }

    pub fn read_only(&self) -> &[FileRef] {
        &self.read_only
    }

    /// Chat and read-only files together.
    pub fn known(&self) -> impl Iterator<Item = &FileRef> {
        self.chat.iter().chain(self.read_only.iter())
    }

    pub fn contains(&self, file: &FileRef) -> bool {
        self.chat.contains(file) || self.read_only.contains(file)
    }
}

/// Every project file known for one run, with the addable subset precomputed.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    root: PathBuf,
    files: FileSets,
    all: BTreeSet<FileRef>,
    addable: BTreeSet<FileRef>,
}

impl CorpusIndex {
    /// Enumerate `root` and derive the addable set.
    ///
    /// Chat and read-only files that exist on disk are included in the full
    /// set even when the enumerator's rules skipped them.
    pub fn build(root: &Path, enumerator: &dyn SourceEnumerator, files: FileSets) -> Self {
        let mut all: BTreeSet<FileRef> = enumerator.enumerate(root).into_iter().collect();

        for file in files.known() {
            if all.contains(file) {
                continue;
            }
            if file.resolve(root).is_file() {
                debug!(file = %file, "Adding explicitly named file missed by the enumerator");
                all.insert(file.clone());
            }
        }

        let addable: BTreeSet<FileRef> = all
            .iter()
            .filter(|f| !files.contains(f))
            .cloned()
            .collect();

        debug!(
            all = all.len(),
            addable = addable.len(),
            chat = files.chat().len(),
            read_only = files.read_only().len(),
            "Corpus index built"
        );

        Self {
            root: root.to_path_buf(),
            files,
            all,
            addable,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_sets(&self) -> &FileSets {
        &self.files
    }

    /// All known files, ascending by normalized path.
    pub fn all_files(&self) -> &BTreeSet<FileRef> {
        &self.all
    }

    /// All files minus chat and read-only files, ascending by normalized path.
    pub fn addable_files(&self) -> &BTreeSet<FileRef> {
        &self.addable
    }
}

/// `all_files(root) - chat_files - read_only_files`, sorted.
pub fn addable_files(
    root: &Path,
    enumerator: &dyn SourceEnumerator,
    chat_files: &[FileRef],
    read_only_files: &[FileRef],
) -> BTreeSet<FileRef> {
    let sets = FileSets::new(chat_files.iter().cloned(), read_only_files.iter().cloned());
    CorpusIndex::build(root, enumerator, sets).addable
}
