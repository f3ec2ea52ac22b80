//! Mention extraction — which project files and identifiers a message names.
//!
//! Purely textual: no parsing of source code.
//!
//! # File mentions
//!
//! A word of the message names an addable file when it equals the file's
//! normalized relative path, or when it equals a basename that looks like a
//! filename and maps to exactly one addable file. Addable files sharing a
//! basename with a chat or read-only file are never suggested. Ambiguous
//! basenames are silently dropped rather than guessed.
//!
//! # Identifier mentions
//!
//! Runs of word characters (alphanumerics and `_`) of at least three
//! characters that are not entirely digits.

use crate::index::CorpusIndex;
use repoprompt_core::FileRef;
use repoprompt_core::path::normalize_separators;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const TRAILING_PUNCTUATION: &[char] = &[',', '.', '!', ';', ':', '?'];
const QUOTES: &[char] = &['"', '\'', '`'];
const FILENAME_MARKERS: &[char] = &['/', '\\', '.', '_', '-'];
const MIN_IDENT_LEN: usize = 3;

/// Files and identifiers inferred from one message. Recomputed per message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionSet {
    pub files: BTreeSet<FileRef>,
    pub identifiers: BTreeSet<String>,
}

impl MentionSet {
    /// Extract both mention kinds from `text`.
    pub fn extract(text: &str, index: &CorpusIndex) -> Self {
        Self {
            files: extract_file_mentions(text, index),
            identifiers: extract_identifier_mentions(text),
        }
    }

    /// Merge explicitly requested mentions into the extracted ones.
    pub fn with_extra<F, I>(mut self, files: F, identifiers: I) -> Self
    where
        F: IntoIterator<Item = FileRef>,
        I: IntoIterator<Item = String>,
    {
        self.files.extend(files);
        self.identifiers
            .extend(identifiers.into_iter().filter(|i| !i.is_empty()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.identifiers.is_empty()
    }
}

/// Addable files the message plausibly refers to.
pub fn extract_file_mentions(text: &str, index: &CorpusIndex) -> BTreeSet<FileRef> {
    let words = candidate_words(text);
    let mut mentioned = BTreeSet::new();
    if words.is_empty() {
        return mentioned;
    }

    let normalized_words: HashSet<String> =
        words.iter().map(|w| normalize_separators(w)).collect();

    let known_basenames: HashSet<&str> = index
        .file_sets()
        .known()
        .map(|f| f.basename())
        .collect();

    let mut by_basename: BTreeMap<&str, Vec<&FileRef>> = BTreeMap::new();
    for file in index.addable_files() {
        let basename = file.basename();
        if known_basenames.contains(basename) {
            continue;
        }

        if normalized_words.contains(file.as_str()) {
            mentioned.insert(file.clone());
        }

        if looks_like_filename(basename) {
            by_basename.entry(basename).or_default().push(file);
        }
    }

    for (basename, files) in by_basename {
        if let [only] = files.as_slice()
            && words.contains(basename)
        {
            mentioned.insert((*only).clone());
        }
    }

    mentioned
}

/// Identifier-like tokens of the message, case preserved.
pub fn extract_identifier_mentions(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !is_word_char(c))
        .filter(|w| w.chars().count() >= MIN_IDENT_LEN)
        .filter(|w| !w.chars().all(char::is_numeric))
        .map(String::from)
        .collect()
}

/// Whitespace-separated words with trailing punctuation and surrounding
/// quotes removed. Words emptied by stripping are dropped.
fn candidate_words(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_end_matches(TRAILING_PUNCTUATION).trim_matches(QUOTES))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn looks_like_filename(name: &str) -> bool {
    name.contains(FILENAME_MARKERS)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::WalkEnumerator;
    use crate::index::FileSets;
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn index_for(root: &Path, chat: &[&str], ro: &[&str]) -> CorpusIndex {
        let sets = FileSets::new(
            chat.iter().map(|p| FileRef::new(p)),
            ro.iter().map(|p| FileRef::new(p)),
        );
        CorpusIndex::build(root, &WalkEnumerator::default(), sets)
    }

    fn names(files: &BTreeSet<FileRef>) -> Vec<&str> {
        files.iter().map(|f| f.as_str()).collect()
    }

    fn idents(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ambiguous_basename_is_not_resolved() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/app.py");
        touch(tmp.path(), "src/util/app.py");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions("please check app.py", &index);
        assert!(files.is_empty());
    }

    #[test]
    fn full_path_wins_over_ambiguity() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/app.py");
        touch(tmp.path(), "src/util/app.py");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions("please check app.py and src/app.py", &index);
        assert_eq!(names(&files), vec!["src/app.py"]);
    }

    #[test]
    fn unique_basename_resolves() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "README.md");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions("look at README.md and FOO123", &index);
        assert_eq!(names(&files), vec!["README.md"]);
    }

    #[test]
    fn backslash_paths_match() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/util/app.py");
        touch(tmp.path(), "lib/app.py");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions("edit src\\util\\app.py please", &index);
        assert_eq!(names(&files), vec!["src/util/app.py"]);
    }

    #[test]
    fn punctuation_and_quotes_stripped() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "config.toml");
        touch(tmp.path(), "src/main_loop.rs");
        touch(tmp.path(), "docs/guide.md");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions(
            "Did you read `config.toml`? Also \"main_loop.rs\", and 'docs/guide.md'!",
            &index,
        );
        assert_eq!(
            names(&files),
            vec!["config.toml", "docs/guide.md", "src/main_loop.rs"]
        );
    }

    #[test]
    fn basename_without_filename_marker_needs_full_path() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "scripts/Makefile");
        let index = index_for(tmp.path(), &[], &[]);

        assert!(extract_file_mentions("run the Makefile", &index).is_empty());
        let files = extract_file_mentions("run scripts/Makefile", &index);
        assert_eq!(names(&files), vec!["scripts/Makefile"]);
    }

    #[test]
    fn same_basename_as_chat_file_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/app.py");
        touch(tmp.path(), "tests/app.py");
        let index = index_for(tmp.path(), &["src/app.py"], &[]);

        assert!(extract_file_mentions("compare with app.py", &index).is_empty());
        assert!(extract_file_mentions("compare with tests/app.py", &index).is_empty());
    }

    #[test]
    fn chat_and_read_only_files_are_never_mentions() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a_mod.rs");
        touch(tmp.path(), "b_mod.rs");
        let index = index_for(tmp.path(), &["a_mod.rs"], &["b_mod.rs"]);

        assert!(extract_file_mentions("a_mod.rs b_mod.rs", &index).is_empty());
    }

    #[test]
    fn full_path_and_basename_match_counted_once() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "notes.txt");
        let index = index_for(tmp.path(), &[], &[]);

        let files = extract_file_mentions("notes.txt", &index);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.rs");
        let index = index_for(tmp.path(), &[], &[]);

        let mentions = MentionSet::extract("", &index);
        assert!(mentions.is_empty());
        let mentions = MentionSet::extract("  \"\" ... `", &index);
        assert!(mentions.files.is_empty());
    }

    #[test]
    fn identifiers_split_on_non_word_chars() {
        let found = extract_identifier_mentions("look at README.md and FOO123");
        assert_eq!(found, idents(&["FOO123", "README", "and", "look"]));
    }

    #[test]
    fn identifiers_drop_short_and_numeric_tokens() {
        let found = extract_identifier_mentions("fix bug 1234 in parse_args() at x.y v2");
        assert_eq!(found, idents(&["bug", "fix", "parse_args"]));
    }

    #[test]
    fn identifiers_keep_case_and_unicode() {
        let found = extract_identifier_mentions("Über über HttpClient httpclient");
        assert_eq!(found, idents(&["HttpClient", "httpclient", "Über", "über"]));
    }

    #[test]
    fn extra_mentions_are_merged() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "README.md");
        let index = index_for(tmp.path(), &[], &[]);

        let mentions = MentionSet::extract("see README.md", &index).with_extra(
            vec![FileRef::new("docs/extra.md"), FileRef::new("README.md")],
            vec!["Renderer".to_string(), String::new()],
        );
        assert_eq!(names(&mentions.files), vec!["README.md", "docs/extra.md"]);
        assert!(mentions.identifiers.contains("Renderer"));
        assert!(mentions.identifiers.contains("README"));
        assert!(!mentions.identifiers.contains(""));
    }
}
