//! Content formatter — renders files as labeled, fenced blocks.
//!
//! Each block is the relative path on its own line, the open fence, the file
//! text (newline-terminated) and the close fence.
//!
//! Image files get a placeholder instead of their bytes. A file that cannot be
//! read gets an error placeholder and a warning; the rest of the batch is
//! still rendered.

use repoprompt_config::CorpusConfig;
use repoprompt_core::{Fence, FileRef};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

pub const IMAGE_PLACEHOLDER: &str = "[Image file content not shown]";
pub const READ_ERROR_PLACEHOLDER: &str = "[Error reading file content]";

#[derive(Debug, Clone)]
pub struct ContentFormatter {
    image_extensions: HashSet<String>,
}

impl ContentFormatter {
    pub fn new<I>(image_extensions: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            image_extensions: image_extensions
                .into_iter()
                .map(|e| {
                    let e = e.to_lowercase();
                    if e.starts_with('.') { e } else { format!(".{e}") }
                })
                .collect(),
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        Self::new(config.image_extensions.iter().cloned())
    }

    pub fn is_image(&self, file: &FileRef) -> bool {
        file.extension()
            .is_some_and(|ext| self.image_extensions.contains(&ext))
    }

    /// Render `files` in the given order.
    ///
    /// Returns the empty string for an empty list; otherwise the blocks joined
    /// by newlines with exactly one trailing newline.
    pub fn format_files(&self, files: &[FileRef], root: &Path, fence: &Fence) -> String {
        if files.is_empty() {
            return String::new();
        }

        let blocks: Vec<String> = files
            .iter()
            .map(|file| self.format_file(file, root, fence))
            .collect();

        let mut out = blocks.join("\n");
        out.push('\n');
        out
    }

    fn format_file(&self, file: &FileRef, root: &Path, fence: &Fence) -> String {
        let body = if self.is_image(file) {
            format!("{IMAGE_PLACEHOLDER}\n")
        } else {
            let path = file.resolve(root);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let mut text = String::from_utf8_lossy(&bytes).into_owned();
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text
                }
                Err(e) => {
                    warn!(file = %file, error = %e, "Could not read file, using placeholder");
                    format!("{READ_ERROR_PLACEHOLDER}\n")
                }
            }
        };

        format!("{file}\n{}\n{body}{}", fence.open(), fence.close())
    }
}

impl Default for ContentFormatter {
    fn default() -> Self {
        Self::from_config(&CorpusConfig::default())
    }
}
