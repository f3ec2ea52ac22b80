//! Repository summarizers — produce the repo-map text.
//!
//! A summarizer turns the chat files and the mentioned files/identifiers into a
//! bounded synopsis of the repository. The empty string means "no summary".
//! Summarizers must be deterministic for identical requests within a run;
//! [`CachedSummarizer`] makes that hold even for collaborators that are not.

use crate::token;
use repoprompt_core::FileRef;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Inputs to one summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MapRequest {
    pub chat_files: Vec<FileRef>,
    pub mentioned_files: Vec<FileRef>,
    pub mentioned_idents: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("Failed to start summarizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Summarizer '{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Produces a textual synopsis of the repository.
pub trait RepoSummarizer {
    fn generate_map(&self, request: &MapRequest) -> Result<String, SummarizerError>;
}

/// Never summarizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSummary;

impl RepoSummarizer for NoSummary {
    fn generate_map(&self, _request: &MapRequest) -> Result<String, SummarizerError> {
        Ok(String::new())
    }
}

/// Built-in summary: a ranked listing of repository paths.
///
/// Chat files are left out. Mentioned files come first, then files whose stem
/// matches a mentioned identifier (case-insensitive), then everything else in
/// path order. Lines are added until the next one would exceed the budget.
#[derive(Debug, Clone)]
pub struct ListingSummarizer {
    files: BTreeSet<FileRef>,
    map_tokens: usize,
}

impl ListingSummarizer {
    pub fn new<I>(files: I, map_tokens: usize) -> Self
    where
        I: IntoIterator<Item = FileRef>,
    {
        Self {
            files: files.into_iter().collect(),
            map_tokens,
        }
    }

    fn rank(&self, request: &MapRequest) -> Vec<&FileRef> {
        let chat: BTreeSet<&FileRef> = request.chat_files.iter().collect();
        let mentioned: BTreeSet<&FileRef> = request.mentioned_files.iter().collect();
        let idents: BTreeSet<String> = request
            .mentioned_idents
            .iter()
            .map(|i| i.to_lowercase())
            .collect();

        let mut tiers: [Vec<&FileRef>; 3] = Default::default();
        for file in self.files.iter().filter(|f| !chat.contains(f)) {
            let tier = if mentioned.contains(file) {
                0
            } else if idents.contains(&file.stem().to_lowercase()) {
                1
            } else {
                2
            };
            tiers[tier].push(file);
        }

        tiers.into_iter().flatten().collect()
    }
}

impl RepoSummarizer for ListingSummarizer {
    fn generate_map(&self, request: &MapRequest) -> Result<String, SummarizerError> {
        let mut out = String::new();
        let mut used = 0;

        for file in self.rank(request) {
            let line = format!("{file}\n");
            let cost = token::estimate_tokens(&line);
            if used + cost > self.map_tokens {
                debug!(budget = self.map_tokens, used, "Repo listing truncated at budget");
                break;
            }
            used += cost;
            out.push_str(&line);
        }

        Ok(out)
    }
}

/// Runs an external program and uses its stdout as the summary.
///
/// Invocation:
/// `<program> <args...> --root <dir> --map-tokens <n> --tokenizer <name>
/// --chat-files <f>... --mentioned-files <f>... --mentioned-idents <i>...`
#[derive(Debug, Clone)]
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
    root: PathBuf,
    map_tokens: usize,
    tokenizer: String,
}

impl CommandSummarizer {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        root: &Path,
        map_tokens: usize,
        tokenizer: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            root: root.to_path_buf(),
            map_tokens,
            tokenizer: tokenizer.into(),
        }
    }

    fn command(&self, request: &MapRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--root")
            .arg(&self.root)
            .arg("--map-tokens")
            .arg(self.map_tokens.to_string())
            .arg("--tokenizer")
            .arg(&self.tokenizer)
            .arg("--chat-files")
            .args(request.chat_files.iter().map(FileRef::as_str))
            .arg("--mentioned-files")
            .args(request.mentioned_files.iter().map(FileRef::as_str))
            .arg("--mentioned-idents")
            .args(&request.mentioned_idents)
            .current_dir(&self.root);
        cmd
    }
}

impl RepoSummarizer for CommandSummarizer {
    fn generate_map(&self, request: &MapRequest) -> Result<String, SummarizerError> {
        debug!(program = %self.program, "Running external summarizer");
        let output = self
            .command(request)
            .output()
            .map_err(|e| SummarizerError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(SummarizerError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Memoizes another summarizer per request for the lifetime of one run.
///
/// Failures are not cached.
pub struct CachedSummarizer<S> {
    inner: S,
    cache: RefCell<HashMap<MapRequest, String>>,
}

impl<S: RepoSummarizer> CachedSummarizer<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<S: RepoSummarizer> RepoSummarizer for CachedSummarizer<S> {
    fn generate_map(&self, request: &MapRequest) -> Result<String, SummarizerError> {
        if let Some(hit) = self.cache.borrow().get(request) {
            return Ok(hit.clone());
        }
        let summary = self.inner.generate_map(request)?;
        self.cache
            .borrow_mut()
            .insert(request.clone(), summary.clone());
        Ok(summary)
    }
}

impl<S: RepoSummarizer + ?Sized> RepoSummarizer for Box<S> {
    fn generate_map(&self, request: &MapRequest) -> Result<String, SummarizerError> {
        (**self).generate_map(request)
    }
}
