//! Chunk assembler — composes the final message list.
//!
//! Builds the payload in a fixed order that is never permuted:
//!
//! 1. **System** — one system message: instructions, platform, reminder
//! 2. **Examples** — few-shot pairs, then a context-reset pair if any exist
//! 3. **Context** — repo map pair → read-only files pair → chat files pair
//! 4. **Current** — the verbatim user request, then the optional reminder
//!
//! Every optional context body contributes exactly one user/assistant pair in
//! which the assistant acknowledges how it will treat the content. The chat
//! files pair is always present; which template it uses is decided by
//! [`ChatFilesContext`].
//!
//! # Determinism
//!
//! The repository summary is computed once per run and reused for both the
//! inclusion decision and the message body.

use crate::chunks::{ChatChunks, ChunkStats};
use crate::formatter::ContentFormatter;
use crate::summarizer::{MapRequest, RepoSummarizer};
use crate::templates::{PromptTemplates, TemplateVars};
use crate::token;
use repoprompt_core::{Fence, FileRef, Message, Result};
use repoprompt_corpus::{CorpusIndex, MentionSet};
use serde::Serialize;
use tracing::{debug, warn};

const QUAD_BACKTICK_REMINDER: &str =
    "\nIMPORTANT: Use *quadruple* backticks ```` as fences, not triple backticks!\n";

// ── Types ─────────────────────────────────────────────────────────────────

/// Per-run presentation choices.
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    /// Used for every fenced block in the payload.
    pub fence: Fence,
    /// Selects the shell-command prompt/reminder variants.
    pub suggest_shell_commands: bool,
    /// Substituted into `{language}`.
    pub language: String,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            fence: Fence::default(),
            suggest_shell_commands: true,
            language: "the same language they are using".into(),
        }
    }
}

/// The user's turn plus explicit mention overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyRequest<'a> {
    pub user_message: &'a str,
    /// Merged with, not replacing, the files extracted from the message.
    pub extra_mentioned_files: &'a [FileRef],
    /// Merged with, not replacing, the identifiers extracted from the message.
    pub extra_mentioned_idents: &'a [String],
}

/// The assembled payload, ready to serialize.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub messages: Vec<Message>,
    pub report: AssemblyReport,
}

impl AssembledPrompt {
    /// Pretty-printed JSON array of `{role, content}` objects.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.messages)?)
    }
}

/// What went into a payload.
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub mentioned_files: Vec<FileRef>,
    pub mentioned_idents: Vec<String>,
    pub summary_tokens: usize,
    pub chunks: Vec<ChunkStats>,
}

/// Which chat-files pair to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFilesContext<'a> {
    /// Chat files rendered to non-empty content.
    Full(&'a str),
    /// No chat file content, but a repo map was included.
    RepoMapOnly,
    /// Neither chat file content nor a repo map.
    NoFiles,
}

impl<'a> ChatFilesContext<'a> {
    pub fn classify(chat_content: &'a str, summary: &str) -> Self {
        match (chat_content.is_empty(), summary.is_empty()) {
            (false, _) => Self::Full(chat_content),
            (true, false) => Self::RepoMapOnly,
            (true, true) => Self::NoFiles,
        }
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Holds no per-run state, so one instance can serve many requests.
pub struct ChunkAssembler {
    templates: PromptTemplates,
    formatter: ContentFormatter,
    platform: String,
    options: AssemblyOptions,
}

impl ChunkAssembler {
    /// `platform` is the rendered environment description
    /// (see [`crate::platform::PlatformInfo::render`]).
    pub fn new(
        templates: PromptTemplates,
        formatter: ContentFormatter,
        platform: impl Into<String>,
        options: AssemblyOptions,
    ) -> Self {
        Self {
            templates,
            formatter,
            platform: platform.into(),
            options,
        }
    }

    pub fn templates(&self) -> &PromptTemplates {
        &self.templates
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Assemble the payload for one request.
    ///
    /// # Algorithm
    ///
    /// 1. Render the system message and the examples with the active fence
    /// 2. Extract mentions, merge explicit overrides, compute the summary once
    /// 3. Format read-only and chat files, build the context pairs
    /// 4. Append the user request and the optional reminder
    pub fn assemble(
        &self,
        index: &CorpusIndex,
        summarizer: &dyn RepoSummarizer,
        request: &AssemblyRequest<'_>,
    ) -> AssembledPrompt {
        let vars = self.system_vars();
        let files = index.file_sets();
        let fence = &self.options.fence;

        let mut chunks = ChatChunks {
            system: vec![self.system_message(&vars)],
            examples: self.templates.render_examples(&vars),
            reset: Message::exchange(
                self.templates.context_reset_prompt.as_str(),
                self.templates.context_reset_reply.as_str(),
            )
            .to_vec(),
            ..Default::default()
        };

        // ── Mentions and repository summary ────────────────────────────────
        let mentions = MentionSet::extract(request.user_message, index).with_extra(
            request.extra_mentioned_files.iter().cloned(),
            request.extra_mentioned_idents.iter().cloned(),
        );
        debug!(
            files = ?mentions.files,
            idents = ?mentions.identifiers,
            "Mentions extracted"
        );

        let map_request = MapRequest {
            chat_files: files.chat().to_vec(),
            mentioned_files: mentions.files.iter().cloned().collect(),
            mentioned_idents: mentions.identifiers.iter().cloned().collect(),
        };
        let summary = match summarizer.generate_map(&map_request) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Repository summary unavailable, continuing without it");
                String::new()
            }
        };

        // ── File contents ──────────────────────────────────────────────────
        let read_only_content = self
            .formatter
            .format_files(files.read_only(), index.root(), fence);
        let chat_content = self.formatter.format_files(files.chat(), index.root(), fence);

        chunks.context = self.context_messages(
            &summary,
            &read_only_content,
            &chat_content,
            !files.chat().is_empty(),
        );
        chunks.current = self.current_messages(request.user_message, &vars);

        let report = AssemblyReport {
            mentioned_files: map_request.mentioned_files,
            mentioned_idents: map_request.mentioned_idents,
            summary_tokens: token::estimate_tokens(&summary),
            chunks: chunks.stats(),
        };
        debug!(report = ?report, "Prompt assembled");

        AssembledPrompt {
            messages: chunks.all_messages(),
            report,
        }
    }

    /// Substitutions shared by the system message and the reminder.
    pub fn system_vars(&self) -> TemplateVars {
        let base = TemplateVars::new()
            .with_fence(&self.options.fence)
            .set("platform", self.platform.as_str())
            .set("language", self.options.language.as_str())
            .set("lazy_prompt", self.templates.lazy_prompt.as_str());

        let (shell_prompt, shell_reminder) = if self.options.suggest_shell_commands {
            (
                &self.templates.shell_cmd_prompt,
                &self.templates.shell_cmd_reminder,
            )
        } else {
            (
                &self.templates.no_shell_cmd_prompt,
                &self.templates.no_shell_cmd_reminder,
            )
        };

        let quad_backtick_reminder = if self.options.fence.is_quad_backtick() {
            QUAD_BACKTICK_REMINDER
        } else {
            ""
        };

        let shell_cmd_prompt = base.render(shell_prompt);
        let shell_cmd_reminder = base.render(shell_reminder);
        base.set("shell_cmd_prompt", shell_cmd_prompt)
            .set("shell_cmd_reminder", shell_cmd_reminder)
            .set("quad_backtick_reminder", quad_backtick_reminder)
    }

    fn system_message(&self, vars: &TemplateVars) -> Message {
        let mut content = vars.render(&self.templates.main_system);
        if let Some(reminder) = self.templates.system_reminder() {
            content.push('\n');
            content.push_str(&vars.render(reminder));
        }
        Message::system(content)
    }

    /// Repo map pair → read-only pair → chat files pair.
    fn context_messages(
        &self,
        summary: &str,
        read_only_content: &str,
        chat_content: &str,
        has_chat_files: bool,
    ) -> Vec<Message> {
        let t = &self.templates;
        let mut context = Vec::new();

        if !summary.is_empty() {
            let other = if has_chat_files { "other " } else { "" };
            let prefix = TemplateVars::new()
                .set("other", other)
                .render(&t.repo_content_prefix);
            context.extend(Message::exchange(
                format!("{prefix}{summary}"),
                t.repo_content_reply.as_str(),
            ));
        }

        if !read_only_content.is_empty() {
            context.extend(Message::exchange(
                format!("{}{read_only_content}", t.read_only_files_prefix),
                t.read_only_files_reply.as_str(),
            ));
        }

        let chat_pair = match ChatFilesContext::classify(chat_content, summary) {
            ChatFilesContext::Full(content) => Message::exchange(
                format!("{}{content}", t.files_content_prefix),
                t.files_content_reply.as_str(),
            ),
            ChatFilesContext::RepoMapOnly if !t.files_no_full_files_with_repo_map.is_empty() => {
                Message::exchange(
                    t.files_no_full_files_with_repo_map.as_str(),
                    t.files_no_full_files_with_repo_map_reply.as_str(),
                )
            }
            ChatFilesContext::RepoMapOnly | ChatFilesContext::NoFiles => Message::exchange(
                t.files_no_full_files.as_str(),
                t.files_no_full_files_reply.as_str(),
            ),
        };
        context.extend(chat_pair);

        context
    }

    fn current_messages(&self, user_message: &str, vars: &TemplateVars) -> Vec<Message> {
        let mut current = vec![Message::user(user_message)];
        if let Some(reminder) = self.templates.system_reminder() {
            current.push(Message::system(vars.render(reminder)));
        }
        current
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
