//! One-shot prompt build: configuration in, assembled payload out.
//!
//! Wires the corpus index, templates, formatter, platform probe and the
//! configured summarizer into a [`ChunkAssembler`] for a single run.

use crate::assembler::{AssembledPrompt, AssemblyOptions, AssemblyRequest, ChunkAssembler};
use crate::formatter::ContentFormatter;
use crate::platform::PlatformInfo;
use crate::summarizer::{
    CachedSummarizer, CommandSummarizer, ListingSummarizer, NoSummary, RepoSummarizer,
};
use crate::templates::PromptTemplates;
use repoprompt_config::{AppConfig, SummarizerKind};
use repoprompt_core::{Error, Fence, FileRef, Result};
use repoprompt_corpus::{CorpusIndex, FileSets, WalkEnumerator};
use std::path::PathBuf;
use tracing::info;

/// Everything a single build needs.
#[derive(Debug, Clone, Default)]
pub struct BuildSettings {
    pub root: PathBuf,
    pub user_message: String,
    pub chat_files: Vec<FileRef>,
    pub read_only_files: Vec<FileRef>,
    pub extra_mentioned_files: Vec<FileRef>,
    pub extra_mentioned_idents: Vec<String>,
    pub config: AppConfig,
    /// Pre-rendered platform text; probed from the environment when `None`.
    pub platform: Option<String>,
}

/// Build the prompt payload for `settings`.
pub fn build_prompt(settings: &BuildSettings) -> Result<AssembledPrompt> {
    let root = &settings.root;
    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "project root '{}' is not a directory",
            root.display()
        )));
    }

    let config = &settings.config;
    let templates = PromptTemplates::load(config.assembly.templates_path.as_deref())?;

    let files = FileSets::new(
        settings.chat_files.iter().cloned(),
        settings.read_only_files.iter().cloned(),
    );
    let enumerator = WalkEnumerator::from_config(&config.corpus);
    let index = CorpusIndex::build(root, &enumerator, files);

    let summarizer = CachedSummarizer::new(make_summarizer(config, &index)?);

    let platform = match &settings.platform {
        Some(text) => text.clone(),
        None => PlatformInfo::detect(root).render(),
    };
    let options = AssemblyOptions {
        fence: Fence::new(
            config.assembly.fence_open.as_str(),
            config.assembly.fence_close.as_str(),
        ),
        suggest_shell_commands: config.assembly.suggest_shell_commands,
        language: config.assembly.language.clone(),
    };
    let assembler = ChunkAssembler::new(
        templates,
        ContentFormatter::from_config(&config.corpus),
        platform,
        options,
    );

    let prompt = assembler.assemble(
        &index,
        &summarizer,
        &AssemblyRequest {
            user_message: &settings.user_message,
            extra_mentioned_files: &settings.extra_mentioned_files,
            extra_mentioned_idents: &settings.extra_mentioned_idents,
        },
    );

    info!(
        messages = prompt.messages.len(),
        summary_tokens = prompt.report.summary_tokens,
        "Prompt built"
    );
    Ok(prompt)
}

/// The summarizer selected by `config.summarizer.kind`.
pub fn make_summarizer(config: &AppConfig, index: &CorpusIndex) -> Result<Box<dyn RepoSummarizer>> {
    let map_tokens = config.assembly.map_tokens;
    let summarizer: Box<dyn RepoSummarizer> = match config.summarizer.kind {
        SummarizerKind::None => Box::new(NoSummary),
        SummarizerKind::Listing => Box::new(ListingSummarizer::new(
            index.all_files().iter().cloned(),
            map_tokens,
        )),
        SummarizerKind::Command => {
            let program = config.summarizer.command.clone().ok_or_else(|| Error::Config {
                message: "summarizer.command is required when summarizer.kind = \"command\""
                    .into(),
            })?;
            Box::new(CommandSummarizer::new(
                program,
                config.summarizer.args.clone(),
                index.root(),
                map_tokens,
                config.assembly.tokenizer.as_str(),
            ))
        }
    };
    Ok(summarizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repoprompt_core::Role;
    use std::fs;

    fn settings(root: &std::path::Path, message: &str) -> BuildSettings {
        BuildSettings {
            root: root.to_path_buf(),
            user_message: message.into(),
            platform: Some("- Platform: test\n".into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_root_is_invalid_input() {
        let tmp = tempfile::tempdir().unwrap();
        let err = build_prompt(&settings(&tmp.path().join("nope"), "hi")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn listing_summary_included_for_unmentioned_repo() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("main.py"), "print(1)\n").unwrap();
        fs::write(tmp.path().join("util.py"), "x = 2\n").unwrap();

        let mut s = settings(tmp.path(), "Update main.py");
        s.chat_files = vec![FileRef::new("main.py")];
        let prompt = build_prompt(&s).unwrap();

        let repo_map = prompt
            .messages
            .iter()
            .find(|m| m.content().starts_with("Here are summaries of some other files"))
            .expect("repo map pair");
        assert!(repo_map.content().ends_with("util.py\n"));
        assert!(!repo_map.content().contains("main.py"));
        assert!(prompt.report.summary_tokens > 0);
    }

    #[test]
    fn no_summarizer_kind_skips_repo_map() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.py"), "a\n").unwrap();

        let mut s = settings(tmp.path(), "hi");
        s.config.summarizer.kind = SummarizerKind::None;
        let prompt = build_prompt(&s).unwrap();

        assert!(
            prompt
                .messages
                .iter()
                .all(|m| !m.content().starts_with("Here are summaries"))
        );
        assert_eq!(prompt.report.summary_tokens, 0);
        assert_eq!(prompt.messages[0].role(), Role::System);
        assert!(prompt.messages[0].content().contains("- Platform: test\n"));
    }

    #[test]
    fn command_kind_without_command_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = settings(tmp.path(), "hi");
        s.config.summarizer.kind = SummarizerKind::Command;
        let err = build_prompt(&s).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn template_override_file_is_applied() {
        let tmp = tempfile::tempdir().unwrap();
        let templates = tmp.path().join("templates.toml");
        fs::write(
            &templates,
            "files_no_full_files = \"Nothing yet.\"\nexample_messages = []\n",
        )
        .unwrap();

        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();

        let mut s = settings(&project, "hi");
        s.config.summarizer.kind = SummarizerKind::None;
        s.config.assembly.templates_path = Some(templates);
        let prompt = build_prompt(&s).unwrap();

        assert_eq!(prompt.messages[1].content(), "Nothing yet.");
    }

    #[test]
    fn configured_fence_reaches_file_blocks() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.rs"), "fn a() {}\n").unwrap();

        let mut s = settings(tmp.path(), "go");
        s.chat_files = vec![FileRef::new("a.rs")];
        s.config.assembly.fence_open = "<code>".into();
        s.config.assembly.fence_close = "</code>".into();
        let prompt = build_prompt(&s).unwrap();

        assert!(
            prompt
                .messages
                .iter()
                .any(|m| m.content().ends_with("a.rs\n<code>\nfn a() {}\n</code>\n"))
        );
    }
}
