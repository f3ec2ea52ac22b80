//! Merge configuration with flags, build the prompt, write it out.

use crate::Cli;
use repoprompt_assembler::{AssembledPrompt, BuildSettings, build_prompt};
use repoprompt_config::{AppConfig, ConfigError, SummarizerKind};
use repoprompt_core::FileRef;
use std::path::Path;
use tracing::{debug, error};

pub fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_required(path)?,
        None => AppConfig::load()?,
    };
    apply_flags(&mut config, cli)?;

    let settings = BuildSettings {
        root: cli.dir.clone(),
        user_message: cli.user_message.clone(),
        chat_files: to_refs(&cli.chat_files),
        read_only_files: to_refs(&cli.read_only_files),
        extra_mentioned_files: to_refs(&cli.extra_mentioned_files),
        extra_mentioned_idents: cli.extra_mentioned_idents.clone(),
        config,
        platform: None,
    };

    let prompt = build_prompt(&settings)?;
    debug!(report = %serde_json::to_string(&prompt.report)?, "Assembly report");

    emit(&prompt, cli.output.as_deref())?;
    Ok(())
}

/// Command-line flags override the config file and environment.
fn apply_flags(config: &mut AppConfig, cli: &Cli) -> Result<(), ConfigError> {
    let assembly = &mut config.assembly;
    if let Some(tokens) = cli.map_tokens {
        assembly.map_tokens = tokens;
    }
    if let Some(tokenizer) = &cli.tokenizer {
        assembly.tokenizer = tokenizer.clone();
    }
    if let Some(open) = &cli.fence_open {
        assembly.fence_open = open.clone();
    }
    if let Some(close) = &cli.fence_close {
        assembly.fence_close = close.clone();
    }
    if cli.no_shell {
        assembly.suggest_shell_commands = false;
    }
    if let Some(templates) = &cli.templates {
        assembly.templates_path = Some(templates.clone());
    }

    if let Some(kind) = &cli.summarizer {
        config.summarizer.kind = kind.parse()?;
    }
    if let Some(script) = &cli.map_script {
        config.summarizer.kind = SummarizerKind::Command;
        config.summarizer.command = Some(script.clone());
    }

    config.validate()
}

fn to_refs(paths: &[String]) -> Vec<FileRef> {
    paths.iter().map(FileRef::new).collect()
}

/// Print the JSON, or write it to `output`.
///
/// A failed write is reported but not fatal: the JSON goes to stdout instead.
fn emit(prompt: &AssembledPrompt, output: Option<&Path>) -> repoprompt_core::Result<()> {
    let json = prompt.to_json_pretty()?;

    let Some(path) = output else {
        println!("{json}");
        return Ok(());
    };

    match std::fs::write(path, format!("{json}\n")) {
        Ok(()) => println!("Prompt written to {}", path.display()),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to write output file");
            println!("{json}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["repoprompt", "--dir", ".", "--user-message", "hi"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn multi_value_file_flags() {
        let cli = parse(&["--chat-files", "a.rs", "src/b.rs", "--read-only-files", "docs/c.md"]);
        assert_eq!(cli.chat_files, vec!["a.rs", "src/b.rs"]);
        assert_eq!(cli.read_only_files, vec!["docs/c.md"]);
        assert!(cli.extra_mentioned_idents.is_empty());
    }

    #[test]
    fn list_flags_accept_no_values() {
        let cli = parse(&[
            "--chat-files",
            "--read-only-files",
            "--extra-mentioned-files",
            "--extra-mentioned-idents",
        ]);
        assert!(cli.chat_files.is_empty());
        assert!(cli.read_only_files.is_empty());
        assert!(cli.extra_mentioned_files.is_empty());
        assert!(cli.extra_mentioned_idents.is_empty());

        let cli = parse(&["--chat-files", "--read-only-files", "docs/c.md"]);
        assert!(cli.chat_files.is_empty());
        assert_eq!(cli.read_only_files, vec!["docs/c.md"]);
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "--map-tokens",
            "256",
            "--tokenizer",
            "o200k_base",
            "--fence-open",
            "<code>",
            "--fence-close",
            "</code>",
            "--no-shell",
        ]);
        let mut config = AppConfig::default();
        apply_flags(&mut config, &cli).unwrap();

        assert_eq!(config.assembly.map_tokens, 256);
        assert_eq!(config.assembly.tokenizer, "o200k_base");
        assert_eq!(config.assembly.fence_open, "<code>");
        assert_eq!(config.assembly.fence_close, "</code>");
        assert!(!config.assembly.suggest_shell_commands);
    }

    #[test]
    fn map_script_selects_command_summarizer() {
        let cli = parse(&["--summarizer", "none", "--map-script", "./map.sh"]);
        let mut config = AppConfig::default();
        apply_flags(&mut config, &cli).unwrap();

        assert_eq!(config.summarizer.kind, SummarizerKind::Command);
        assert_eq!(config.summarizer.command.as_deref(), Some("./map.sh"));
    }

    #[test]
    fn invalid_flag_values_rejected() {
        let mut config = AppConfig::default();
        assert!(apply_flags(&mut config, &parse(&["--summarizer", "magic"])).is_err());

        let mut config = AppConfig::default();
        assert!(apply_flags(&mut config, &parse(&["--map-tokens", "0"])).is_err());
    }

    #[test]
    fn defaults_untouched_without_flags() {
        let mut config = AppConfig::default();
        apply_flags(&mut config, &parse(&[])).unwrap();
        assert_eq!(config.assembly.map_tokens, AppConfig::default().assembly.map_tokens);
        assert!(config.assembly.suggest_shell_commands);
        assert_eq!(config.summarizer.kind, SummarizerKind::Listing);
    }
}
