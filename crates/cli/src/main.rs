//! repoprompt CLI — assembles an aider-style chat prompt for a project.
//!
//! Reads the project tree, the chat and read-only file lists and a user
//! request, and emits the ordered `{role, content}` messages as pretty JSON.
//! Logs go to stderr so stdout stays a clean JSON stream.

use clap::Parser;
use std::path::PathBuf;

mod build;

#[derive(Parser, Debug)]
#[command(
    name = "repoprompt",
    about = "repoprompt — assemble chat-model prompts from a code base",
    version,
    author
)]
pub struct Cli {
    /// Project root directory
    #[arg(long)]
    pub dir: PathBuf,

    /// The user's request, sent verbatim as the final user message
    #[arg(long)]
    pub user_message: String,

    /// Files whose full contents are added for editing (relative to --dir)
    #[arg(long, num_args = 0..)]
    pub chat_files: Vec<String>,

    /// Files whose full contents are added for reference only
    #[arg(long, num_args = 0..)]
    pub read_only_files: Vec<String>,

    /// Extra files passed to the summarizer as mentioned
    #[arg(long, num_args = 0..)]
    pub extra_mentioned_files: Vec<String>,

    /// Extra identifiers passed to the summarizer as mentioned
    #[arg(long, num_args = 0..)]
    pub extra_mentioned_idents: Vec<String>,

    /// Token budget for the repository summary
    #[arg(long)]
    pub map_tokens: Option<usize>,

    /// Tokenizer name passed through to the summarizer
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// External summarizer program (implies --summarizer command)
    #[arg(long)]
    pub map_script: Option<String>,

    /// Summarizer kind: none, listing or command
    #[arg(long)]
    pub summarizer: Option<String>,

    /// Opening code fence
    #[arg(long)]
    pub fence_open: Option<String>,

    /// Closing code fence
    #[arg(long)]
    pub fence_close: Option<String>,

    /// Do not ask the model to suggest shell commands
    #[arg(long)]
    pub no_shell: bool,

    /// Write the JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (default: ~/.repoprompt/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// TOML file overriding individual prompt templates
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    build::run(&cli)
}
