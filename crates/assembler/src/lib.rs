//! Prompt assembly for repoprompt.
//!
//! Turns a project corpus, the chat/read-only file sets and one user request
//! into the ordered message list sent to a chat model:
//!
//! - [`templates`] holds the fixed boilerplate and placeholder rendering
//! - [`formatter`] renders files as fenced blocks
//! - [`summarizer`] produces the optional repository map
//! - [`assembler`] orders everything into chunks
//! - [`pipeline`] wires a whole run from configuration

pub mod assembler;
pub mod chunks;
pub mod formatter;
pub mod pipeline;
pub mod platform;
pub mod summarizer;
pub mod templates;
pub mod token;

pub use assembler::{
    AssembledPrompt, AssemblyOptions, AssemblyReport, AssemblyRequest, ChatFilesContext,
    ChunkAssembler,
};
pub use chunks::{ChatChunks, ChunkStats};
pub use formatter::ContentFormatter;
pub use pipeline::{BuildSettings, build_prompt};
pub use platform::PlatformInfo;
pub use summarizer::{
    CachedSummarizer, CommandSummarizer, ListingSummarizer, MapRequest, NoSummary, RepoSummarizer,
    SummarizerError,
};
pub use templates::{ExampleMessage, PromptTemplates, TemplateVars};
