//! Configuration loading, validation, and management for repoprompt.
//!
//! Loads configuration from `~/.repoprompt/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.
//! Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.repoprompt/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prompt assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// File corpus settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Repository summarizer settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Token budget handed to the repository summarizer
    #[serde(default = "default_map_tokens")]
    pub map_tokens: usize,

    /// Tokenizer identifier handed to the repository summarizer
    #[serde(default = "default_tokenizer")]
    pub tokenizer: String,

    #[serde(default = "default_fence")]
    pub fence_open: String,

    #[serde(default = "default_fence")]
    pub fence_close: String,

    /// Whether the system prompt invites shell command suggestions
    #[serde(default = "default_true")]
    pub suggest_shell_commands: bool,

    /// Reply language hint substituted into `{language}`
    #[serde(default = "default_language")]
    pub language: String,

    /// Optional TOML file overriding the built-in prompt templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_path: Option<PathBuf>,
}

fn default_map_tokens() -> usize {
    4096
}
fn default_tokenizer() -> String {
    "cl100k_base".into()
}
fn default_fence() -> String {
    "```".into()
}
fn default_language() -> String {
    "the same language they are using".into()
}
fn default_true() -> bool {
    true
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            map_tokens: default_map_tokens(),
            tokenizer: default_tokenizer(),
            fence_open: default_fence(),
            fence_close: default_fence(),
            suggest_shell_commands: true,
            language: default_language(),
            templates_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// File extensions (with leading dot) never enumerated
    #[serde(default = "default_exclude_extensions")]
    pub exclude_extensions: Vec<String>,

    /// File extensions rendered as an image placeholder instead of content
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        "node_modules",
        "vendor",
        "build",
        "dist",
        "__pycache__",
        ".venv",
        "env",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_exclude_extensions() -> Vec<String> {
    [".log", ".tmp", ".bak", ".swp", ".pyc"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_image_extensions() -> Vec<String> {
    [".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: default_exclude_dirs(),
            exclude_extensions: default_exclude_extensions(),
            image_extensions: default_image_extensions(),
        }
    }
}

/// Which repository summarizer produces the repo-map text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerKind {
    /// No summary; the repo-map chunk is always omitted
    None,
    /// Built-in ranked file listing
    #[default]
    Listing,
    /// External program whose stdout is the summary
    Command,
}

impl std::str::FromStr for SummarizerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "listing" => Ok(Self::Listing),
            "command" => Ok(Self::Command),
            other => Err(ConfigError::ValidationError(format!(
                "unknown summarizer kind '{other}' (expected none, listing or command)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default)]
    pub kind: SummarizerKind,

    /// Program to run when `kind = "command"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments placed before the generated ones (e.g. a script path)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.repoprompt/config.toml).
    ///
    /// Also checks environment variables:
    /// - `REPOPROMPT_MAP_TOKENS`
    /// - `REPOPROMPT_TOKENIZER`
    /// - `REPOPROMPT_SUMMARIZER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides and re-validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicitly requested config file.
    ///
    /// Unlike the default location, a missing file here is an error.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            });
        }
        Self::load_with_env(path)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Takes the lookup as a closure so tests don't have to mutate the
    /// process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(tokens) = lookup("REPOPROMPT_MAP_TOKENS") {
            self.assembly.map_tokens = tokens.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "REPOPROMPT_MAP_TOKENS must be a positive integer, got '{tokens}'"
                ))
            })?;
        }

        if let Some(tokenizer) = lookup("REPOPROMPT_TOKENIZER") {
            self.assembly.tokenizer = tokenizer;
        }

        if let Some(kind) = lookup("REPOPROMPT_SUMMARIZER") {
            self.summarizer.kind = kind.parse()?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".repoprompt")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assembly.map_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "assembly.map_tokens must be greater than 0".into(),
            ));
        }

        if self.assembly.fence_open.is_empty() || self.assembly.fence_close.is_empty() {
            return Err(ConfigError::ValidationError(
                "assembly.fence_open and assembly.fence_close must not be empty".into(),
            ));
        }

        if self.summarizer.kind == SummarizerKind::Command
            && self
                .summarizer
                .command
                .as_deref()
                .is_none_or(|c| c.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "summarizer.kind = \"command\" requires summarizer.command".into(),
            ));
        }

        Ok(())
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for repoprompt_core::Error {
    fn from(e: ConfigError) -> Self {
        repoprompt_core::Error::Config {
            message: e.to_string(),
        }
    }
}
