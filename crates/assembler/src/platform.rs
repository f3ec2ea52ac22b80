//! Platform/environment description embedded in the system prompt.

use std::path::Path;

/// What the model is told about the user's machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// `<os>-<arch>`, e.g. `linux-x86_64`
    pub platform: String,
    /// `SHELL` on unix, `COMSPEC` on Windows
    pub shell_var: &'static str,
    pub shell: Option<String>,
    /// Locale language such as `en_US`
    pub language: Option<String>,
    /// `YYYY-MM-DD`, local time
    pub date: String,
    pub in_git_repo: bool,
}

impl PlatformInfo {
    /// Probe the current process environment for a project rooted at `root`.
    pub fn detect(root: &Path) -> Self {
        let shell_var = if cfg!(windows) { "COMSPEC" } else { "SHELL" };
        Self {
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            shell_var,
            shell: std::env::var(shell_var).ok().filter(|s| !s.is_empty()),
            language: detect_language(|k| std::env::var(k).ok()),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            in_git_repo: root.join(".git").exists(),
        }
    }

    /// One `- Key: value` line per known fact, each newline-terminated.
    pub fn render(&self) -> String {
        let mut text = format!("- Platform: {}\n", self.platform);
        if let Some(shell) = &self.shell {
            text.push_str(&format!("- Shell: {}={}\n", self.shell_var, shell));
        }
        if let Some(lang) = &self.language {
            text.push_str(&format!("- Language: {lang}\n"));
        }
        text.push_str(&format!("- Current date: {}\n", self.date));
        if self.in_git_repo {
            text.push_str("- The user is operating inside a git repository\n");
        }
        text
    }
}

/// First meaningful locale among `LC_ALL`, `LC_MESSAGES`, `LANG`, with any
/// encoding suffix removed (`en_US.UTF-8` → `en_US`).
fn detect_language<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .map(|value| {
            let base = value.split(['.', '@']).next().unwrap_or_default();
            base.trim().to_string()
        })
        .find(|lang| !lang.is_empty() && lang != "C" && lang != "POSIX")
}
