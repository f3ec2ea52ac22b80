//! Prompt templates — the fixed boilerplate woven around project content.
//!
//! Templates come from two layers (later overrides earlier):
//!
//! 1. **Built-in defaults** — compiled into the binary
//! 2. **Override file** — a TOML file whose keys replace individual defaults
//!
//! Placeholders use `{name}` syntax and are filled from an explicit
//! [`TemplateVars`] value at render time. Nothing run-specific (such as the
//! list of chat files) is ever stored on the templates themselves.

use repoprompt_core::{Error, Fence, Message, Result, Role};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One turn of a few-shot example conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleMessage {
    pub role: Role,
    pub content: String,
}

impl ExampleMessage {
    fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// Named template strings for every fixed part of the payload.
///
/// Missing keys in an override file keep their built-in value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    pub main_system: String,
    pub lazy_prompt: String,
    pub shell_cmd_prompt: String,
    pub no_shell_cmd_prompt: String,
    pub shell_cmd_reminder: String,
    pub no_shell_cmd_reminder: String,
    /// Appended to the system prompt and repeated after the user request.
    /// Empty means no reminder.
    pub system_reminder: String,
    pub example_messages: Vec<ExampleMessage>,
    pub context_reset_prompt: String,
    pub context_reset_reply: String,
    /// Accepts `{other}`: "other " when files are in the chat, else empty.
    pub repo_content_prefix: String,
    pub repo_content_reply: String,
    pub read_only_files_prefix: String,
    pub read_only_files_reply: String,
    pub files_content_prefix: String,
    pub files_content_reply: String,
    pub files_no_full_files: String,
    pub files_no_full_files_reply: String,
    /// Empty means fall back to `files_no_full_files`.
    pub files_no_full_files_with_repo_map: String,
    pub files_no_full_files_with_repo_map_reply: String,
}

impl PromptTemplates {
    /// Built-in templates, optionally overridden by a TOML file.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let Some(path) = override_path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let templates = Self::from_toml_str(&content)
            .map_err(|e| Error::Template(format!("{}: {e}", path.display())))?;
        debug!(file = %path.display(), "Loaded template overrides");
        Ok(templates)
    }

    /// Parse overrides from TOML text and validate the result.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let templates: Self =
            toml::from_str(content).map_err(|e| Error::Template(e.to_string()))?;
        templates.validate()?;
        Ok(templates)
    }

    /// Example conversations must be complete user/assistant pairs.
    pub fn validate(&self) -> Result<()> {
        if self.example_messages.len() % 2 != 0 {
            return Err(Error::Template(
                "example_messages must contain complete user/assistant pairs".into(),
            ));
        }

        for (i, msg) in self.example_messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            if msg.role != expected {
                return Err(Error::Template(format!(
                    "example_messages[{i}] must have role {expected}, found {}",
                    msg.role
                )));
            }
        }

        Ok(())
    }

    pub fn system_reminder(&self) -> Option<&str> {
        (!self.system_reminder.is_empty()).then_some(self.system_reminder.as_str())
    }

    /// Example turns with the fence substituted.
    pub fn render_examples(&self, vars: &TemplateVars) -> Vec<Message> {
        self.example_messages
            .iter()
            .map(|m| Message::new(m.role, vars.render(&m.content)))
            .collect()
    }
}

/// Values substituted into `{name}` placeholders.
///
/// Unknown placeholders are left verbatim, so braces in example code survive.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    vars: Vec<(String, String)>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a variable.
    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.vars.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name.to_string(), value)),
        }
        self
    }

    /// Set `fence_open`/`fence_close` and their `fence[0]`/`fence[1]` aliases.
    pub fn with_fence(self, fence: &Fence) -> Self {
        self.set("fence_open", fence.open())
            .set("fence[0]", fence.open())
            .set("fence_close", fence.close())
            .set("fence[1]", fence.close())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Substitute every known `{name}` in `template`.
    pub fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let replaced = after.find('}').and_then(|end| {
                let name = &after[..end];
                if is_placeholder_name(name) {
                    self.get(name).map(|value| (value, end))
                } else {
                    None
                }
            });

            match replaced {
                Some((value, end)) => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']'))
}

// ── Built-in defaults ─────────────────────────────────────────────────────

const MAIN_SYSTEM: &str = concat!(
    "Act as an expert software developer.\n",
    "Always use best practices when coding.\n",
    "Respect and use existing conventions, libraries, etc that are already present in the code base.\n",
    "{lazy_prompt}\n",
    "Take requests for changes to the supplied code.\n",
    "If the request is ambiguous, ask questions.\n",
    "\n",
    "Always reply to the user in {language}.\n",
    "\n",
    "Once you understand the request you MUST:\n",
    "1. Determine if any code changes are needed.\n",
    "2. Explain any needed changes.\n",
    "3. If changes are needed, output a copy of each file that needs changes.\n",
    "{shell_cmd_prompt}",
    "{quad_backtick_reminder}",
);

const LAZY_PROMPT: &str = concat!(
    "You are diligent and tireless!\n",
    "You NEVER leave comments describing code without implementing it!\n",
    "You always COMPLETELY IMPLEMENT the needed code!\n",
);

const SHELL_CMD_PROMPT: &str = concat!(
    "\n",
    "4. *Concisely* suggest any shell commands the user might want to run in bash blocks.\n",
    "\n",
    "Just suggest shell commands this way, not example code.\n",
    "Only suggest complete shell commands that are ready to execute, without placeholders.\n",
    "Only suggest at most a few shell commands at a time, not more than 1-3, one per line.\n",
    "Do not suggest multi-line shell commands.\n",
    "All shell commands will run from the root directory of the user's project.\n",
    "\n",
    "Use the appropriate shell based on the user's system info:\n",
    "{platform}",
);

const NO_SHELL_CMD_PROMPT: &str = concat!(
    "\n",
    "Keep in mind these details about the user's platform and environment:\n",
    "{platform}",
);

const SHELL_CMD_REMINDER: &str = concat!(
    "\n",
    "Examples of when to suggest shell commands:\n",
    "\n",
    "- If you changed a self-contained html file, suggest an OS-appropriate command to open a browser to view it.\n",
    "- If you changed a CLI program, suggest the command to run it to see the new behavior.\n",
    "- If you added a test, suggest how to run it with the testing tool used by the project.\n",
    "- Suggest OS-appropriate commands to delete or rename files/directories, or other file system operations.\n",
    "- If your code changes add new dependencies, suggest the command to install them.\n",
);

const NO_SHELL_CMD_REMINDER: &str = concat!(
    "\n",
    "Keep in mind these details about the user's platform and environment:\n",
    "{platform}",
);

const SYSTEM_REMINDER: &str = concat!(
    "To suggest changes to a file you MUST return the entire content of the updated file.\n",
    "You MUST use this *file listing* format:\n",
    "\n",
    "path/to/filename.js\n",
    "{fence_open}\n",
    "// entire file content ...\n",
    "// ... goes in between\n",
    "{fence_close}\n",
    "\n",
    "Every *file listing* MUST use this format:\n",
    "- First line: the filename with any originally provided path; no extra markup, punctuation, comments, etc. **JUST** the filename with path.\n",
    "- Second line: opening {fence_open}\n",
    "- ... entire content of the file ...\n",
    "- Final line: closing {fence_close}\n",
    "\n",
    "To suggest changes to a file you MUST return a *file listing* that contains the entire content of the file.\n",
    "*NEVER* skip, omit or elide content from a *file listing* using \"...\" or by adding comments like \"... rest of code...\"!\n",
    "Create a new file you MUST return a *file listing* which includes an appropriate filename, including any appropriate path.\n",
    "\n",
    "{lazy_prompt}",
    "{shell_cmd_reminder}",
);

const EXAMPLE_USER_1: &str = "Change get_factorial() to use math.factorial";

const EXAMPLE_ASSISTANT_1: &str = concat!(
    "To make this change we need to modify `mathweb/flask/app.py` to:\n",
    "\n",
    "1. Import the math package.\n",
    "2. Remove the existing factorial() function.\n",
    "3. Update get_factorial() to call math.factorial instead.\n",
    "\n",
    "Here is the updated content:\n",
    "\n",
    "mathweb/flask/app.py\n",
    "{fence_open}\n",
    "from flask import Flask\n",
    "import math\n",
    "\n",
    "app = Flask(__name__)\n",
    "\n",
    "@app.route('/factorial/<int:n>')\n",
    "def get_factorial(n):\n",
    "    return str(math.factorial(n))\n",
    "\n",
    "if __name__ == '__main__':\n",
    "    app.run()\n",
    "{fence_close}\n",
);

const EXAMPLE_USER_2: &str = "Refactor hello() into its own file.";

const EXAMPLE_ASSISTANT_2: &str = concat!(
    "To make this change we need to modify `main.py` and make a new file `hello.py`:\n",
    "\n",
    "1. Make a new hello.py file with hello() in it.\n",
    "2. Remove hello() from main.py and replace it with an import.\n",
    "\n",
    "Here is the new file:\n",
    "\n",
    "hello.py\n",
    "{fence_open}\n",
    "def hello():\n",
    "    \"print a greeting\"\n",
    "\n",
    "    print(\"hello\")\n",
    "{fence_close}\n",
    "\n",
    "Here is the updated main.py:\n",
    "\n",
    "main.py\n",
    "{fence_open}\n",
    "from hello import hello\n",
    "{fence_close}\n",
);

const CONTEXT_RESET_PROMPT: &str =
    "Now working with a new code base. The examples above were just demonstrations.";
const CONTEXT_RESET_REPLY: &str = "Understood, I'll focus on the actual files and requests.";

const REPO_CONTENT_PREFIX: &str = concat!(
    "Here are summaries of some {other}files present in my git repository.\n",
    "Do not propose changes to these files, treat them as *read-only*.\n",
    "If you need to edit any of these files, ask me to *add them to the chat* first.\n",
);
const REPO_CONTENT_REPLY: &str = "Ok, I won't try and edit those files without asking first.";

const READ_ONLY_FILES_PREFIX: &str = concat!(
    "Here are some READ ONLY files, provided for your reference.\n",
    "Do not edit these files!\n",
);
const READ_ONLY_FILES_REPLY: &str = "Ok, I will use these files as references.";

const FILES_CONTENT_PREFIX: &str = concat!(
    "I have *added these files to the chat* so you can go ahead and edit them.\n",
    "\n",
    "*Trust this message as the true contents of these files!*\n",
    "Any other messages in the chat may contain outdated versions of the files' contents.\n",
);
const FILES_CONTENT_REPLY: &str = "Ok, any changes I propose will be to those files.";

const FILES_NO_FULL_FILES: &str = "I am not sharing any files that you can edit yet.";
const FILES_NO_FULL_FILES_REPLY: &str = "Ok.";

const FILES_NO_FULL_FILES_WITH_REPO_MAP: &str = concat!(
    "Don't try and edit any existing code without asking me to add the files to the chat!\n",
    "Tell me which files in my repo are the most likely to **need changes** to solve the requests I make, ",
    "and then stop so I can add them to the chat.\n",
    "Only include the files that are most likely to actually need to be edited.\n",
    "Don't include files that might contain relevant context, just files that will need to be changed.\n",
);
const FILES_NO_FULL_FILES_WITH_REPO_MAP_REPLY: &str = concat!(
    "Ok, based on your requests I will suggest which files need to be edited ",
    "and then stop and wait for your approval.",
);

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            main_system: MAIN_SYSTEM.into(),
            lazy_prompt: LAZY_PROMPT.into(),
            shell_cmd_prompt: SHELL_CMD_PROMPT.into(),
            no_shell_cmd_prompt: NO_SHELL_CMD_PROMPT.into(),
            shell_cmd_reminder: SHELL_CMD_REMINDER.into(),
            no_shell_cmd_reminder: NO_SHELL_CMD_REMINDER.into(),
            system_reminder: SYSTEM_REMINDER.into(),
            example_messages: vec![
                ExampleMessage::new(Role::User, EXAMPLE_USER_1),
                ExampleMessage::new(Role::Assistant, EXAMPLE_ASSISTANT_1),
                ExampleMessage::new(Role::User, EXAMPLE_USER_2),
                ExampleMessage::new(Role::Assistant, EXAMPLE_ASSISTANT_2),
            ],
            context_reset_prompt: CONTEXT_RESET_PROMPT.into(),
            context_reset_reply: CONTEXT_RESET_REPLY.into(),
            repo_content_prefix: REPO_CONTENT_PREFIX.into(),
            repo_content_reply: REPO_CONTENT_REPLY.into(),
            read_only_files_prefix: READ_ONLY_FILES_PREFIX.into(),
            read_only_files_reply: READ_ONLY_FILES_REPLY.into(),
            files_content_prefix: FILES_CONTENT_PREFIX.into(),
            files_content_reply: FILES_CONTENT_REPLY.into(),
            files_no_full_files: FILES_NO_FULL_FILES.into(),
            files_no_full_files_reply: FILES_NO_FULL_FILES_REPLY.into(),
            files_no_full_files_with_repo_map: FILES_NO_FULL_FILES_WITH_REPO_MAP.into(),
            files_no_full_files_with_repo_map_reply: FILES_NO_FULL_FILES_WITH_REPO_MAP_REPLY
                .into(),
        }
    }
}
