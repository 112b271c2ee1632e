// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
use std::path::Path;

mod guidelines {
    pub fn general() -> &'static str {
        "- Be concise and precise. Use tools instead of guessing.\n\
         - Don't repeat the contents of a file back to the user verbatim; summarize what changed."
    }

    pub fn tool_usage() -> &'static str {
        "- Prefer `edit` over `write` for modifying existing files — it preserves surrounding context.\n\
         - Discovery workflow: `find` to locate files, `grep` to narrow, `read` with specific ranges for context.\n\
         - Use `bash` for commands, builds, and tests; never for file reads or writes when a dedicated tool exists."
    }

    pub fn error_handling() -> &'static str {
        "- When a tool fails, read the error message and try a different approach before retrying blindly.\n\
         - A path outside the allowed root is always refused; do not attempt to work around it."
    }
}

fn build_guidelines_section() -> String {
    format!(
        "## Guidelines\n\n### General\n{}\n\n### Tool usage\n{}\n\n### Error handling\n{}",
        guidelines::general(),
        guidelines::tool_usage(),
        guidelines::error_handling(),
    )
}

/// Build the system prompt.
///
/// `custom` overrides the default identity/guidelines text entirely when
/// set (the config's `system_prompt` field); otherwise the built-in prompt
/// describing the tool set and the filesystem boundary is used.
pub fn system_prompt(custom: Option<&str>, allowed_root: &Path) -> String {
    if let Some(text) = custom {
        return text.to_string();
    }

    format!(
        "You are Pigo, a terminal coding agent. You help the user read, write, and run code \
         directly in their project by calling tools: `bash`, `read`, `write`, `edit`, `grep`, \
         `find`, and `ls`.\n\n\
         All file operations are confined to {}. Any path outside this root is refused.\n\n\
         {}",
        allowed_root.display(),
        build_guidelines_section(),
    )
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
