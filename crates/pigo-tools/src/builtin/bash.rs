// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
#[cfg(unix)]
use libc;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// `BashMaxOutput`: hard character ceiling on combined stdout + stderr
/// returned to the model.
const BASH_MAX_OUTPUT: usize = 10_000;

/// Built-in tool that runs a shell command.
pub struct BashTool {
    pub default_timeout_secs: u64,
}

impl Default for BashTool {
    fn default() -> Self {
        Self { default_timeout_secs: 120 }
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return stdout + stderr.\n\
         Output is capped at 10,000 characters; when larger, only the tail is kept,\n\
         with a marker showing how many characters were dropped from the front.\n\
         Prefer non-interactive commands; avoid ones that require a TTY."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute."
                },
                "timeout_secs": {
                    "type": "integer",
                    "description": "Execution timeout in seconds (default 120)."
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(command) = call.args.get("command").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'command'");
        };
        let timeout = call
            .args
            .get("timeout_secs")
            .and_then(|v| v.as_u64())
            .unwrap_or(self.default_timeout_secs);

        debug!(cmd = %command, "executing bash tool");

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(command);
        cmd.current_dir(&ctx.allowed_root);
        // Close stdin: the agent never has interactive input to offer a child
        // process. kill_on_drop ensures a timed-out or cancelled call never
        // leaves a zombie behind.
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);
        // setsid() detaches the child from the controlling terminal so escape
        // sequences it emits cannot corrupt the REPL's own terminal state.
        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                libc::setsid();
                Ok(())
            });
        }

        let run = async {
            tokio::time::timeout(std::time::Duration::from_secs(timeout), cmd.output()).await
        };

        let result = tokio::select! {
            r = run => r,
            _ = ctx.cancel.cancelled() => return ToolResult::err("Skipped due to user interrupt"),
        };

        match result {
            Ok(Ok(output)) => {
                let mut content = String::new();
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);

                if !stdout.is_empty() {
                    content.push_str(&stdout);
                }
                if !stderr.is_empty() {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str("[stderr]\n");
                    content.push_str(&stderr);
                }

                let code = output.status.code().unwrap_or(-1);
                content = format!("[exit {code}]\n{content}");
                let content = tail_truncate(&content, BASH_MAX_OUTPUT);

                if code == 0 {
                    ToolResult::ok(content)
                } else {
                    ToolResult::err(content)
                }
            }
            Ok(Err(e)) => ToolResult::err(format!("spawn error: {e}")),
            Err(_) => ToolResult::err(format!("timeout after {timeout}s")),
        }
    }
}

/// Keep only the trailing `max_chars` characters of `s`, prefixed by a
/// marker stating how many characters of the original were dropped.
fn tail_truncate(s: &str, max_chars: usize) -> String {
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_string();
    }
    let skip = total - max_chars;
    let tail: String = s.chars().skip(skip).collect();
    format!("...[last {max_chars} of {total} chars]...\n{tail}")
}
