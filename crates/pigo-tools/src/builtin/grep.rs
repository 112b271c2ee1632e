// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// `GrepMaxMatches`: the subprocess is killed once this many matches arrive.
const GREP_MAX_MATCHES: usize = 100;

/// `GrepMaxBytes`: the subprocess is killed once this many bytes of matched
/// output have been read, even if the match count cap hasn't been hit.
const GREP_MAX_BYTES: usize = 50 * 1024;

/// Per-match line truncation.
const MAX_LINE_LENGTH: usize = 500;

pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        "Regex pattern search over files. 'include' filters by glob (e.g. '*.rs').\n\
         Stops after 100 matches or 50 KB of matched output, whichever comes first;\n\
         each matched line is truncated at 500 characters."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search (default: allowed root)"
                },
                "include": {
                    "type": "string",
                    "description": "Glob pattern to filter files, e.g. '*.rs'"
                },
                "context_lines": {
                    "type": "integer",
                    "description": "Lines of context before and after each match (default 0)"
                }
            },
            "required": ["pattern"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(pattern) = call.args.get("pattern").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'pattern'");
        };
        let path = call.args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let resolved = match resolve_within_root(&ctx.allowed_root, path) {
            Ok(p) => p,
            Err(msg) => return ToolResult::err(msg),
        };
        let include = call.args.get("include").and_then(|v| v.as_str());
        let context_lines = call.args.get("context_lines").and_then(Value::as_u64).unwrap_or(0);

        debug!(pattern, path = %resolved.display(), "grep tool");

        match run_rg(pattern, &resolved, include, context_lines, ctx).await {
            Ok(output) if output.trim().is_empty() => ToolResult::ok("(no matches)"),
            Ok(output) => ToolResult::ok(output),
            Err(e) => ToolResult::err(format!("grep error: {e}")),
        }
    }
}

async fn run_rg(
    pattern: &str,
    path: &std::path::Path,
    include: Option<&str>,
    context_lines: u64,
    ctx: &ToolContext,
) -> anyhow::Result<String> {
    let mut args = vec!["--color".into(), "never".into(), "--no-heading".into(), "--line-number".into()];
    if context_lines > 0 {
        args.push(format!("-C{context_lines}"));
    }
    if let Some(glob) = include {
        args.push("-g".into());
        args.push(glob.into());
    }
    args.push(pattern.to_string());
    args.push(path.to_string_lossy().into_owned());

    let mut child = Command::new("rg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = child.stdout.take().expect("piped stdout");
    let mut lines = BufReader::new(stdout).lines();

    let mut matches = 0usize;
    let mut bytes = 0usize;
    let mut output = String::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let rendered = if line.len() > MAX_LINE_LENGTH {
                            format!("{}...[truncated]", &line[..MAX_LINE_LENGTH])
                        } else {
                            line
                        };
                        bytes += rendered.len() + 1;
                        output.push_str(&rendered);
                        output.push('\n');
                        matches += 1;
                        if matches >= GREP_MAX_MATCHES || bytes >= GREP_MAX_BYTES {
                            output.push_str(&format!(
                                "...[stopped after {matches} matches / {bytes} bytes]"
                            ));
                            let _ = child.start_kill();
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = ctx.cancel.cancelled() => {
                let _ = child.start_kill();
                anyhow::bail!("cancelled");
            }
        }
    }

    let _ = child.wait().await;
    Ok(output)
}
