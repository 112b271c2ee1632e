// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// `MaxReadFileSize`: files larger than this are refused outright.
const MAX_READ_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// `MaxLineLength`: a single line longer than this is truncated.
const MAX_LINE_LENGTH: usize = 500;

/// Head-truncation cap on total output characters.
const MAX_OUTPUT_CHARS: usize = 20_000;

pub struct ReadTool;

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        "Reads a UTF-8 text file. Lines are 1-indexed and formatted as 'N:content'.\n\
         Refuses files over 10 MB. Lines longer than 500 characters are truncated.\n\
         Use line_start/line_end to read a slice of a large file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "line_start": {
                    "type": "integer",
                    "description": "1-indexed first line to return (default 1)"
                },
                "line_end": {
                    "type": "integer",
                    "description": "1-indexed last line to return (default: end of file)"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(path) = call.args.get("path").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'path'");
        };
        let resolved = match resolve_within_root(&ctx.allowed_root, path) {
            Ok(p) => p,
            Err(msg) => return ToolResult::err(msg),
        };
        let line_start = call.args.get("line_start").and_then(Value::as_u64).unwrap_or(1).max(1) as usize;
        let line_end = call.args.get("line_end").and_then(Value::as_u64).map(|v| v as usize);

        debug!(path = %resolved.display(), line_start, ?line_end, "read tool");

        let meta = match tokio::fs::metadata(&resolved).await {
            Ok(m) => m,
            Err(e) => return ToolResult::err(format!("read error: {e}")),
        };
        if meta.len() > MAX_READ_FILE_SIZE {
            return ToolResult::err(format!(
                "file too large: {} bytes exceeds the {} byte limit",
                meta.len(),
                MAX_READ_FILE_SIZE
            ));
        }

        let bytes = match tokio::fs::read(&resolved).await {
            Ok(b) => b,
            Err(e) => return ToolResult::err(format!("read error: {e}")),
        };
        let text = String::from_utf8_lossy(&bytes);
        let all_lines: Vec<&str> = text.lines().collect();
        let total = all_lines.len();
        let end = line_end.unwrap_or(total).min(total);
        let start = line_start.min(total.max(1));

        let mut output = String::new();
        let mut shown = 0usize;
        let mut truncated_by_chars = false;
        for (i, line) in all_lines.iter().enumerate().take(end).skip(start.saturating_sub(1)) {
            let rendered = if line.len() > MAX_LINE_LENGTH {
                format!("{}...[truncated]", &line[..MAX_LINE_LENGTH])
            } else {
                line.to_string()
            };
            let entry = format!("{}:{}\n", i + 1, rendered);
            if output.len() + entry.len() > MAX_OUTPUT_CHARS {
                truncated_by_chars = true;
                break;
            }
            output.push_str(&entry);
            shown += 1;
        }

        let last_shown = start.saturating_sub(1) + shown;
        if last_shown < end {
            let reason = if truncated_by_chars {
                format!("output limit ({MAX_OUTPUT_CHARS} chars) reached")
            } else {
                format!("{} more lines", end - last_shown)
            };
            output.push_str(&format!("...[{reason}; use line_start={} to continue]", last_shown + 1));
        }

        ToolResult::ok(output)
    }
}
