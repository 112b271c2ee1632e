// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use globset::GlobBuilder;
use ignore::WalkBuilder;
use serde_json::{json, Value};
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// `FindMaxResults`.
const FIND_MAX_RESULTS: usize = 1_000;

/// `FindMaxBytes`: total size of the returned path list.
const FIND_MAX_BYTES: usize = 50 * 1024;

pub struct FindTool;

#[async_trait]
impl Tool for FindTool {
    fn name(&self) -> &str {
        "find"
    }

    fn description(&self) -> &str {
        "Find files or directories by glob pattern, honoring .gitignore.\n\
         Returns paths relative to 'path'. 'type' restricts results to file,\n\
         directory, or both (default both)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Glob pattern, e.g. '**/*.rs'"
                },
                "path": {
                    "type": "string",
                    "description": "Directory to search in (default: allowed root)"
                },
                "type": {
                    "type": "string",
                    "enum": ["file", "directory", "both"],
                    "description": "Restrict results by entry type (default both)"
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
        let entry_type = call.args.get("type").and_then(|v| v.as_str()).unwrap_or("both");

        let glob = match GlobBuilder::new(pattern).literal_separator(false).build() {
            Ok(g) => g.compile_matcher(),
            Err(e) => return ToolResult::err(format!("invalid glob pattern: {e}")),
        };

        debug!(pattern, path = %resolved.display(), entry_type, "find tool");

        let mut results: Vec<String> = Vec::new();
        let mut total_bytes = 0usize;
        let mut truncated = false;

        for entry in WalkBuilder::new(&resolved).hidden(false).build().flatten() {
            if ctx.cancel.is_cancelled() {
                return ToolResult::err("Skipped due to user interrupt");
            }
            let Some(file_type) = entry.file_type() else { continue };
            let is_dir = file_type.is_dir();
            if entry.path() == resolved {
                continue;
            }
            match entry_type {
                "file" if is_dir => continue,
                "directory" if !is_dir => continue,
                _ => {}
            }
            let rel = entry.path().strip_prefix(&resolved).unwrap_or(entry.path());
            if !glob.is_match(rel) {
                continue;
            }
            let rendered = rel.to_string_lossy().into_owned();
            if results.len() >= FIND_MAX_RESULTS || total_bytes + rendered.len() > FIND_MAX_BYTES {
                truncated = true;
                break;
            }
            total_bytes += rendered.len() + 1;
            results.push(rendered);
        }

        results.sort();
        let mut output = results.join("\n");
        if truncated {
            output.push_str(&format!("\n...[results truncated at {FIND_MAX_RESULTS} entries / {FIND_MAX_BYTES} bytes]"));
        }
        if output.is_empty() {
            output = "(no matches)".to_string();
        }
        ToolResult::ok(output)
    }
}
