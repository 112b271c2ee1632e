// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// `LsMaxEntries`.
const LS_MAX_ENTRIES: usize = 1_000;

pub struct LsTool;

#[async_trait]
impl Tool for LsTool {
    fn name(&self) -> &str {
        "ls"
    }

    fn description(&self) -> &str {
        "Lists a single directory's entries (non-recursive). Directories are marked\n\
         with a trailing '/'. Set 'all' to include dotfiles, matching Unix 'ls -a'.\n\
         For recursive search use find; for content search use grep."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the directory"
                },
                "all": {
                    "type": "boolean",
                    "description": "Include dotfiles (default false)"
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
        let all = call.args.get("all").and_then(Value::as_bool).unwrap_or(false);
        let resolved = match resolve_within_root(&ctx.allowed_root, path) {
            Ok(p) => p,
            Err(msg) => return ToolResult::err(msg),
        };

        debug!(path = %resolved.display(), all, "ls tool");

        let mut read_dir = match tokio::fs::read_dir(&resolved).await {
            Ok(rd) => rd,
            Err(e) => return ToolResult::err(format!("read error: {e}")),
        };

        let mut entries: Vec<(String, bool)> = Vec::new();
        loop {
            let next = match read_dir.next_entry().await {
                Ok(n) => n,
                Err(e) => return ToolResult::err(format!("read error: {e}")),
            };
            let Some(entry) = next else { break };
            let name = entry.file_name().to_string_lossy().into_owned();
            if !all && name.starts_with('.') {
                continue;
            }
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push((name, is_dir));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let truncated = entries.len() > LS_MAX_ENTRIES;
        entries.truncate(LS_MAX_ENTRIES);

        let mut output = entries
            .into_iter()
            .map(|(name, is_dir)| if is_dir { format!("{name}/") } else { name })
            .collect::<Vec<_>>()
            .join("\n");

        if truncated {
            output.push_str(&format!("\n...[truncated at {LS_MAX_ENTRIES} entries]"));
        }
        if output.is_empty() {
            output = "(empty directory)".to_string();
        }
        ToolResult::ok(output)
    }
}
