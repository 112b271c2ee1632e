// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

pub struct WriteTool;

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        "write"
    }

    fn description(&self) -> &str {
        "Writes a file to the local filesystem, creating missing parent directories.\n\
         Overwrites an existing file at the same path. Prefer edit for small changes\n\
         to an existing file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(path) = call.args.get("path").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'path'");
        };
        let Some(content) = call.args.get("content").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'content'");
        };
        let resolved = match resolve_within_root(&ctx.allowed_root, path) {
            Ok(p) => p,
            Err(msg) => return ToolResult::err(msg),
        };

        debug!(path = %resolved.display(), "write tool");

        if let Some(parent) = resolved.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return ToolResult::err(format!("failed to create parent directories: {e}"));
                }
            }
        }

        match tokio::fs::write(&resolved, content).await {
            Ok(_) => ToolResult::ok(format!("wrote {} bytes to {}", content.len(), resolved.display())),
            Err(e) => ToolResult::err(format!("write error: {e}")),
        }
    }
}
