// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::rootcheck::resolve_within_root;
use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "edit"
    }

    fn description(&self) -> &str {
        "Replaces a literal substring in a file. 'old_string' must occur exactly once\n\
         unless 'replace_all' is set, in which case every occurrence is replaced.\n\
         Zero occurrences of old_string is an error."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Absolute or relative path to the file"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to find"
                },
                "new_string": {
                    "type": "string",
                    "description": "Text to replace it with"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace every occurrence instead of requiring exactly one (default false)"
                }
            },
            "required": ["path", "old_string", "new_string"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(path) = call.args.get("path").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'path'");
        };
        let Some(old_string) = call.args.get("old_string").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'old_string'");
        };
        let Some(new_string) = call.args.get("new_string").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required parameter 'new_string'");
        };
        let replace_all = call.args.get("replace_all").and_then(Value::as_bool).unwrap_or(false);

        let resolved = match resolve_within_root(&ctx.allowed_root, path) {
            Ok(p) => p,
            Err(msg) => return ToolResult::err(msg),
        };

        debug!(path = %resolved.display(), replace_all, "edit tool");

        let original = match tokio::fs::read_to_string(&resolved).await {
            Ok(s) => s,
            Err(e) => return ToolResult::err(format!("read error: {e}")),
        };

        let occurrences = original.matches(old_string).count();
        if occurrences == 0 {
            return ToolResult::err("old_string not found in file");
        }
        if !replace_all && occurrences > 1 {
            return ToolResult::err(format!(
                "old_string occurs {occurrences} times; expected exactly once. \
                 Include more surrounding context, or pass replace_all=true."
            ));
        }

        let replacements = if replace_all { occurrences } else { 1 };
        let updated = if replace_all {
            original.replace(old_string, new_string)
        } else {
            original.replacen(old_string, new_string, 1)
        };

        match tokio::fs::write(&resolved, &updated).await {
            Ok(_) => ToolResult::ok(format!("replaced {replacements} occurrence(s) in {}", resolved.display())),
            Err(e) => ToolResult::err(format!("write error: {e}")),
        }
    }
}
