// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::tool::{Tool, ToolCall, ToolContext, ToolResult};

/// A tool schema — mirrors `pigo_model::ToolSchema` but keeps this crate
/// independent of the model crate.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Holds every registered tool and dispatches calls against it.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Schemas for every registered tool, in verbatim JSON-Schema shape,
    /// sent to the model unfiltered.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .values()
            .map(|t| ToolSchema {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Locate, validate, and invoke. Unknown names and schema violations
    /// never reach a tool's `execute` and never panic.
    pub async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        let Some(tool) = self.tools.get(&call.name) else {
            return ToolResult::err(format!("unknown tool: {}", call.name));
        };
        if let Err(msg) = validate_args(&tool.parameters_schema(), &call.args) {
            return ToolResult::err(msg);
        }
        tool.execute(call, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates `args` against a JSON-Schema `object` schema: every `required`
/// property present, every present property's declared type matched.
/// Unknown properties are allowed (forward compatibility).
fn validate_args(schema: &Value, args: &Value) -> Result<(), String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for req in required {
            let Some(name) = req.as_str() else { continue };
            if args.get(name).is_none() {
                return Err(format!("missing required parameter '{name}'"));
            }
        }
    }
    for (name, prop_schema) in properties {
        let Some(value) = args.get(name) else { continue };
        let Some(expected) = prop_schema.get("type").and_then(Value::as_str) else { continue };
        if !type_matches(expected, value) {
            return Err(format!(
                "parameter '{name}' has wrong type: expected {expected}, got {}",
                json_type_name(value)
            ));
        }
    }
    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
