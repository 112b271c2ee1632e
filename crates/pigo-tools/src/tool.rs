// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// A single tool invocation requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Opaque identifier returned by the model; forwarded verbatim.
    pub id: String,
    pub name: String,
    /// Parsed JSON arguments.
    pub args: Value,
}

/// Dual-channel result of executing a tool: `forLLM` feeds back into the
/// conversation, `forUser` is what the terminal prints, and the two may
/// differ — a tool can return a terse summary to the user while giving the
/// model the full detail it needs to keep working.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    pub for_llm: String,
    pub for_user: String,
    pub silent: bool,
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result with the same text shown to both the model and the user.
    pub fn ok(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { for_llm: text.clone(), for_user: text, silent: false, is_error: false }
    }

    /// Error result with the same message on both channels.
    pub fn err(msg: impl Into<String>) -> Self {
        let text = msg.into();
        Self { for_llm: text.clone(), for_user: text, silent: false, is_error: true }
    }

    /// Result with independent model-facing and user-facing text.
    pub fn split(for_llm: impl Into<String>, for_user: impl Into<String>) -> Self {
        Self { for_llm: for_llm.into(), for_user: for_user.into(), silent: false, is_error: false }
    }
}

/// Per-call context a tool needs beyond its own arguments: the root it may
/// not escape and a cancellation token derived from the turn's token.
#[derive(Clone)]
pub struct ToolContext {
    pub allowed_root: PathBuf,
    pub cancel: CancellationToken,
}

/// Trait every built-in tool implements.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema for parameters.
    fn parameters_schema(&self) -> Value;
    /// Execute the tool. Never panics across the turn boundary; failures are
    /// reported via `ToolResult::err`.
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult;
}
