// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
//! The Turn Loop: appends the user prompt, calls the model, dispatches any
//! requested tool calls strictly sequentially, and repeats until the model
//! stops calling tools, the iteration cap is hit, or the turn is cancelled.

use std::sync::Arc;

use pigo_config::AgentConfig;
use pigo_model::{CompletionRequest, CompletionResponse, Message, ModelProvider};
use pigo_tools::{ToolContext, ToolRegistry};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::emitter::Emitter;
use crate::events::{AgentEvent, StopReason};
use crate::history;
use crate::session::Session;

/// Substrings that identify a model-client error as a context-size overflow
/// rather than a network/auth/other failure, so it can be recovered from by
/// compacting and retrying instead of ending the turn.
const OVERFLOW_MARKERS: [&str; 4] =
    ["context_length_exceeded", "exceed_context_size_error", "maximum context length", "context window"];

fn is_overflow_error(err: &anyhow::Error) -> bool {
    let msg = err.to_string().to_lowercase();
    OVERFLOW_MARKERS.iter().any(|m| msg.contains(m))
}

fn model_schemas(tools: &ToolRegistry) -> Vec<pigo_model::ToolSchema> {
    tools
        .schemas()
        .into_iter()
        .map(|s| pigo_model::ToolSchema { name: s.name, description: s.description, parameters: s.parameters })
        .collect()
}

enum DispatchOutcome {
    Completed,
    Interrupted,
}

/// Drives one or more turns over a shared [`Session`]. Stateless beyond its
/// configuration; the session and cancellation token are passed in per call.
pub struct TurnLoop {
    model: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    emitter: Arc<Emitter>,
    max_agent_iterations: u32,
    max_overflow_retries: u32,
    proactive_compact_threshold: f32,
    keep_recent_chars: usize,
    min_keep_messages: usize,
}

impl TurnLoop {
    pub fn new(model: Arc<dyn ModelProvider>, tools: Arc<ToolRegistry>, emitter: Arc<Emitter>, config: &AgentConfig) -> Self {
        Self {
            model,
            tools,
            emitter,
            max_agent_iterations: config.max_agent_iterations,
            max_overflow_retries: config.max_overflow_retries,
            proactive_compact_threshold: config.proactive_compact_threshold,
            keep_recent_chars: config.keep_recent_chars,
            min_keep_messages: config.min_keep_messages,
        }
    }

    /// Process one user input to completion, returning why the turn ended.
    pub async fn process_input(&self, session: &mut Session, prompt: &str, cancel: CancellationToken) -> StopReason {
        session.push(Message::user(prompt));
        self.emitter.emit(&AgentEvent::TurnStart);
        let stop = self.run(session, cancel).await;
        self.emitter.emit(&AgentEvent::TurnEnd { stop_reason: stop });
        stop
    }

    async fn run(&self, session: &mut Session, cancel: CancellationToken) -> StopReason {
        let mut corrective_retry_used = false;

        for _ in 0..self.max_agent_iterations {
            if cancel.is_cancelled() {
                return StopReason::Interrupted;
            }

            if session.is_near_limit(self.proactive_compact_threshold) {
                self.compact(session, cancel.clone()).await;
            }

            let resp = match self.call_model(session, cancel.clone()).await {
                Ok(resp) => resp,
                Err(e) => {
                    if cancel.is_cancelled() {
                        return StopReason::Interrupted;
                    }
                    self.emitter.emit(&AgentEvent::Error(e.to_string()));
                    return StopReason::Error;
                }
            };

            self.emitter.emit(&AgentEvent::MessageStart);
            session.record_usage(resp.usage);
            self.emitter.emit(&AgentEvent::TokenUsage { usage: resp.usage, context_total: session.char_total() });

            let text = resp.text.clone();
            let text_is_empty = text.trim().is_empty();
            session.push(Message::assistant(resp.text, resp.tool_calls.clone()));
            self.emitter.emit(&AgentEvent::MessageEnd { text });

            if resp.tool_calls.is_empty() {
                if text_is_empty && !corrective_retry_used {
                    corrective_retry_used = true;
                    session.push(Message::user(
                        "Your previous response had no text and no tool calls. Please respond with \
                         either an answer or a tool call.",
                    ));
                    continue;
                }
                return StopReason::Completed;
            }

            match self.dispatch_tool_calls(session, &resp.tool_calls, cancel.clone()).await {
                DispatchOutcome::Completed => continue,
                DispatchOutcome::Interrupted => return StopReason::Interrupted,
            }
        }

        StopReason::IterationLimit
    }

    async fn call_model(&self, session: &mut Session, cancel: CancellationToken) -> anyhow::Result<CompletionResponse> {
        let mut attempts = 0u32;
        loop {
            let req = CompletionRequest { messages: session.messages.clone(), tools: model_schemas(&self.tools) };
            match self.model.complete(req, cancel.clone()).await {
                Ok(resp) => return Ok(resp),
                Err(e) if is_overflow_error(&e) && attempts < self.max_overflow_retries => {
                    attempts += 1;
                    warn!(attempt = attempts, error = %e, "model reported context overflow, compacting and retrying");
                    self.compact(session, cancel.clone()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn compact(&self, session: &mut Session, cancel: CancellationToken) {
        let mut messages = session.messages.clone();
        if let Some(result) =
            history::compact(&mut messages, self.model.as_ref(), self.keep_recent_chars, self.min_keep_messages, cancel).await
        {
            session.replace_messages(messages);
            self.emitter
                .emit(&AgentEvent::ContextCompacted { chars_before: result.chars_before, chars_after: result.chars_after });
        }
    }

    async fn dispatch_tool_calls(
        &self,
        session: &mut Session,
        calls: &[pigo_model::ToolCall],
        cancel: CancellationToken,
    ) -> DispatchOutcome {
        let ctx = ToolContext { allowed_root: session.allowed_root.clone(), cancel: cancel.clone() };

        for (i, call) in calls.iter().enumerate() {
            if cancel.is_cancelled() {
                for remaining in &calls[i..] {
                    session.push(Message::tool_result(remaining.id.clone(), "Skipped due to user interrupt"));
                }
                return DispatchOutcome::Interrupted;
            }

            let args_for_event: Value = serde_json::from_str(&call.arguments).unwrap_or(Value::Null);
            self.emitter.emit(&AgentEvent::ToolStart { name: call.name.clone(), args: args_for_event });

            let result = match serde_json::from_str::<Value>(&call.arguments) {
                Ok(args) => {
                    let tool_call = pigo_tools::ToolCall { id: call.id.clone(), name: call.name.clone(), args };
                    self.tools.execute(&tool_call, &ctx).await
                }
                Err(e) => pigo_tools::ToolResult::err(format!("invalid tool call arguments: {e}")),
            };

            self.emitter.emit(&AgentEvent::ToolEnd {
                name: call.name.clone(),
                for_user: result.for_user.clone(),
                silent: result.silent,
                is_error: result.is_error,
            });
            session.push(Message::tool_result(call.id.clone(), result.for_llm));
        }

        DispatchOutcome::Completed
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
