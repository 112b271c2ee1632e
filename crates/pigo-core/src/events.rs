// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
use pigo_model::Usage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Completed,
    Interrupted,
    IterationLimit,
    Error,
}

/// Lifecycle events emitted by the Turn Loop. Within a turn, events obey
/// `TurnStart -> (MessageStart -> MessageEnd -> ToolStart -> ToolEnd)* -> TurnEnd`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentEvent {
    AgentStart,
    AgentEnd,
    TurnStart,
    TurnEnd { stop_reason: StopReason },
    MessageStart,
    MessageEnd { text: String },
    ToolStart { name: String, args: Value },
    ToolEnd { name: String, for_user: String, silent: bool, is_error: bool },
    ContextCompacted { chars_before: usize, chars_after: usize },
    TokenUsage { usage: Usage, context_total: usize },
    Error(String),
}
