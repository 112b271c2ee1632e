// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
//! Keeps the conversation within `MaxContextChars` without violating the
//! assistant/tool-result pairing invariant.

use pigo_model::{CompletionRequest, Message, ModelProvider, Role};
use tokio_util::sync::CancellationToken;
use tracing::warn;

const SUMMARIZE_PROMPT: &str =
    "You are a context compaction assistant. Summarize the following conversation history \
     in a concise, information-dense way. Preserve technical details, decisions, file names, \
     code snippets, and tool outputs that may be relevant to future work. This summary \
     replaces the original history to free up context space.";

/// Outcome of one compaction pass, used to populate `ContextCompacted`.
#[derive(Debug, Clone, Copy)]
pub struct CompactionResult {
    pub chars_before: usize,
    pub chars_after: usize,
    /// True when summarization failed and naive truncation was used instead.
    pub fallback: bool,
}

/// Run one compaction pass over `messages` in place.
///
/// `messages[0]` is treated as the system prompt and preserved untouched when
/// its role is `System`. Returns `None` when there was nothing to discard.
pub async fn compact(
    messages: &mut Vec<Message>,
    model: &dyn ModelProvider,
    keep_recent_chars: usize,
    min_keep_messages: usize,
    cancel: CancellationToken,
) -> Option<CompactionResult> {
    let chars_before: usize = messages.iter().map(Message::char_len).sum();

    let system = messages.first().filter(|m| m.role == Role::System).cloned();
    let rest_start = if system.is_some() { 1 } else { 0 };
    let rest = &messages[rest_start..];

    let split = split_point(rest, keep_recent_chars, min_keep_messages);
    if split == 0 {
        return None;
    }

    let discarded = &rest[..split];
    let retained: Vec<Message> = rest[split..].to_vec();

    let summary_request = CompletionRequest {
        messages: vec![Message::system(SUMMARIZE_PROMPT), Message::user(serialize_history(discarded))],
        tools: Vec::new(),
    };

    let mut fallback = false;
    let new_messages = match model.complete(summary_request, cancel).await {
        Ok(resp) if !resp.text.trim().is_empty() => {
            let mut out = Vec::with_capacity(retained.len() + 2);
            if let Some(sys) = system {
                out.push(sys);
            }
            out.push(Message::user(resp.text));
            out.extend(retained);
            out
        }
        other => {
            if let Err(e) = &other {
                warn!(error = %e, "compaction summarization call failed, falling back to naive truncation");
            } else {
                warn!("compaction summarization returned empty text, falling back to naive truncation");
            }
            fallback = true;
            let mut out = Vec::with_capacity(retained.len() + 1);
            if let Some(sys) = system {
                out.push(sys);
            }
            out.extend(retained);
            out
        }
    };

    let chars_after: usize = new_messages.iter().map(Message::char_len).sum();
    *messages = new_messages;
    Some(CompactionResult { chars_before, chars_after, fallback })
}

/// Index within `rest` at which the retained tail begins. `rest[..idx]` is
/// discarded (subject to summarization); `rest[idx..]` is kept verbatim.
fn split_point(rest: &[Message], keep_recent_chars: usize, min_keep_messages: usize) -> usize {
    if rest.is_empty() {
        return 0;
    }

    let mut acc = 0usize;
    let mut idx = rest.len();
    while idx > 0 {
        let c = rest[idx - 1].char_len();
        if acc + c > keep_recent_chars && idx < rest.len() {
            break;
        }
        acc += c;
        idx -= 1;
    }

    idx = avoid_orphaned_tool_result(rest, idx);

    if rest.len() - idx < min_keep_messages {
        idx = rest.len().saturating_sub(min_keep_messages);
        idx = avoid_orphaned_tool_result(rest, idx);
    }

    idx
}

/// If `rest[idx]` is a tool-result message, walk `idx` backward until it no
/// longer splits an assistant tool-call message from one of its results.
fn avoid_orphaned_tool_result(rest: &[Message], mut idx: usize) -> usize {
    while idx > 0 && idx < rest.len() && rest[idx].role == Role::Tool {
        idx -= 1;
    }
    idx
}

fn serialize_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::System => "System",
                Role::User => "User",
                Role::Assistant => "Assistant",
                Role::Tool => "Tool",
            };
            if m.tool_calls.is_empty() {
                format!("{role}: {}", m.content)
            } else {
                let calls: Vec<String> = m
                    .tool_calls
                    .iter()
                    .map(|c| format!("{}({})", c.name, c.arguments))
                    .collect();
                format!("{role}: {} [tool_calls: {}]", m.content, calls.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
