// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use pigo_model::{Message, Role, Usage};
use uuid::Uuid;

/// The in-memory owner of history, usage counters, model identity, and the
/// allowed-root path. Every subsystem that needs this state receives the
/// session explicitly; nothing reaches for a global.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub usage: Usage,
    pub model_name: String,
    pub allowed_root: PathBuf,
    /// Character budget enforced via `context_fraction`/`is_near_limit`.
    pub max_context_chars: usize,
    char_total: usize,
}

impl Session {
    pub fn new(max_context_chars: usize, model_name: impl Into<String>, allowed_root: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            usage: Usage::default(),
            model_name: model_name.into(),
            allowed_root,
            max_context_chars,
            char_total: 0,
        }
    }

    /// Append one message, updating the running character total (`ΣC(Mᵢ)`).
    pub fn push(&mut self, msg: Message) {
        self.char_total += msg.char_len();
        self.messages.push(msg);
    }

    pub fn push_many(&mut self, msgs: impl IntoIterator<Item = Message>) {
        for msg in msgs {
            self.push(msg);
        }
    }

    pub fn char_total(&self) -> usize {
        self.char_total
    }

    pub fn context_fraction(&self) -> f32 {
        if self.max_context_chars == 0 {
            return 0.0;
        }
        self.char_total as f32 / self.max_context_chars as f32
    }

    pub fn is_near_limit(&self, threshold: f32) -> bool {
        self.context_fraction() >= threshold
    }

    /// Replace the message list wholesale (used by compaction) and recompute
    /// the character total from scratch.
    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.char_total = messages.iter().map(Message::char_len).sum();
        self.messages = messages;
    }

    pub fn record_usage(&mut self, usage: Usage) {
        self.usage += usage;
    }

    pub fn system_message(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.role == Role::System)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
