// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: MIT
//! Append-only event log under `.pigo/sessions/<id>/events.jsonl`, so a
//! session can be resumed later.
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use pigo_model::Message;
use serde::{Deserialize, Serialize};

use crate::events::AgentEvent;

/// One line of `events.jsonl`: either a history-affecting message or a pure
/// lifecycle marker kept for replay/debugging, not re-entered into history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionRecord {
    Message(Message),
    Lifecycle(AgentEvent),
}

#[derive(Debug, Serialize, Deserialize)]
struct Line {
    ts: String,
    event: SessionRecord,
}

pub fn sessions_root() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".pigo/sessions")
}

/// Append-only writer for one session's event log. Every write is flushed
/// immediately so an interrupted process loses at most the in-flight record.
pub struct SessionStore {
    file: File,
}

impl SessionStore {
    pub fn open(session_id: &str) -> anyhow::Result<Self> {
        Self::open_under(&sessions_root(), session_id)
    }

    fn open_under(root: &Path, session_id: &str) -> anyhow::Result<Self> {
        let dir = root.join(session_id);
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new().create(true).append(true).open(dir.join("events.jsonl"))?;
        Ok(Self { file })
    }

    pub fn append_message(&mut self, msg: &Message) -> anyhow::Result<()> {
        self.append(SessionRecord::Message(msg.clone()))
    }

    pub fn append_lifecycle(&mut self, event: &AgentEvent) -> anyhow::Result<()> {
        self.append(SessionRecord::Lifecycle(event.clone()))
    }

    fn append(&mut self, event: SessionRecord) -> anyhow::Result<()> {
        let line = Line { ts: Utc::now().to_rfc3339(), event };
        let json = serde_json::to_string(&line)?;
        writeln!(self.file, "{json}")?;
        self.file.flush()?;
        Ok(())
    }
}

/// Reconstruct the message history from a previously written event log,
/// skipping pure lifecycle markers.
pub fn load_messages(events_path: &Path) -> anyhow::Result<Vec<Message>> {
    let file = File::open(events_path)?;
    let reader = BufReader::new(file);
    let mut messages = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: Line = serde_json::from_str(&line)?;
        if let SessionRecord::Message(msg) = parsed.event {
            messages.push(msg);
        }
    }
    Ok(messages)
}

/// Session ids discovered under the sessions root, most recently modified first.
pub fn list_sessions() -> anyhow::Result<Vec<String>> {
    list_sessions_under(&sessions_root())
}

fn list_sessions_under(root: &Path) -> anyhow::Result<Vec<String>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries: Vec<(std::time::SystemTime, String)> = Vec::new();
    for entry in fs::read_dir(&root)? {
        let entry = entry?;
        if entry.path().is_dir() {
            let modified = entry.metadata()?.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            if let Some(name) = entry.file_name().to_str() {
                entries.push((modified, name.to_string()));
            }
        }
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(entries.into_iter().map(|(_, name)| name).collect())
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
