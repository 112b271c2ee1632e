// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Directory tree the filesystem and shell tools may operate within.
    /// Defaults to the current working directory at startup when absent from
    /// every config layer.
    #[serde(default)]
    pub allowed_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider identifier. Common values: "openai" | "mock".
    pub provider: String,
    /// Model name forwarded to the provider API.
    pub name: String,
    /// Environment variable that holds the API key (read at runtime).
    pub api_key_env: Option<String>,
    /// Explicit API key; prefer api_key_env in config files to avoid secrets
    /// in version-controlled files.
    pub api_key: Option<String>,
    /// Base URL override. Useful for local proxies or OpenAI-compatible
    /// gateways; the correct default is auto-selected for hosted OpenAI.
    pub base_url: Option<String>,
    /// Maximum tokens to request in a single completion.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0-2.0).
    pub temperature: Option<f32>,
    /// Path to a YAML mock-responses file (used when provider = "mock").
    /// Can also be set via the PIGO_MOCK_RESPONSES environment variable.
    pub mock_responses_file: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            name: "gpt-4o".into(),
            api_key_env: None,
            api_key: None,
            base_url: None,
            max_tokens: Some(4096),
            temperature: Some(0.2),
            mock_responses_file: None,
        }
    }
}

fn default_max_agent_iterations() -> u32 {
    10
}
fn default_max_overflow_retries() -> u32 {
    2
}
fn default_max_context_chars() -> usize {
    200_000
}
fn default_proactive_compact_threshold() -> f32 {
    0.8
}
fn default_keep_recent_chars() -> usize {
    80_000
}
fn default_min_keep_messages() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum number of turn-loop iterations before stopping with
    /// `StopReason::IterationLimit`.
    #[serde(default = "default_max_agent_iterations")]
    pub max_agent_iterations: u32,
    /// Maximum number of corrective compaction retries after a context-window
    /// overflow response from the model before giving up.
    #[serde(default = "default_max_overflow_retries")]
    pub max_overflow_retries: u32,
    /// Character budget for the full message history (`ΣC(Mᵢ)`).
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    /// Fraction of `max_context_chars` at which proactive compaction runs
    /// before the next turn, ahead of ever reaching the hard cap.
    #[serde(default = "default_proactive_compact_threshold")]
    pub proactive_compact_threshold: f32,
    /// Character budget preserved verbatim (most recent messages) by
    /// compaction; everything older is replaced by a summary message.
    #[serde(default = "default_keep_recent_chars")]
    pub keep_recent_chars: usize,
    /// Compaction never removes the most recent `min_keep_messages` messages
    /// even if that means exceeding `keep_recent_chars`.
    #[serde(default = "default_min_keep_messages")]
    pub min_keep_messages: usize,
    /// System prompt override; leave None to use the built-in prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_agent_iterations: default_max_agent_iterations(),
            max_overflow_retries: default_max_overflow_retries(),
            max_context_chars: default_max_context_chars(),
            proactive_compact_threshold: default_proactive_compact_threshold(),
            keep_recent_chars: default_keep_recent_chars(),
            min_keep_messages: default_min_keep_messages(),
            system_prompt: None,
        }
    }
}

fn default_bash_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Default timeout in seconds for the `bash` tool when the call omits an
    /// explicit `timeout` argument.
    #[serde(default = "default_bash_timeout_secs")]
    pub bash_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            bash_timeout_secs: default_bash_timeout_secs(),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
