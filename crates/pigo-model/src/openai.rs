// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
//! OpenAI-compatible chat-completions driver.
//!
//! Speaks the `/v1/chat/completions` wire format used by OpenAI itself and by
//! the many gateways and local servers (llama.cpp, vLLM, LM Studio, Ollama)
//! that mirror it. One non-streaming call per turn iteration: the Turn Loop
//! brackets it with `MessageStart`/`MessageEnd`, so there is no need for this
//! driver to deliver partial deltas.

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::provider::ModelProvider;
use crate::types::{CompletionResponse, FinishReason, ToolCall, Usage};
use crate::{CompletionRequest, Role};

pub struct OpenAiProvider {
    model: String,
    api_key: Option<String>,
    chat_url: String,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        model: String,
        api_key: Option<String>,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Self {
        let base = base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1")
            .trim_end_matches('/')
            .to_string();
        Self {
            model,
            api_key,
            chat_url: format!("{base}/chat/completions"),
            max_tokens: max_tokens.unwrap_or(4096),
            temperature: temperature.unwrap_or(0.2),
            client: reqwest::Client::new(),
        }
    }
}

fn role_str(r: &Role) -> &'static str {
    match r {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

fn build_messages(messages: &[crate::Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut obj = json!({ "role": role_str(&m.role), "content": m.content });
            if let Some(id) = &m.tool_call_id {
                obj["tool_call_id"] = json!(id);
            }
            if !m.tool_calls.is_empty() {
                obj["tool_calls"] = json!(m
                    .tool_calls
                    .iter()
                    .map(|c| json!({
                        "id": c.id,
                        "type": "function",
                        "function": { "name": c.name, "arguments": c.arguments },
                    }))
                    .collect::<Vec<_>>());
            }
            obj
        })
        .collect()
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        req: CompletionRequest,
        cancel: CancellationToken,
    ) -> anyhow::Result<CompletionResponse> {
        let messages = build_messages(&req.messages);
        let tools: Vec<Value> = req
            .tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });
        if !tools.is_empty() {
            body["tools"] = json!(tools);
        }

        debug!(
            model = %self.model,
            tool_count = tools.len(),
            message_count = messages.len(),
            "sending completion request"
        );

        let key = self
            .api_key
            .as_deref()
            .context("API key not set; provide api_key or api_key_env in config")?;

        let send = self.client.post(&self.chat_url).bearer_auth(key).json(&body).send();

        let resp = select! {
            r = send => r.context("openai request failed")?,
            _ = cancel.cancelled() => bail!("request cancelled"),
        };

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("openai error {status}: {text}");
        }

        let body: Value = resp.json().await.context("parsing openai response")?;
        parse_completion(&body)
    }
}

fn parse_completion(body: &Value) -> anyhow::Result<CompletionResponse> {
    let choice = body["choices"]
        .get(0)
        .context("openai response missing choices[0]")?;
    let message = &choice["message"];
    let text = message["content"].as_str().unwrap_or("").to_string();

    let tool_calls: Vec<ToolCall> = message["tool_calls"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|tc| {
            Some(ToolCall {
                id: tc["id"].as_str()?.to_string(),
                name: tc["function"]["name"].as_str()?.to_string(),
                arguments: tc["function"]["arguments"].as_str().unwrap_or("{}").to_string(),
            })
        })
        .collect();

    let finish_reason = match choice["finish_reason"].as_str() {
        Some("tool_calls") => FinishReason::ToolCalls,
        Some("length") => FinishReason::Length,
        Some("stop") | None => {
            if tool_calls.is_empty() {
                FinishReason::Stop
            } else {
                FinishReason::ToolCalls
            }
        }
        Some(_) => FinishReason::Stop,
    };

    let usage = Usage {
        prompt: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        completion: body["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        total: body["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(CompletionResponse { text, tool_calls, finish_reason, usage })
}
