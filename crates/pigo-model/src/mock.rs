// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{CompletionResponse, FinishReason, ToolCall, Usage};
use crate::{CompletionRequest, Role};

/// Deterministic mock provider for tests. Echoes the last user message back
/// as the assistant response.
#[derive(Default)]
pub struct MockProvider;

#[async_trait]
impl crate::ModelProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        req: CompletionRequest,
        _cancel: CancellationToken,
    ) -> anyhow::Result<CompletionResponse> {
        let reply = req
            .messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("[no input]")
            .to_string();

        Ok(CompletionResponse {
            text: format!("MOCK: {reply}"),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: Usage { prompt: 10, completion: 10, total: 20 },
        })
    }
}

/// One scripted model response: either a final text reply or a batch of
/// tool calls.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
}

impl ScriptedResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), tool_calls: Vec::new(), finish_reason: FinishReason::Stop }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            tool_calls: vec![ToolCall { id: id.into(), name: name.into(), arguments: arguments.into() }],
            finish_reason: FinishReason::ToolCalls,
        }
    }
}

/// A pre-scripted mock provider. Each call to `complete` pops the next
/// response from the front of the queue. Lets tests specify exact turn
/// sequences — including tool calls — without network access.
pub struct ScriptedMockProvider {
    scripts: Arc<Mutex<Vec<ScriptedResponse>>>,
    name: String,
    /// The last `CompletionRequest` seen by this provider, for assertions.
    pub last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl ScriptedMockProvider {
    pub fn new(scripts: Vec<ScriptedResponse>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts)),
            name: "scripted-mock".into(),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Convenience: provider that always returns a single text reply.
    pub fn always_text(reply: impl Into<String>) -> Self {
        Self::new(vec![ScriptedResponse::text(reply)])
    }

    /// Convenience: provider that returns a tool call followed by a text reply.
    pub fn tool_then_text(
        tool_id: impl Into<String>,
        tool_name: impl Into<String>,
        args_json: impl Into<String>,
        final_text: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            ScriptedResponse::tool_call(tool_id, tool_name, args_json),
            ScriptedResponse::text(final_text),
        ])
    }
}

#[async_trait]
impl crate::ModelProvider for ScriptedMockProvider {
    fn name(&self) -> &str {
        &self.name
    }
    fn model_name(&self) -> &str {
        "scripted-mock-model"
    }

    async fn complete(
        &self,
        req: CompletionRequest,
        _cancel: CancellationToken,
    ) -> anyhow::Result<CompletionResponse> {
        *self.last_request.lock().unwrap() = Some(req);
        let next = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                ScriptedResponse::text("[no more scripts]")
            } else {
                scripts.remove(0)
            }
        };
        Ok(CompletionResponse {
            text: next.text,
            tool_calls: next.tool_calls,
            finish_reason: next.finish_reason,
            usage: Usage { prompt: 5, completion: 5, total: 10 },
        })
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletionRequest, Message, ModelProvider};

    fn req() -> CompletionRequest {
        CompletionRequest { messages: vec![Message::user("hi")], ..Default::default() }
    }

    #[tokio::test]
    async fn mock_echoes_last_user_message() {
        let p = MockProvider;
        let resp = p.complete(req(), CancellationToken::new()).await.unwrap();
        assert!(resp.text.contains("MOCK: hi"));
        assert_eq!(resp.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn scripted_single_text_reply() {
        let p = ScriptedMockProvider::always_text("hello world");
        let resp = p.complete(req(), CancellationToken::new()).await.unwrap();
        assert_eq!(resp.text, "hello world");
    }

    #[tokio::test]
    async fn scripted_tool_then_text_two_rounds() {
        let p = ScriptedMockProvider::tool_then_text("call-1", "bash", r#"{"command":"ls"}"#, "done");

        let first = p.complete(req(), CancellationToken::new()).await.unwrap();
        assert_eq!(first.finish_reason, FinishReason::ToolCalls);
        assert_eq!(first.tool_calls.len(), 1);
        assert_eq!(first.tool_calls[0].name, "bash");

        let second = p.complete(req(), CancellationToken::new()).await.unwrap();
        assert_eq!(second.text, "done");
        assert_eq!(second.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn scripted_fallback_when_scripts_exhausted() {
        let p = ScriptedMockProvider::new(vec![]);
        let resp = p.complete(req(), CancellationToken::new()).await.unwrap();
        assert!(resp.text.contains("no more scripts"));
    }

    #[tokio::test]
    async fn scripted_records_last_request() {
        let p = ScriptedMockProvider::always_text("ok");
        let _ = p.complete(req(), CancellationToken::new()).await.unwrap();
        let seen = p.last_request.lock().unwrap();
        assert_eq!(seen.as_ref().unwrap().messages.len(), 1);
    }
}
