// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::CompletionRequest;
use crate::types::CompletionResponse;

/// The Model Client contract: transport-agnostic, one call per turn
/// iteration. Implementations own their own wire format (JSON REST, gRPC,
/// a mock file) entirely behind this trait.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Human-readable provider name for status display.
    fn name(&self) -> &str;

    /// Model identifier as reported to users.
    fn model_name(&self) -> &str;

    /// Send a completion request and return the full response.
    ///
    /// `cancel` is honored cooperatively: an implementation backed by an
    /// HTTP call races the request against `cancel.cancelled()` and returns
    /// `Err` promptly when the token fires mid-call.
    async fn complete(
        &self,
        req: CompletionRequest,
        cancel: CancellationToken,
    ) -> anyhow::Result<CompletionResponse>;
}
