// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
pub mod registry;
mod types;
mod provider;
mod openai;
mod mock;

pub use types::*;
pub use provider::ModelProvider;
pub use openai::OpenAiProvider;
pub use mock::{MockProvider, ScriptedMockProvider, ScriptedResponse};
pub use registry::{DriverMeta, get_driver, list_drivers};

use anyhow::bail;
use pigo_config::ModelConfig;

/// Construct a boxed [`ModelProvider`] from configuration.
///
/// Selects the driver implementation based on `cfg.provider`. `/model <name>`
/// resolves against [`resolve_model_cfg`] before reaching here.
pub fn from_config(cfg: &ModelConfig) -> anyhow::Result<Box<dyn ModelProvider>> {
    match cfg.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiProvider::new(
            cfg.name.clone(),
            resolve_api_key(cfg),
            cfg.base_url.clone(),
            cfg.max_tokens,
            cfg.temperature,
        ))),
        "mock" => Ok(Box::new(MockProvider)),
        other => {
            let known: Vec<&str> = registry::known_driver_ids().collect();
            bail!(
                "unknown model provider: {other:?}\nKnown providers: {known}",
                known = known.join(", ")
            )
        }
    }
}

fn resolve_api_key(cfg: &ModelConfig) -> Option<String> {
    if let Some(k) = &cfg.api_key {
        return Some(k.clone());
    }
    if let Some(env) = &cfg.api_key_env {
        return std::env::var(env).ok();
    }
    if let Some(meta) = registry::get_driver(&cfg.provider) {
        if let Some(env_var) = meta.default_api_key_env {
            return std::env::var(env_var).ok();
        }
    }
    None
}

/// Build a [`ModelConfig`] by applying `override_str` on top of `base`, for
/// the `/model <name>` REPL command.
///
/// - `"provider/model"` → sets both provider and name.
/// - a bare registered provider id → changes provider, keeps model name.
/// - any other bare string → changes model name, keeps provider.
///
/// When the provider changes, inherited `api_key`/`api_key_env` are cleared
/// so the new provider's default credential lookup applies.
pub fn resolve_model_cfg(base: &ModelConfig, override_str: &str) -> ModelConfig {
    let mut cfg = base.clone();
    let provider_changed;
    if let Some((provider, model)) = override_str.split_once('/') {
        provider_changed = provider != base.provider;
        cfg.provider = provider.to_string();
        cfg.name = model.to_string();
    } else if get_driver(override_str).is_some() {
        provider_changed = override_str != base.provider;
        cfg.provider = override_str.to_string();
    } else {
        cfg.name = override_str.to_string();
        provider_changed = false;
    }
    if provider_changed {
        cfg.api_key = None;
        cfg.api_key_env = None;
    }
    cfg
}
