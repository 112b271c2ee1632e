// Copyright (c) 2024-2026 Pigo Contributors
//
// SPDX-License-Identifier: Apache-2.0
//! Driver registry: static metadata for every supported model provider.

/// Metadata describing a registered model driver.
#[derive(Debug, Clone)]
pub struct DriverMeta {
    /// Unique provider id used in `model.provider` config field (e.g. `"openai"`).
    pub id: &'static str,
    /// Human-readable display name (e.g. `"OpenAI"`).
    pub name: &'static str,
    /// One-line description shown in the `/model` help text.
    pub description: &'static str,
    /// Default environment variable that holds the API key.
    /// `None` for providers that require no key.
    pub default_api_key_env: Option<&'static str>,
    /// Default base URL when the user does not set `model.base_url` in config.
    pub default_base_url: Option<&'static str>,
    /// Whether an explicit API key is required.
    pub requires_api_key: bool,
}

/// Complete registry of supported drivers.
pub static DRIVERS: &[DriverMeta] = &[
    DriverMeta {
        id: "openai",
        name: "OpenAI",
        description: "OpenAI-compatible chat completions endpoint",
        default_api_key_env: Some("OPENAI_API_KEY"),
        default_base_url: Some("https://api.openai.com/v1"),
        requires_api_key: true,
    },
    DriverMeta {
        id: "mock",
        name: "Mock",
        description: "Mock driver for tests (no network, echoes input)",
        default_api_key_env: None,
        default_base_url: None,
        requires_api_key: false,
    },
];

/// Returns all registered drivers in declaration order.
pub fn list_drivers() -> &'static [DriverMeta] {
    DRIVERS
}

/// Look up a driver by its id. Returns `None` for unknown ids.
pub fn get_driver(id: &str) -> Option<&'static DriverMeta> {
    DRIVERS.iter().find(|d| d.id == id)
}

/// Returns an iterator over all known driver ids.
pub fn known_driver_ids() -> impl Iterator<Item = &'static str> {
    DRIVERS.iter().map(|d| d.id)
}
