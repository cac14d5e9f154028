// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mailforge.toml` > `~/.config/mailforge/mailforge.toml`
//! > `/etc/mailforge/mailforge.toml` with environment variable overrides via
//! the `MAILFORGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MailforgeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mailforge/mailforge.toml` (system-wide)
/// 3. `~/.config/mailforge/mailforge.toml` (user XDG config)
/// 4. `./mailforge.toml` (local directory)
/// 5. `MAILFORGE_*` environment variables
pub fn load_config() -> Result<MailforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailforgeConfig::default()))
        .merge(Toml::file("/etc/mailforge/mailforge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("mailforge/mailforge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("mailforge.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MailforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailforgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MailforgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailforgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MAILFORGE_SMTP_SENDER_NAME` must map
/// to `smtp.sender_name`, not `smtp.sender.name`.
fn env_provider() -> Env {
    Env::prefixed("MAILFORGE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: MAILFORGE_SMTP_PASSWORD -> "smtp_password"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("groq_", "groq.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("quota_", "quota.", 1);
        mapped.into()
    })
}
