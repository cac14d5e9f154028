// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.
//!
//! Figment guarantees types and known keys; this module checks the values
//! themselves (ranges, cross-field requirements, parseable enums) and
//! collects every problem rather than stopping at the first.

use std::str::FromStr;

use mailforge_core::Plan;
use thiserror::Error;

use crate::model::MailforgeConfig;

/// A single configuration value error with the offending dotted key.
#[derive(Debug, Error)]
#[error("config `{key}`: {message}")]
pub struct ConfigError {
    pub key: String,
    pub message: String,
}

impl ConfigError {
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a loaded configuration, returning all problems found.
pub fn validate_config(config: &MailforgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.smtp.host.trim().is_empty() {
        errors.push(ConfigError::new("smtp.host", "must not be empty"));
    }
    if config.smtp.port == 0 {
        errors.push(ConfigError::new("smtp.port", "must be non-zero"));
    }
    // Credentials must arrive together: a username without a password (or
    // vice versa) is a misconfiguration, not a partial setup.
    match (&config.smtp.username, &config.smtp.password) {
        (Some(_), None) => errors.push(ConfigError::new(
            "smtp.password",
            "smtp.username is set but smtp.password is missing",
        )),
        (None, Some(_)) => errors.push(ConfigError::new(
            "smtp.username",
            "smtp.password is set but smtp.username is missing",
        )),
        _ => {}
    }
    if let Some(username) = &config.smtp.username
        && !username.contains('@')
    {
        errors.push(ConfigError::new(
            "smtp.username",
            "must be a full email address (used as the sender identity)",
        ));
    }

    if config.server.port == 0 {
        errors.push(ConfigError::new("server.port", "must be non-zero"));
    }
    if !matches!(
        config.server.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ConfigError::new(
            "server.log_level",
            format!(
                "unknown level {:?}; expected trace, debug, info, warn, or error",
                config.server.log_level
            ),
        ));
    }

    if config.dispatch.max_attempts == 0 {
        errors.push(ConfigError::new("dispatch.max_attempts", "must be at least 1"));
    }
    if config.dispatch.send_timeout_secs == 0 || config.dispatch.send_timeout_secs > 60 {
        errors.push(ConfigError::new(
            "dispatch.send_timeout_secs",
            "must be between 1 and 60",
        ));
    }
    if config.dispatch.verify_timeout_secs == 0 || config.dispatch.verify_timeout_secs > 60 {
        errors.push(ConfigError::new(
            "dispatch.verify_timeout_secs",
            "must be between 1 and 60",
        ));
    }

    if Plan::from_str(&config.quota.plan).is_err() {
        errors.push(ConfigError::new(
            "quota.plan",
            format!(
                "unknown plan {:?}; expected FREE, STANDARD, or PREMIUM",
                config.quota.plan
            ),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
