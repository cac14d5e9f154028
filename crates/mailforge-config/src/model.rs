// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mailforge outreach platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mailforge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values —
/// except SMTP credentials, which have no default and must come from config
/// or environment (never source literals).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailforgeConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound SMTP relay settings.
    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Groq API settings for address/content generation.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dispatch pacing, timeout, and retry settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Quota enforcement settings.
    #[serde(default)]
    pub quota: QuotaConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the gateway to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the gateway to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound SMTP relay configuration.
///
/// Credentials are injected from config files or `MAILFORGE_SMTP_*`
/// environment variables. `Debug` redacts the password.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    /// Relay hostname.
    #[serde(default = "default_smtp_host")]
    pub host: String,

    /// Relay port (587 for STARTTLS submission).
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Account username; also the verified sender address.
    #[serde(default)]
    pub username: Option<String>,

    /// Account password or app password.
    #[serde(default)]
    pub password: Option<String>,

    /// Display name used in the `From` header.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: None,
            password: None,
            sender_name: default_sender_name(),
        }
    }
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_name() -> String {
    "Mailforge".to_string()
}

/// Groq API configuration for LLM-backed generation.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// Groq API key. `None` disables generation; callers fall back to
    /// deterministic templates.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for both address and content generation.
    #[serde(default = "default_groq_model")]
    pub model: String,

    /// Maximum tokens per completion.
    #[serde(default = "default_groq_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_groq_model(),
            max_tokens: default_groq_max_tokens(),
        }
    }
}

impl std::fmt::Debug for GroqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_groq_max_tokens() -> u32 {
    1000
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mailforge").join("mailforge.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mailforge.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Dispatch pacing, timeout, and retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Cooperative delay between successive sends, in milliseconds.
    /// Pacing against upstream rate limits, not a per-message timeout.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,

    /// Bound on each transport send call, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Bound on the pre-batch connectivity verification, in seconds.
    #[serde(default = "default_verify_timeout_secs")]
    pub verify_timeout_secs: u64,

    /// Attempts per recipient before the delivery is tallied as failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between retry attempts for one recipient, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            stagger_ms: default_stagger_ms(),
            send_timeout_secs: default_send_timeout_secs(),
            verify_timeout_secs: default_verify_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_stagger_ms() -> u64 {
    1000
}

fn default_send_timeout_secs() -> u64 {
    8
}

fn default_verify_timeout_secs() -> u64 {
    8
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

/// Quota enforcement configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Plan tier of this deployment's user: FREE, STANDARD, or PREMIUM.
    #[serde(default = "default_plan")]
    pub plan: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            plan: default_plan(),
        }
    }
}

fn default_plan() -> String {
    "FREE".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: MailforgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8420);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.dispatch.stagger_ms, 1000);
        assert_eq!(config.quota.plan, "FREE");
    }

    #[test]
    fn strict_deserialization_rejects_unknown_keys() {
        let result = toml::from_str::<MailforgeConfig>(
            r#"
            [smtp]
            hostt = "typo.example.com"
            "#,
        );
        assert!(result.is_err());
    }
}
