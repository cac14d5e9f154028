// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mailforge outreach platform.

use thiserror::Error;

/// The primary error type used across all Mailforge crates.
///
/// Fatal pre-batch conditions (`Config`, `QuotaExceeded`) abort a dispatch
/// call before any send is attempted. Per-recipient conditions (`Transport`)
/// are tallied into the campaign aggregate and never abort the batch.
/// `Storage` failures during outcome bookkeeping are logged by the dispatch
/// engine and never change a send's classification.
#[derive(Debug, Error)]
pub enum MailforgeError {
    /// Configuration errors (missing SMTP credentials, invalid TOML,
    /// failed transport verification). Fatal before any send.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested batch would exceed the user's daily plan cap.
    /// Fatal before any send; no campaign record is created.
    #[error("daily email limit exceeded: {sent_today} sent of {limit}, {requested} requested ({remaining} remaining)")]
    QuotaExceeded {
        limit: u32,
        sent_today: u32,
        requested: u32,
        remaining: u32,
    },

    /// A send attempt failed for one recipient (network, auth, rejected
    /// address, timeout). Non-fatal; tallied as a failed delivery.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM generation failed (API failure, unparsable completion).
    /// Triggers the deterministic fallback; never fatal to dispatch.
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure,
    /// serialization of stored campaign state).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MailforgeError {
    /// True for errors that must abort a dispatch call before any send.
    pub fn is_fatal_for_dispatch(&self) -> bool {
        matches!(
            self,
            MailforgeError::Config(_) | MailforgeError::QuotaExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_error_reports_remaining_allowance() {
        let err = MailforgeError::QuotaExceeded {
            limit: 50,
            sent_today: 45,
            requested: 10,
            remaining: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("45 sent of 50"), "got: {msg}");
        assert!(msg.contains("5 remaining"), "got: {msg}");
    }

    #[test]
    fn fatal_classification() {
        assert!(MailforgeError::Config("no creds".into()).is_fatal_for_dispatch());
        assert!(
            MailforgeError::QuotaExceeded {
                limit: 50,
                sent_today: 50,
                requested: 1,
                remaining: 0,
            }
            .is_fatal_for_dispatch()
        );
        assert!(
            !MailforgeError::Transport {
                message: "relay refused".into(),
                source: None,
            }
            .is_fatal_for_dispatch()
        );
        assert!(
            !MailforgeError::Storage {
                source: Box::new(std::io::Error::other("disk")),
            }
            .is_fatal_for_dispatch()
        );
    }
}
