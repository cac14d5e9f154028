// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for the LLM-backed generation collaborators.
//!
//! Generation lives outside the dispatch core; the core only consumes the
//! resulting strings and must not trust them blindly (candidate addresses
//! are filtered and de-duplicated before dispatch).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MailforgeError;
use crate::types::MailBody;

/// Parameters for email copy generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentParams {
    pub purpose: String,
    pub recipient_type: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub call_to_action: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub target_domain: Option<String>,
}

/// Produces candidate recipient addresses from a name/domain pattern.
#[async_trait]
pub trait AddressGenerator: Send + Sync {
    /// Roughly ten candidates following common corporate address patterns.
    /// Callers must de-duplicate and syntactically filter the result.
    async fn generate_addresses(
        &self,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<Vec<String>, MailforgeError>;
}

/// Produces email copy for a campaign.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate `{subject, description, html_body}` for the campaign.
    ///
    /// Implementations must fall back to a deterministic template when the
    /// upstream call fails or returns an unparsable result; generation
    /// failure is never fatal to dispatch.
    async fn generate_content(&self, params: &ContentParams) -> Result<MailBody, MailforgeError>;
}

#[cfg(test)]
mod tests {
    #[test]
    fn content_params_available_at_traits_root() {
        // Downstream crates import this type via `traits::ContentParams`.
        let params = crate::traits::ContentParams {
            purpose: "introductions".into(),
            ..Default::default()
        };
        assert!(params.key_points.is_empty());
    }
}
