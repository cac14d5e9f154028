// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities that are not part of the core model.

/// One delivery job row, the per-recipient unit of work within a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryJobRecord {
    pub campaign_id: String,
    pub sequence_index: u32,
    pub recipient: String,
    pub attempts: u32,
    /// `sent`, `failed`, or `None` while unresolved.
    pub terminal_state: Option<String>,
    pub last_error: Option<String>,
    pub message_id: Option<String>,
    pub scheduled_at: String,
    pub updated_at: String,
}
