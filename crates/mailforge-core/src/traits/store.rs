// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits for campaign state and the daily usage ledger.

use async_trait::async_trait;

use crate::error::MailforgeError;
use crate::types::{Campaign, CampaignId, DailyUsage, DeliveryOutcome};

/// Durable-ish key/value record of campaign aggregates.
///
/// Keys are `campaign:<id>` with a 24-hour expiry refreshed on every write
/// (not on read). After expiry, `get` returns `None` and status queries
/// report "not found" rather than "failed".
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Store a freshly created campaign aggregate and seed one delivery
    /// job per recipient, in list order.
    async fn create(&self, campaign: &Campaign, recipients: &[String])
    -> Result<(), MailforgeError>;

    /// Apply one recipient outcome to the aggregate.
    ///
    /// Read-modify-write: increments the matching counter, and transitions
    /// the status to `completed` (setting `completed_at`) exactly once,
    /// when `sent + failed` first reaches `total`. Idempotent per
    /// `(campaign_id, sequence_index)`: replaying an already-resolved job
    /// must not double-count.
    async fn record_outcome(
        &self,
        campaign_id: &CampaignId,
        sequence_index: u32,
        outcome: DeliveryOutcome,
        detail: Option<&str>,
    ) -> Result<Campaign, MailforgeError>;

    /// Record a non-terminal delivery attempt before a retry, so the job's
    /// attempt counter reflects every try and not just the terminal one.
    async fn note_attempt(
        &self,
        campaign_id: &CampaignId,
        sequence_index: u32,
    ) -> Result<(), MailforgeError>;

    /// Fetch a campaign aggregate; `None` when missing or expired.
    async fn get(&self, campaign_id: &CampaignId) -> Result<Option<Campaign>, MailforgeError>;

    /// All unexpired campaigns owned by a user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Campaign>, MailforgeError>;

    /// Mark campaigns left `processing` by a previous process as `failed`,
    /// so pollers never see a stale `processing` status forever. Called at
    /// service startup; returns the number of campaigns failed.
    async fn fail_interrupted(&self) -> Result<u32, MailforgeError>;
}

/// Per-user per-day counters of emails sent/failed.
///
/// Records are created lazily on the first outcome of the day. The dispatch
/// engine is the only writer; the quota check is a reader.
#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// Today's usage for a user; zeros when no record exists yet.
    async fn usage_for_day(
        &self,
        user_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<DailyUsage, MailforgeError>;

    /// Atomically increment the counter matching `outcome` for the day.
    async fn record(
        &self,
        user_id: i64,
        date: chrono::NaiveDate,
        outcome: DeliveryOutcome,
    ) -> Result<(), MailforgeError>;
}
