// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Mailforge crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a campaign, format `campaign_<user_id>_<epoch_ms>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl CampaignId {
    /// Mint a new campaign id for the given user at the current instant.
    pub fn mint(user_id: i64) -> Self {
        Self(format!("campaign_{user_id}_{}", chrono::Utc::now().timestamp_millis()))
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a campaign.
///
/// Transitions are monotonic: `pending -> processing -> completed`.
/// `failed` is reserved for engine-level aborts (e.g. a process restart
/// leaving the campaign unresolvable), never for individual recipient
/// failures, which are tallied instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Campaign aggregate as stored in the campaign state store.
///
/// Invariant: `sent + failed <= total` at all times, with equality exactly
/// when `status == Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub user_id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub total: u32,
    pub sent: u32,
    pub failed: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Campaign {
    /// A fresh campaign in `Processing` state covering `total` recipients.
    pub fn begin(id: CampaignId, user_id: i64, name: String, total: u32) -> Self {
        Self {
            id,
            user_id,
            name,
            status: CampaignStatus::Processing,
            total,
            sent: 0,
            failed: 0,
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }
}

/// Terminal resolution of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

/// The message content dispatched to every recipient of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailBody {
    /// Subject line; non-empty.
    pub subject: String,
    /// Plain-text body; non-empty.
    pub description: String,
    /// Optional rendered HTML. When absent, the plain text is used for
    /// both MIME parts.
    #[serde(default)]
    pub html_body: Option<String>,
}

/// One outbound message handed to a [`crate::MailTransport`].
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Receipt returned by a transport on successful delivery handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Message identifier assigned by the relay, when it provides one.
    pub message_id: String,
}

/// Aggregate result of one dispatch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// True when at least one recipient was delivered.
    pub success: bool,
    pub sent: u32,
    pub failed: u32,
    pub total: u32,
    /// One entry per failed recipient: "Failed to send to <addr>: <reason>".
    pub errors: Vec<String>,
}

/// Subscription plan tiers mapped to daily send caps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Standard,
    Premium,
}

impl Plan {
    /// Daily send cap for this tier.
    pub fn daily_limit(self) -> u32 {
        match self {
            Plan::Free => 50,
            Plan::Standard => 500,
            Plan::Premium => 2000,
        }
    }
}

/// Per-user, per-day delivery counters used for quota enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub user_id: i64,
    /// Day truncated to `YYYY-MM-DD`.
    pub date: chrono::NaiveDate,
    pub sent_count: u32,
    pub failed_count: u32,
}

/// Percent-complete view derived from campaign counters for polling clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    /// Campaign status, or the literal `"not_found"` sentinel when the
    /// campaign key has expired or never existed.
    pub status: String,
    /// 0..=100, rounded; 0 when `total == 0`.
    pub progress: u8,
    pub sent: u32,
    pub failed: u32,
    pub total: u32,
}

impl ProgressView {
    /// Sentinel for an expired or never-created campaign. Callers must
    /// treat this as "unknown", not as an error.
    pub fn not_found() -> Self {
        Self {
            status: "not_found".to_string(),
            progress: 0,
            sent: 0,
            failed: 0,
            total: 0,
        }
    }

    /// Derive the view from a stored campaign aggregate.
    pub fn from_campaign(campaign: &Campaign) -> Self {
        let progress = if campaign.total == 0 {
            0
        } else {
            let done = f64::from(campaign.sent + campaign.failed);
            (100.0 * done / f64::from(campaign.total)).round() as u8
        };
        Self {
            status: campaign.status.to_string(),
            progress,
            sent: campaign.sent,
            failed: campaign.failed,
            total: campaign.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn campaign_id_format() {
        let id = CampaignId::mint(42);
        assert!(id.0.starts_with("campaign_42_"), "got: {id}");
        let epoch: i64 = id.0.rsplit('_').next().unwrap().parse().unwrap();
        assert!(epoch > 0);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            CampaignStatus::Pending,
            CampaignStatus::Processing,
            CampaignStatus::Completed,
            CampaignStatus::Failed,
        ] {
            let s = status.to_string();
            assert_eq!(CampaignStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(CampaignStatus::Processing.to_string(), "processing");
    }

    #[test]
    fn plan_limits_match_pricing_table() {
        assert_eq!(Plan::Free.daily_limit(), 50);
        assert_eq!(Plan::Standard.daily_limit(), 500);
        assert_eq!(Plan::Premium.daily_limit(), 2000);
        assert_eq!(Plan::from_str("PREMIUM").unwrap(), Plan::Premium);
        assert_eq!(Plan::from_str("free").unwrap(), Plan::Free);
    }

    #[test]
    fn progress_rounds_and_clamps() {
        let mut campaign = Campaign::begin(CampaignId::mint(1), 1, "test".into(), 3);
        campaign.sent = 2;
        let view = ProgressView::from_campaign(&campaign);
        assert_eq!(view.progress, 67);
        assert_eq!(view.status, "processing");

        campaign.failed = 1;
        campaign.status = CampaignStatus::Completed;
        let view = ProgressView::from_campaign(&campaign);
        assert_eq!(view.progress, 100);
    }

    #[test]
    fn progress_zero_total_does_not_divide_by_zero() {
        let campaign = Campaign::begin(CampaignId::mint(1), 1, "empty".into(), 0);
        let view = ProgressView::from_campaign(&campaign);
        assert_eq!(view.progress, 0);
    }

    #[test]
    fn not_found_sentinel_is_all_zeros() {
        let view = ProgressView::not_found();
        assert_eq!(view.status, "not_found");
        assert_eq!((view.progress, view.sent, view.failed, view.total), (0, 0, 0, 0));
    }

    #[test]
    fn campaign_serializes_with_snake_case_status() {
        let campaign = Campaign::begin(CampaignId("campaign_1_1700000000000".into()), 1, "q3".into(), 5);
        let json = serde_json::to_string(&campaign).unwrap();
        assert!(json.contains("\"status\":\"processing\""), "got: {json}");
        let back: Campaign = serde_json::from_str(&json).unwrap();
        assert_eq!(back, campaign);
    }
}
