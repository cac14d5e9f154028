// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign state store operations.
//!
//! Campaign aggregates live in the `campaign_kv` table as JSON values under
//! `campaign:<id>` keys with a 24-hour expiry refreshed on every write.
//! All mutations run inside a transaction on the single writer thread, so
//! read-modify-write cycles cannot lose updates.

use mailforge_core::types::{Campaign, CampaignId, CampaignStatus, DeliveryOutcome};
use mailforge_core::MailforgeError;
use rusqlite::params;
use tracing::debug;

use crate::database::Database;

/// Key prefix for campaign aggregates.
const KEY_PREFIX: &str = "campaign:";

/// Retention window for campaign records: 24 hours, refreshed on write.
const TTL_SECS: i64 = 86_400;

fn kv_key(campaign_id: &CampaignId) -> String {
    format!("{KEY_PREFIX}{campaign_id}")
}

fn json_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

/// SQL expression for "now plus the retention window".
fn expiry_expr() -> String {
    format!("strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+{TTL_SECS} seconds')")
}

/// Store a fresh campaign aggregate and seed one delivery job per recipient.
///
/// Runs as one transaction: either the campaign record and every job row
/// exist, or none do.
pub async fn create(
    db: &Database,
    campaign: &Campaign,
    recipients: &[String],
) -> Result<(), MailforgeError> {
    let key = kv_key(&campaign.id);
    let campaign_id = campaign.id.0.clone();
    let user_id = campaign.user_id;
    let value = serde_json::to_string(campaign).map_err(|e| MailforgeError::Storage {
        source: Box::new(e),
    })?;
    let recipients = recipients.to_vec();
    let expiry = expiry_expr();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            // Opportunistic purge keeps expired aggregates from lingering.
            // Job rows go first so purged campaigns leave no orphans behind.
            tx.execute(
                &format!(
                    "DELETE FROM delivery_jobs
                     WHERE '{KEY_PREFIX}' || campaign_id IN (
                         SELECT key FROM campaign_kv
                         WHERE expires_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))"
                ),
                [],
            )?;
            tx.execute(
                "DELETE FROM campaign_kv
                 WHERE expires_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                [],
            )?;
            tx.execute(
                &format!(
                    "INSERT INTO campaign_kv (key, value, user_id, expires_at)
                     VALUES (?1, ?2, ?3, {expiry})"
                ),
                params![key, value, user_id],
            )?;
            for (index, recipient) in recipients.iter().enumerate() {
                tx.execute(
                    "INSERT INTO delivery_jobs (campaign_id, sequence_index, recipient)
                     VALUES (?1, ?2, ?3)",
                    params![campaign_id, index as i64, recipient],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply one recipient outcome to the campaign aggregate.
///
/// The `(campaign_id, sequence_index)` job row is the idempotency guard:
/// when the job already holds a terminal state, the aggregate is returned
/// unchanged. Otherwise the job is resolved, the matching counter is
/// incremented, and the campaign transitions to `completed` (setting
/// `completed_at`) exactly once, when `sent + failed` first reaches `total`.
pub async fn record_outcome(
    db: &Database,
    campaign_id: &CampaignId,
    sequence_index: u32,
    outcome: DeliveryOutcome,
    detail: Option<&str>,
) -> Result<Campaign, MailforgeError> {
    let key = kv_key(campaign_id);
    let id = campaign_id.0.clone();
    let detail = detail.map(str::to_string);
    let expiry = expiry_expr();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let terminal: Option<Option<String>> = tx
                .query_row(
                    "SELECT terminal_state FROM delivery_jobs
                     WHERE campaign_id = ?1 AND sequence_index = ?2",
                    params![id, sequence_index as i64],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;

            let Some(terminal) = terminal else {
                return Err(rusqlite::Error::ToSqlConversionFailure(
                    format!("no delivery job for {id}#{sequence_index}").into(),
                ));
            };

            let mut campaign: Campaign = {
                let value: String = tx.query_row(
                    "SELECT value FROM campaign_kv
                     WHERE key = ?1 AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![key],
                    |row| row.get(0),
                )?;
                serde_json::from_str(&value).map_err(json_err)?
            };

            if terminal.is_some() {
                // Replayed outcome for an already-resolved job: no-op.
                tx.commit()?;
                return Ok(campaign);
            }

            match outcome {
                DeliveryOutcome::Sent => {
                    tx.execute(
                        "UPDATE delivery_jobs
                         SET terminal_state = 'sent', message_id = ?3,
                             attempts = attempts + 1,
                             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE campaign_id = ?1 AND sequence_index = ?2",
                        params![id, sequence_index as i64, detail],
                    )?;
                    campaign.sent += 1;
                }
                DeliveryOutcome::Failed => {
                    tx.execute(
                        "UPDATE delivery_jobs
                         SET terminal_state = 'failed', last_error = ?3,
                             attempts = attempts + 1,
                             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE campaign_id = ?1 AND sequence_index = ?2",
                        params![id, sequence_index as i64, detail],
                    )?;
                    campaign.failed += 1;
                }
            }

            if campaign.sent + campaign.failed >= campaign.total
                && campaign.status != CampaignStatus::Completed
            {
                campaign.status = CampaignStatus::Completed;
                campaign.completed_at = Some(chrono::Utc::now());
            }

            let value = serde_json::to_string(&campaign).map_err(json_err)?;
            tx.execute(
                &format!("UPDATE campaign_kv SET value = ?2, expires_at = {expiry} WHERE key = ?1"),
                params![key, value],
            )?;
            tx.commit()?;
            Ok(campaign)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a campaign aggregate; `None` when missing or expired.
pub async fn get(
    db: &Database,
    campaign_id: &CampaignId,
) -> Result<Option<Campaign>, MailforgeError> {
    let key = kv_key(campaign_id);
    db.connection()
        .call(move |conn| {
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM campaign_kv
                     WHERE key = ?1 AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                    params![key],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            match value {
                Some(value) => Ok(Some(serde_json::from_str(&value).map_err(json_err)?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All unexpired campaigns for a user, newest first.
pub async fn list_by_user(db: &Database, user_id: i64) -> Result<Vec<Campaign>, MailforgeError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT value FROM campaign_kv
                 WHERE user_id = ?1 AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            )?;
            let values = stmt
                .query_map(params![user_id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            let mut campaigns = values
                .iter()
                .map(|v| serde_json::from_str::<Campaign>(v).map_err(json_err))
                .collect::<Result<Vec<_>, _>>()?;
            campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(campaigns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark campaigns still `processing` as `failed`.
///
/// Startup recovery: a previous process died mid-batch, so the aggregate
/// can never resolve on its own. Marking it failed keeps pollers from
/// seeing a stale `processing` status until TTL expiry.
pub async fn fail_interrupted(db: &Database) -> Result<u32, MailforgeError> {
    let expiry = expiry_expr();
    let failed = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let rows: Vec<(String, String)> = {
                let mut stmt = tx.prepare(
                    "SELECT key, value FROM campaign_kv
                     WHERE expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                )?;
                let rows = stmt
                    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            let mut count = 0u32;
            for (key, value) in rows {
                let mut campaign: Campaign = serde_json::from_str(&value).map_err(json_err)?;
                if campaign.status != CampaignStatus::Processing {
                    continue;
                }
                campaign.status = CampaignStatus::Failed;
                let value = serde_json::to_string(&campaign).map_err(json_err)?;
                tx.execute(
                    &format!(
                        "UPDATE campaign_kv SET value = ?2, expires_at = {expiry} WHERE key = ?1"
                    ),
                    params![key, value],
                )?;
                count += 1;
            }
            tx.commit()?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if failed > 0 {
        debug!(failed, "marked interrupted campaigns as failed");
    }
    Ok(failed)
}
