// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery job queries.
//!
//! Jobs are seeded by [`crate::queries::campaigns::create`] and resolved by
//! [`crate::queries::campaigns::record_outcome`]; this module provides the
//! read side used for retry accounting and diagnostics.

use mailforge_core::MailforgeError;
use rusqlite::params;

use crate::database::Database;
use crate::models::DeliveryJobRecord;

fn job_from_row(row: &rusqlite::Row<'_>) -> Result<DeliveryJobRecord, rusqlite::Error> {
    Ok(DeliveryJobRecord {
        campaign_id: row.get(0)?,
        sequence_index: row.get::<_, i64>(1)? as u32,
        recipient: row.get(2)?,
        attempts: row.get::<_, i64>(3)? as u32,
        terminal_state: row.get(4)?,
        last_error: row.get(5)?,
        message_id: row.get(6)?,
        scheduled_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// All jobs for a campaign in sequence order.
pub async fn jobs_for_campaign(
    db: &Database,
    campaign_id: &str,
) -> Result<Vec<DeliveryJobRecord>, MailforgeError> {
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT campaign_id, sequence_index, recipient, attempts, terminal_state,
                        last_error, message_id, scheduled_at, updated_at
                 FROM delivery_jobs
                 WHERE campaign_id = ?1
                 ORDER BY sequence_index ASC",
            )?;
            let jobs = stmt
                .query_map(params![campaign_id], job_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(jobs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a non-terminal attempt against a job (a retry is about to run).
pub async fn bump_attempts(
    db: &Database,
    campaign_id: &str,
    sequence_index: u32,
) -> Result<(), MailforgeError> {
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE delivery_jobs
                 SET attempts = attempts + 1,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE campaign_id = ?1 AND sequence_index = ?2",
                params![campaign_id, sequence_index as i64],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::campaigns;
    use mailforge_core::types::{Campaign, CampaignId, DeliveryOutcome};
    use tempfile::tempdir;

    #[tokio::test]
    async fn jobs_are_seeded_in_order_and_resolve() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("jobs_test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let campaign = Campaign::begin(CampaignId("campaign_3_1".into()), 3, "t".into(), 2);
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        campaigns::create(&db, &campaign, &recipients).await.unwrap();

        let jobs = jobs_for_campaign(&db, "campaign_3_1").await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].recipient, "a@example.com");
        assert_eq!(jobs[0].sequence_index, 0);
        assert!(jobs[0].terminal_state.is_none());
        assert_eq!(jobs[1].recipient, "b@example.com");

        bump_attempts(&db, "campaign_3_1", 1).await.unwrap();
        campaigns::record_outcome(
            &db,
            &campaign.id,
            1,
            DeliveryOutcome::Failed,
            Some("timed out"),
        )
        .await
        .unwrap();

        let jobs = jobs_for_campaign(&db, "campaign_3_1").await.unwrap();
        assert_eq!(jobs[1].terminal_state.as_deref(), Some("failed"));
        assert_eq!(jobs[1].last_error.as_deref(), Some("timed out"));
        assert_eq!(jobs[1].attempts, 2);

        db.close().await.unwrap();
    }
}
