// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily usage ledger queries.
//!
//! One row per `(user_id, date)` with integer counters, created lazily on
//! the first outcome of the day via an upsert.

use mailforge_core::types::{DailyUsage, DeliveryOutcome};
use mailforge_core::MailforgeError;
use rusqlite::params;

use crate::database::Database;

/// Today's usage for a user; zeros when no record exists yet.
pub async fn usage_for_day(
    db: &Database,
    user_id: i64,
    date: chrono::NaiveDate,
) -> Result<DailyUsage, MailforgeError> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let counts = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT sent_count, failed_count FROM usage_ledger
                 WHERE user_id = ?1 AND date = ?2",
                params![user_id, date_str],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    let (sent_count, failed_count) = counts.unwrap_or((0, 0));
    Ok(DailyUsage {
        user_id,
        date,
        sent_count: sent_count as u32,
        failed_count: failed_count as u32,
    })
}

/// Atomically increment the counter matching `outcome` for the day.
pub async fn record(
    db: &Database,
    user_id: i64,
    date: chrono::NaiveDate,
    outcome: DeliveryOutcome,
) -> Result<(), MailforgeError> {
    let date_str = date.format("%Y-%m-%d").to_string();
    db.connection()
        .call(move |conn| {
            match outcome {
                DeliveryOutcome::Sent => conn.execute(
                    "INSERT INTO usage_ledger (user_id, date, sent_count, failed_count)
                     VALUES (?1, ?2, 1, 0)
                     ON CONFLICT (user_id, date)
                     DO UPDATE SET sent_count = sent_count + 1",
                    params![user_id, date_str],
                )?,
                DeliveryOutcome::Failed => conn.execute(
                    "INSERT INTO usage_ledger (user_id, date, sent_count, failed_count)
                     VALUES (?1, ?2, 0, 1)
                     ON CONFLICT (user_id, date)
                     DO UPDATE SET failed_count = failed_count + 1",
                    params![user_id, date_str],
                )?,
            };
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn ledger_is_lazy_and_accumulates() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("usage_test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        let today = chrono::Utc::now().date_naive();

        // No row yet: zeros.
        let usage = usage_for_day(&db, 5, today).await.unwrap();
        assert_eq!((usage.sent_count, usage.failed_count), (0, 0));

        record(&db, 5, today, DeliveryOutcome::Sent).await.unwrap();
        record(&db, 5, today, DeliveryOutcome::Sent).await.unwrap();
        record(&db, 5, today, DeliveryOutcome::Failed).await.unwrap();

        let usage = usage_for_day(&db, 5, today).await.unwrap();
        assert_eq!((usage.sent_count, usage.failed_count), (2, 1));

        // Different day and different user are independent rows.
        let yesterday = today.pred_opt().unwrap();
        let usage = usage_for_day(&db, 5, yesterday).await.unwrap();
        assert_eq!(usage.sent_count, 0);
        let usage = usage_for_day(&db, 6, today).await.unwrap();
        assert_eq!(usage.sent_count, 0);

        db.close().await.unwrap();
    }
}
