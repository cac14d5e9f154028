// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CampaignStore and UsageLedger traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use mailforge_config::model::StorageConfig;
use mailforge_core::types::{Campaign, CampaignId, DailyUsage, DeliveryOutcome};
use mailforge_core::{CampaignStore, MailforgeError, UsageLedger};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store for campaign aggregates, delivery jobs, and the
/// daily usage ledger.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`SqliteStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new store with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: SqliteStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database, apply PRAGMAs, and run migrations.
    pub async fn initialize(&self) -> Result<(), MailforgeError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MailforgeError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// Checkpoint the WAL before shutdown.
    pub async fn close(&self) -> Result<(), MailforgeError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }

    fn db(&self) -> Result<&Database, MailforgeError> {
        self.db.get().ok_or_else(|| MailforgeError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Delivery job rows for a campaign, in sequence order.
    pub async fn jobs_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<crate::models::DeliveryJobRecord>, MailforgeError> {
        queries::jobs::jobs_for_campaign(self.db()?, &campaign_id.0).await
    }

}

#[async_trait]
impl CampaignStore for SqliteStore {
    async fn create(
        &self,
        campaign: &Campaign,
        recipients: &[String],
    ) -> Result<(), MailforgeError> {
        queries::campaigns::create(self.db()?, campaign, recipients).await
    }

    async fn record_outcome(
        &self,
        campaign_id: &CampaignId,
        sequence_index: u32,
        outcome: DeliveryOutcome,
        detail: Option<&str>,
    ) -> Result<Campaign, MailforgeError> {
        queries::campaigns::record_outcome(self.db()?, campaign_id, sequence_index, outcome, detail)
            .await
    }

    async fn note_attempt(
        &self,
        campaign_id: &CampaignId,
        sequence_index: u32,
    ) -> Result<(), MailforgeError> {
        queries::jobs::bump_attempts(self.db()?, &campaign_id.0, sequence_index).await
    }

    async fn get(&self, campaign_id: &CampaignId) -> Result<Option<Campaign>, MailforgeError> {
        queries::campaigns::get(self.db()?, campaign_id).await
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Campaign>, MailforgeError> {
        queries::campaigns::list_by_user(self.db()?, user_id).await
    }

    async fn fail_interrupted(&self) -> Result<u32, MailforgeError> {
        queries::campaigns::fail_interrupted(self.db()?).await
    }
}

#[async_trait]
impl UsageLedger for SqliteStore {
    async fn usage_for_day(
        &self,
        user_id: i64,
        date: chrono::NaiveDate,
    ) -> Result<DailyUsage, MailforgeError> {
        queries::usage::usage_for_day(self.db()?, user_id, date).await
    }

    async fn record(
        &self,
        user_id: i64,
        date: chrono::NaiveDate,
        outcome: DeliveryOutcome,
    ) -> Result<(), MailforgeError> {
        queries::usage::record(self.db()?, user_id, date, outcome).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("no_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        let result = store.get(&CampaignId("campaign_1_1".into())).await;
        assert!(result.is_err(), "get should fail before initialize");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err());
    }

    #[tokio::test]
    async fn full_campaign_lifecycle_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::new(make_config(db_path.to_str().unwrap()));
        store.initialize().await.unwrap();

        let campaign = Campaign::begin(CampaignId::mint(11), 11, "launch".into(), 2);
        let recipients = vec!["x@example.com".to_string(), "y@example.com".to_string()];
        store.create(&campaign, &recipients).await.unwrap();

        store
            .record_outcome(&campaign.id, 0, DeliveryOutcome::Sent, Some("<id0>"))
            .await
            .unwrap();
        let today = chrono::Utc::now().date_naive();
        store.record(11, today, DeliveryOutcome::Sent).await.unwrap();

        let after = store
            .record_outcome(&campaign.id, 1, DeliveryOutcome::Failed, Some("bounced"))
            .await
            .unwrap();
        store.record(11, today, DeliveryOutcome::Failed).await.unwrap();

        assert_eq!((after.sent, after.failed, after.total), (1, 1, 2));
        assert_eq!(
            after.status,
            mailforge_core::CampaignStatus::Completed
        );

        let usage = store.usage_for_day(11, today).await.unwrap();
        assert_eq!((usage.sent_count, usage.failed_count), (1, 1));

        let jobs = store.jobs_for_campaign(&campaign.id).await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].message_id.as_deref(), Some("<id0>"));
        assert_eq!(jobs[1].last_error.as_deref(), Some("bounced"));

        store.close().await.unwrap();
    }
}
