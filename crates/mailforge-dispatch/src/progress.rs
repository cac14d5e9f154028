// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign progress queries.

use std::sync::Arc;

use mailforge_core::types::{Campaign, CampaignId, ProgressView};
use mailforge_core::{CampaignStore, MailforgeError};

/// Read-side view over the campaign store.
///
/// Missing and expired campaigns produce the `not_found` sentinel rather
/// than an error: pollers should not distinguish "never existed" from
/// "expired" from "not yet written".
pub struct ProgressReporter {
    store: Arc<dyn CampaignStore>,
}

impl ProgressReporter {
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Percent-complete view for one campaign.
    pub async fn query(&self, campaign_id: &CampaignId) -> Result<ProgressView, MailforgeError> {
        Ok(self
            .store
            .get(campaign_id)
            .await?
            .as_ref()
            .map(ProgressView::from_campaign)
            .unwrap_or_else(ProgressView::not_found))
    }

    /// Full aggregate, for detail responses. `None` when missing/expired.
    pub async fn campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Option<Campaign>, MailforgeError> {
        self.store.get(campaign_id).await
    }

    /// All unexpired campaigns owned by a user, newest first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Campaign>, MailforgeError> {
        self.store.list_by_user(user_id).await
    }
}
