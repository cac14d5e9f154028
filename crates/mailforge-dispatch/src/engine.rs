// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential campaign dispatch engine.
//!
//! One `dispatch` call processes one campaign end to end: quota check,
//! transport verification, campaign creation, then a strictly ordered send
//! loop with a fixed stagger between recipients. A recipient failure never
//! aborts the batch; only pre-batch conditions (quota, verification) do.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mailforge_config::model::DispatchConfig;
use mailforge_core::types::{
    Campaign, CampaignId, CampaignStatus, DeliveryOutcome, DispatchResult, MailBody, OutboundEmail,
    Plan,
};
use mailforge_core::{CampaignStore, MailTransport, MailforgeError, UsageLedger};

use crate::{filter, quota};

/// Builds one transport per dispatch call.
///
/// A transport is bound to a single relay session's worth of credentials
/// and is dropped when the call completes, so the engine never holds relay
/// state between campaigns.
pub trait TransportFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn MailTransport>, MailforgeError>;
}

/// One campaign dispatch request.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub user_id: i64,
    pub campaign_name: String,
    /// Candidate recipients; filtered and de-duplicated by the engine.
    pub recipients: Vec<String>,
    pub mail_body: MailBody,
    /// Display name for the `From` header.
    pub sender_name: String,
    pub plan: Plan,
}

/// Result of a dispatch call plus the campaign it created.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub campaign_id: CampaignId,
    pub result: DispatchResult,
}

pub struct DispatchEngine {
    store: Arc<dyn CampaignStore>,
    ledger: Arc<dyn UsageLedger>,
    config: DispatchConfig,
}

impl DispatchEngine {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        ledger: Arc<dyn UsageLedger>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Dispatch one campaign.
    ///
    /// Quota and verification failures return before any campaign record
    /// exists. Everything after campaign creation is tallied into the
    /// aggregate instead of returned as an error.
    pub async fn dispatch(
        &self,
        transport: &dyn MailTransport,
        request: &DispatchRequest,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, MailforgeError> {
        let recipients = filter::filter_recipients(&request.recipients);
        let total = recipients.len() as u32;
        let today = chrono::Utc::now().date_naive();

        quota::check_quota(
            self.ledger.as_ref(),
            request.user_id,
            today,
            request.plan,
            total,
        )
        .await?;

        transport
            .verify()
            .await
            .map_err(|e| MailforgeError::Config(format!("SMTP verification failed: {e}")))?;

        let mut campaign = Campaign::begin(
            CampaignId::mint(request.user_id),
            request.user_id,
            request.campaign_name.clone(),
            total,
        );
        // An empty batch has nothing left to do; never leave it processing.
        if total == 0 {
            campaign.status = CampaignStatus::Completed;
            campaign.completed_at = Some(chrono::Utc::now());
        }
        self.store.create(&campaign, &recipients).await?;
        let campaign_id = campaign.id.clone();

        info!(
            campaign_id = %campaign_id,
            user_id = request.user_id,
            total,
            "dispatch started"
        );

        let mut sent = 0u32;
        let mut failed = 0u32;
        let mut errors = Vec::new();

        for (index, recipient) in recipients.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(campaign_id = %campaign_id, index, "dispatch cancelled");
                break;
            }

            let email = OutboundEmail {
                from_name: request.sender_name.clone(),
                from_address: transport.sender_address().to_string(),
                to: recipient.clone(),
                subject: request.mail_body.subject.clone(),
                text: request.mail_body.description.clone(),
                html: request.mail_body.html_body.clone(),
            };

            let outcome = self
                .send_with_retries(transport, &campaign_id, index as u32, &email, cancel)
                .await;

            match outcome {
                Ok(receipt_id) => {
                    sent += 1;
                    self.record(
                        &campaign_id,
                        index as u32,
                        request.user_id,
                        today,
                        DeliveryOutcome::Sent,
                        Some(&receipt_id),
                    )
                    .await;
                }
                Err(e) => {
                    failed += 1;
                    let reason = e.to_string();
                    errors.push(format!("Failed to send to {recipient}: {reason}"));
                    warn!(campaign_id = %campaign_id, recipient = %recipient, error = %reason, "delivery failed");
                    self.record(
                        &campaign_id,
                        index as u32,
                        request.user_id,
                        today,
                        DeliveryOutcome::Failed,
                        Some(&reason),
                    )
                    .await;
                }
            }

            // Pace against relay rate limits before the next recipient.
            if index + 1 < recipients.len() {
                let stagger = Duration::from_millis(self.config.stagger_ms);
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(stagger) => {}
                }
            }
        }

        let result = DispatchResult {
            success: sent > 0,
            sent,
            failed,
            total,
            errors,
        };
        info!(
            campaign_id = %campaign_id,
            sent = result.sent,
            failed = result.failed,
            total = result.total,
            "dispatch finished"
        );

        Ok(DispatchOutcome {
            campaign_id,
            result,
        })
    }

    /// Try one recipient up to `max_attempts` times with a fixed backoff.
    ///
    /// Returns the relay message id on success, the last error otherwise.
    async fn send_with_retries(
        &self,
        transport: &dyn MailTransport,
        campaign_id: &CampaignId,
        sequence_index: u32,
        email: &OutboundEmail,
        cancel: &CancellationToken,
    ) -> Result<String, MailforgeError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match transport.send(email).await {
                Ok(receipt) => return Ok(receipt.message_id),
                Err(e) => {
                    warn!(
                        campaign_id = %campaign_id,
                        recipient = %email.to,
                        attempt,
                        error = %e,
                        "send attempt failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                if let Err(e) = self.store.note_attempt(campaign_id, sequence_index).await {
                    warn!(campaign_id = %campaign_id, error = %e, "failed to record attempt");
                }
                if cancel.is_cancelled() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| MailforgeError::Internal(
            "send loop produced no attempts".to_string(),
        )))
    }

    /// Persist one outcome to the store and the usage ledger.
    ///
    /// Bookkeeping failures are logged and swallowed: they must never
    /// change a send's classification.
    async fn record(
        &self,
        campaign_id: &CampaignId,
        sequence_index: u32,
        user_id: i64,
        date: chrono::NaiveDate,
        outcome: DeliveryOutcome,
        detail: Option<&str>,
    ) {
        if let Err(e) = self
            .store
            .record_outcome(campaign_id, sequence_index, outcome, detail)
            .await
        {
            warn!(campaign_id = %campaign_id, sequence_index, error = %e, "failed to record outcome");
        }
        if let Err(e) = self.ledger.record(user_id, date, outcome).await {
            warn!(user_id, error = %e, "failed to update usage ledger");
        }
    }
}
