// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch service lifecycle.
//!
//! One [`DispatchService`] owns the engine, the progress reporter, and the
//! generation collaborators. The binary constructs it, calls [`start`],
//! injects it into the gateway, and calls [`stop`] on shutdown. There are
//! no global singletons or init flags.
//!
//! [`start`]: DispatchService::start
//! [`stop`]: DispatchService::stop

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use mailforge_config::model::DispatchConfig;
use mailforge_core::traits::{AddressGenerator, ContentGenerator, ContentParams};
use mailforge_core::types::{Campaign, CampaignId, MailBody, Plan, ProgressView};
use mailforge_core::{CampaignStore, MailforgeError, UsageLedger};

use crate::engine::{DispatchEngine, DispatchOutcome, DispatchRequest, TransportFactory};
use crate::progress::ProgressReporter;

pub struct DispatchService {
    engine: DispatchEngine,
    reporter: ProgressReporter,
    store: Arc<dyn CampaignStore>,
    transports: Arc<dyn TransportFactory>,
    addresses: Arc<dyn AddressGenerator>,
    content: Arc<dyn ContentGenerator>,
    plan: Plan,
    sender_name: String,
    cancel: CancellationToken,
}

impl DispatchService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn CampaignStore>,
        ledger: Arc<dyn UsageLedger>,
        transports: Arc<dyn TransportFactory>,
        addresses: Arc<dyn AddressGenerator>,
        content: Arc<dyn ContentGenerator>,
        config: DispatchConfig,
        plan: Plan,
        sender_name: String,
    ) -> Self {
        Self {
            engine: DispatchEngine::new(store.clone(), ledger, config),
            reporter: ProgressReporter::new(store.clone()),
            store,
            transports,
            addresses,
            content,
            plan,
            sender_name,
            cancel: CancellationToken::new(),
        }
    }

    /// Recover from a previous process before accepting work.
    ///
    /// Campaigns left `processing` by a crash are marked `failed` so status
    /// pollers never see a stale `processing` forever.
    pub async fn start(&self) -> Result<(), MailforgeError> {
        let recovered = self.store.fail_interrupted().await?;
        if recovered > 0 {
            info!(recovered, "marked interrupted campaigns as failed");
        }
        info!("dispatch service started");
        Ok(())
    }

    /// Signal in-flight dispatch loops to stop at the next recipient
    /// boundary.
    pub fn stop(&self) {
        self.cancel.cancel();
        info!("dispatch service stopping");
    }

    /// Dispatch one campaign with a freshly built transport.
    pub async fn dispatch(
        &self,
        user_id: i64,
        campaign_name: String,
        recipients: Vec<String>,
        mail_body: MailBody,
    ) -> Result<DispatchOutcome, MailforgeError> {
        let transport = self.transports.create()?;
        let request = DispatchRequest {
            user_id,
            campaign_name,
            recipients,
            mail_body,
            sender_name: self.sender_name.clone(),
            plan: self.plan,
        };
        self.engine
            .dispatch(transport.as_ref(), &request, &self.cancel.child_token())
            .await
    }

    /// Candidate recipient addresses from the generation boundary.
    pub async fn generate_addresses(
        &self,
        first_name: &str,
        last_name: &str,
        domain: &str,
    ) -> Result<Vec<String>, MailforgeError> {
        self.addresses
            .generate_addresses(first_name, last_name, domain)
            .await
    }

    /// Campaign copy from the generation boundary (falls back internally).
    pub async fn generate_content(
        &self,
        params: &ContentParams,
    ) -> Result<MailBody, MailforgeError> {
        self.content.generate_content(params).await
    }

    pub async fn progress(&self, campaign_id: &CampaignId) -> Result<ProgressView, MailforgeError> {
        self.reporter.query(campaign_id).await
    }

    pub async fn campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Option<Campaign>, MailforgeError> {
        self.reporter.campaign(campaign_id).await
    }

    pub async fn list_campaigns(&self, user_id: i64) -> Result<Vec<Campaign>, MailforgeError> {
        self.reporter.list(user_id).await
    }
}
