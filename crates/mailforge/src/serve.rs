// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mailforge serve` command implementation.
//!
//! Wires the SQLite store, SMTP transport factory, Groq generators, and
//! the dispatch service together, then serves the HTTP gateway until a
//! shutdown signal arrives.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use mailforge_config::model::{DispatchConfig, MailforgeConfig, SmtpConfig};
use mailforge_core::types::Plan;
use mailforge_core::{CampaignStore, MailTransport, MailforgeError, UsageLedger};
use mailforge_dispatch::{DispatchService, TransportFactory};
use mailforge_gateway::GatewayState;
use mailforge_groq::{GroqAddressGenerator, GroqContentGenerator};
use mailforge_smtp::SmtpMailTransport;
use mailforge_storage::SqliteStore;

/// Builds one STARTTLS SMTP transport per dispatch call.
struct SmtpTransportFactory {
    smtp: SmtpConfig,
    dispatch: DispatchConfig,
}

impl TransportFactory for SmtpTransportFactory {
    fn create(&self) -> Result<Box<dyn MailTransport>, MailforgeError> {
        Ok(Box::new(SmtpMailTransport::from_config(
            &self.smtp,
            &self.dispatch,
        )?))
    }
}

/// Runs the `mailforge serve` command.
pub async fn run_serve(config: MailforgeConfig) -> Result<(), MailforgeError> {
    init_tracing(&config.server.log_level);

    info!("starting mailforge serve");

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let plan: Plan = config
        .quota
        .plan
        .parse()
        .map_err(|_| MailforgeError::Config(format!("unknown plan: {}", config.quota.plan)))?;

    let service = Arc::new(DispatchService::new(
        store.clone() as Arc<dyn CampaignStore>,
        store.clone() as Arc<dyn UsageLedger>,
        Arc::new(SmtpTransportFactory {
            smtp: config.smtp.clone(),
            dispatch: config.dispatch.clone(),
        }),
        Arc::new(GroqAddressGenerator::new(&config.groq)?),
        Arc::new(GroqContentGenerator::new(&config.groq)?),
        config.dispatch.clone(),
        plan,
        config.smtp.sender_name.clone(),
    ));
    service.start().await?;

    let shutdown = install_signal_handlers();
    let state = GatewayState::new(service.clone());
    let result =
        mailforge_gateway::start_server(&config.server, state, shutdown.clone()).await;

    service.stop();
    store.close().await?;
    info!("mailforge serve stopped");

    result
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// The returned token is cancelled when either signal arrives; the gateway
/// uses it for graceful shutdown and the dispatch loops check it between
/// recipients.
fn install_signal_handlers() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mailforge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
