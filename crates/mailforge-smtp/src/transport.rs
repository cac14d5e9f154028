// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! STARTTLS SMTP transport backed by `lettre`.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;
use uuid::Uuid;

use mailforge_config::model::{DispatchConfig, SmtpConfig};
use mailforge_core::types::{DeliveryReceipt, OutboundEmail};
use mailforge_core::{MailTransport, MailforgeError};

/// SMTP relay transport with bounded verify and send timeouts.
///
/// The relay is dialed over STARTTLS on the configured port. Credentials
/// are mandatory: a transport cannot be built without them, which keeps the
/// missing-credential failure at configuration time instead of mid-batch.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender_address: String,
    verify_timeout: Duration,
    send_timeout: Duration,
}

impl SmtpMailTransport {
    /// Build a transport from the validated configuration.
    ///
    /// Returns a `Config` error when the SMTP credentials are absent or the
    /// relay hostname is rejected by `lettre`.
    pub fn from_config(
        smtp: &SmtpConfig,
        dispatch: &DispatchConfig,
    ) -> Result<Self, MailforgeError> {
        let username = smtp.username.clone().ok_or_else(|| {
            MailforgeError::Config("smtp.username is not configured".to_string())
        })?;
        let password = smtp.password.clone().ok_or_else(|| {
            MailforgeError::Config("smtp.password is not configured".to_string())
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| MailforgeError::Config(format!("invalid SMTP relay {}: {e}", smtp.host)))?
            .port(smtp.port)
            .credentials(Credentials::new(username.clone(), password))
            .build();

        Ok(Self {
            transport,
            sender_address: username,
            verify_timeout: Duration::from_secs(dispatch.verify_timeout_secs),
            send_timeout: Duration::from_secs(dispatch.send_timeout_secs),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn verify(&self) -> Result<(), MailforgeError> {
        let ok = tokio::time::timeout(self.verify_timeout, self.transport.test_connection())
            .await
            .map_err(|_| MailforgeError::Timeout {
                duration: self.verify_timeout,
            })?
            .map_err(|e| MailforgeError::Transport {
                message: format!("SMTP verification failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        if !ok {
            return Err(MailforgeError::Transport {
                message: "SMTP relay rejected the connection test".to_string(),
                source: None,
            });
        }
        debug!(relay = %self.sender_address, "SMTP transport verified");
        Ok(())
    }

    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailforgeError> {
        let message_id = format!("<{}@mailforge>", Uuid::new_v4());
        let message = build_message(email, &message_id)?;

        tokio::time::timeout(self.send_timeout, self.transport.send(message))
            .await
            .map_err(|_| MailforgeError::Timeout {
                duration: self.send_timeout,
            })?
            .map_err(|e| MailforgeError::Transport {
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(DeliveryReceipt { message_id })
    }

    fn sender_address(&self) -> &str {
        &self.sender_address
    }
}

/// Assemble a MIME message from the outbound envelope.
///
/// Produces `multipart/alternative` when an HTML body is present, plain text
/// otherwise.
fn build_message(email: &OutboundEmail, message_id: &str) -> Result<Message, MailforgeError> {
    let from: Mailbox = format!("{} <{}>", email.from_name, email.from_address)
        .parse()
        .map_err(|e: lettre::address::AddressError| MailforgeError::Transport {
            message: format!("invalid sender address {}: {e}", email.from_address),
            source: Some(Box::new(e)),
        })?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e: lettre::address::AddressError| MailforgeError::Transport {
            message: format!("invalid recipient address {}: {e}", email.to),
            source: Some(Box::new(e)),
        })?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(&email.subject)
        .message_id(Some(message_id.to_string()));

    let message = match &email.html {
        Some(html) => builder.multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html.clone()),
                ),
        ),
        None => builder.singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(email.text.clone()),
        ),
    }
    .map_err(|e| MailforgeError::Transport {
        message: format!("failed to assemble message for {}: {e}", email.to),
        source: Some(Box::new(e)),
    })?;

    Ok(message)
}
